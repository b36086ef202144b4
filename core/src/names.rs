//! Column-name inference for sheets that arrive without declared names.

use rustc_hash::FxHashSet;

use crate::addressing::column_label;
use crate::sheet::Sheet;

/// Names proposed for a sheet's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SniffedNames {
    pub names: Vec<String>,
    /// Number of leading rows that hold the header; `0` when there is none.
    pub header_height: u32,
}

pub trait NameSniffer {
    fn sniff(&self, sheet: &dyn Sheet) -> SniffedNames;
}

/// Uses the first row as the header when every cell in it is non-null,
/// non-empty, and unique. Otherwise columns are named `A`, `B`, ... with no
/// header rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderSniffer;

impl NameSniffer for HeaderSniffer {
    fn sniff(&self, sheet: &dyn Sheet) -> SniffedNames {
        if let Some(names) = header_row(sheet) {
            return SniffedNames {
                names,
                header_height: 1,
            };
        }
        SniffedNames {
            names: (0..sheet.width()).map(column_label).collect(),
            header_height: 0,
        }
    }
}

/// Always proposes letter names, for sheets known to carry no header.
#[derive(Debug, Default, Clone, Copy)]
pub struct LetterSniffer;

impl NameSniffer for LetterSniffer {
    fn sniff(&self, sheet: &dyn Sheet) -> SniffedNames {
        SniffedNames {
            names: (0..sheet.width()).map(column_label).collect(),
            header_height: 0,
        }
    }
}

fn header_row(sheet: &dyn Sheet) -> Option<Vec<String>> {
    if sheet.height() == 0 || sheet.width() == 0 {
        return None;
    }
    let mut seen = FxHashSet::default();
    let mut names = Vec::with_capacity(sheet.width() as usize);
    for col in 0..sheet.width() {
        let cell = sheet.cell(col, 0).ok()?;
        if cell.escaped || cell.text.is_empty() || !seen.insert(cell.text.clone()) {
            return None;
        }
        names.push(cell.text);
    }
    Some(names)
}
