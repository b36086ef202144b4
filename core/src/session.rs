//! Derived state a [`SheetPatcher`](crate::SheetPatcher) keeps for one
//! attached sheet.

use rustc_hash::FxHashMap;

use crate::appearance::Style;
use crate::cell::Cell;
use crate::change::{CellMap, ConfigChange};
use crate::error::PatchError;
use crate::names::SniffedNames;

/// Row or column status of something struck out.
pub const TOMBSTONE: &str = "---";
/// Row or column status of something newly inserted.
pub const INSERTED: &str = "+++";

/// Styling asked for on one sheet row while describing changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RowStyles {
    pub(crate) row: Option<Style>,
    pub(crate) cells: Vec<(u32, Style)>,
}

/// Mutable lookup tables owned by one patcher session.
///
/// `active_columns` and `column_status` always have one entry per sheet
/// column; `row_status` has one entry per sheet row once a row event has been
/// seen. Buffered styles follow the same rows and columns, so they are only
/// resized through the methods here.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub config: ConfigChange,
    pub active_columns: Vec<String>,
    pub column_status: Vec<String>,
    pub row_status: Vec<String>,
    /// Where the next sequential row event applies; `None` when unknown.
    pub row_cursor: Option<u32>,
    pub header_height: u32,
    /// Set once every column has been struck in descriptive mode.
    pub kill_neutral: bool,
    pub(crate) sniffed: bool,
    name2col: FxHashMap<String, u32>,
    syn2name: FxHashMap<String, String>,
    name2syn: FxHashMap<String, String>,
    pub(crate) row_styles: Vec<RowStyles>,
    pub(crate) column_styles: Vec<Option<Style>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn seed(&mut self, sniffed: SniffedNames) {
        self.column_status = vec![String::new(); sniffed.names.len()];
        self.column_styles = vec![None; sniffed.names.len()];
        self.active_columns = sniffed.names;
        self.header_height = sniffed.header_height;
        self.name2syn.clear();
        self.syn2name.clear();
        self.sniffed = true;
        self.update_cols();
    }

    /// Rebuild the name-to-position table from `active_columns` and the
    /// synonym table.
    pub(crate) fn update_cols(&mut self) {
        self.name2col.clear();
        for (i, name) in self.active_columns.iter().enumerate() {
            if name == TOMBSTONE {
                continue;
            }
            self.name2col.insert(name.clone(), i as u32);
            if let Some(syn) = self.name2syn.get(name) {
                self.name2col.insert(syn.clone(), i as u32);
            }
        }
    }

    /// Current position of a column by display name or synonym.
    pub fn column_index(&self, name: &str) -> Option<u32> {
        self.name2col.get(name).copied()
    }

    /// Display name a synonym currently stands for.
    pub fn synonym_target(&self, synonym: &str) -> Option<&str> {
        self.syn2name.get(synonym).map(String::as_str)
    }

    /// Position of the visible column called `name` (or for which `name` is a
    /// synonym). Struck-out columns never match.
    pub(crate) fn match_col(&self, name: &str) -> Result<u32, PatchError> {
        let target = self.syn2name.get(name).map_or(name, String::as_str);
        self.active_columns
            .iter()
            .zip(&self.column_status)
            .position(|(active, status)| active == target && status != TOMBSTONE)
            .map(|i| i as u32)
            .ok_or_else(|| PatchError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Record `synonym` as an alternative name for the column displayed as
    /// `name`. A column keeps at most one synonym; the newest wins.
    pub(crate) fn add_synonym(&mut self, synonym: &str, name: &str) {
        if let Some(old) = self.name2syn.insert(name.to_string(), synonym.to_string()) {
            self.syn2name.remove(&old);
        }
        self.syn2name.insert(synonym.to_string(), name.to_string());
    }

    /// Give the column at `idx` a new display name, keeping the old one as a
    /// synonym.
    pub(crate) fn rename_column(&mut self, idx: usize, name: &str) {
        let old = std::mem::replace(&mut self.active_columns[idx], name.to_string());
        if let Some(syn) = self.name2syn.remove(&old) {
            self.syn2name.remove(&syn);
        }
        self.add_synonym(&old, name);
        self.update_cols();
    }

    /// Spread a name-keyed cell map over sheet positions. Names that are not
    /// currently visible are skipped.
    pub(crate) fn resolve(&self, cells: &CellMap, width: usize) -> (Vec<Option<Cell>>, usize) {
        let mut out = vec![None; width];
        let mut active = 0;
        for (name, cell) in cells {
            match self.column_index(name) {
                Some(idx) if (idx as usize) < width => {
                    out[idx as usize] = Some(cell.clone());
                    active += 1;
                }
                _ => log::debug!("ignoring unknown column '{name}'"),
            }
        }
        (out, active)
    }

    /// Size the per-row tables for a sheet `height` rows tall.
    pub(crate) fn fit_rows(&mut self, height: usize) {
        self.row_status.resize(height, String::new());
        self.row_styles.resize(height, RowStyles::default());
    }

    pub(crate) fn insert_row(&mut self, at: usize, status: &str) {
        let at = at.min(self.row_status.len());
        self.row_status.insert(at, status.to_string());
        self.row_styles.insert(at, RowStyles::default());
    }

    pub(crate) fn remove_row(&mut self, at: usize) {
        if at < self.row_status.len() {
            self.row_status.remove(at);
            self.row_styles.remove(at);
        }
    }

    pub(crate) fn move_row(&mut self, from: usize, to: usize) {
        if from >= self.row_status.len() {
            return;
        }
        let status = self.row_status.remove(from);
        let styles = self.row_styles.remove(from);
        let to = to.min(self.row_status.len());
        self.row_status.insert(to, status);
        self.row_styles.insert(to, styles);
    }

    pub(crate) fn clear_rows(&mut self) {
        self.row_status.clear();
        self.row_styles.clear();
    }

    /// Add a column called `name` at `at`, flagged as inserted.
    pub(crate) fn insert_column(&mut self, at: usize, name: &str) {
        let at = at.min(self.active_columns.len());
        self.active_columns.insert(at, name.to_string());
        self.column_status.insert(at, INSERTED.to_string());
        self.column_styles.insert(at, None);
        self.remap_cell_styles(|col| Some(if col >= at { col + 1 } else { col }));
        self.update_cols();
    }

    pub(crate) fn remove_column(&mut self, at: usize) {
        if at >= self.active_columns.len() {
            return;
        }
        self.active_columns.remove(at);
        self.column_status.remove(at);
        self.column_styles.remove(at);
        self.remap_cell_styles(|col| match col.cmp(&at) {
            std::cmp::Ordering::Less => Some(col),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(col - 1),
        });
        self.update_cols();
    }

    /// Move the column at `from` so that it ends up at `to`.
    pub(crate) fn move_column(&mut self, from: usize, to: usize) {
        if from >= self.active_columns.len() {
            return;
        }
        let to = to.min(self.active_columns.len() - 1);
        let name = self.active_columns.remove(from);
        self.active_columns.insert(to, name);
        let status = self.column_status.remove(from);
        self.column_status.insert(to, status);
        let style = self.column_styles.remove(from);
        self.column_styles.insert(to, style);
        self.remap_cell_styles(|col| {
            Some(if col == from {
                to
            } else if from < col && col <= to {
                col - 1
            } else if to <= col && col < from {
                col + 1
            } else {
                col
            })
        });
        self.update_cols();
    }

    fn remap_cell_styles(&mut self, f: impl Fn(usize) -> Option<usize>) {
        for row in &mut self.row_styles {
            row.cells = row
                .cells
                .iter()
                .filter_map(|&(col, style)| f(col as usize).map(|col| (col as u32, style)))
                .collect();
        }
    }

    pub(crate) fn style_row(&mut self, row: u32, style: Style) {
        if let Some(entry) = self.row_styles.get_mut(row as usize) {
            entry.row = Some(style);
        }
    }

    pub(crate) fn style_cell(&mut self, col: u32, row: u32, style: Style) {
        if let Some(entry) = self.row_styles.get_mut(row as usize) {
            entry.cells.push((col, style));
        }
    }

    pub(crate) fn style_column(&mut self, col: u32, style: Style) {
        if let Some(slot) = self.column_styles.get_mut(col as usize) {
            *slot = Some(style);
        }
    }

    pub(crate) fn all_columns_struck(&self) -> bool {
        self.column_status.iter().all(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(names: &[&str]) -> SessionState {
        let mut state = SessionState::new();
        state.seed(SniffedNames {
            names: names.iter().map(|s| s.to_string()).collect(),
            header_height: 1,
        });
        state
    }

    #[test]
    fn synonyms_resolve_to_the_same_column() {
        let mut state = state(&["A", "B"]);
        state.add_synonym("[b]", "B");
        state.update_cols();
        assert_eq!(state.column_index("[b]"), Some(1));
        assert_eq!(state.match_col("[b]"), Ok(1));
        assert_eq!(state.synonym_target("[b]"), Some("B"));
    }

    #[test]
    fn newest_synonym_replaces_the_old_one() {
        let mut state = state(&["A", "B"]);
        state.add_synonym("[x]", "B");
        state.add_synonym("[y]", "B");
        state.update_cols();
        assert_eq!(state.column_index("[x]"), None);
        assert_eq!(state.column_index("[y]"), Some(1));
    }

    #[test]
    fn struck_columns_do_not_match() {
        let mut state = state(&["A", "B"]);
        state.column_status[0] = TOMBSTONE.to_string();
        assert_eq!(
            state.match_col("A"),
            Err(PatchError::ColumnNotFound { name: "A".into() })
        );
        assert!(!state.all_columns_struck());
    }

    #[test]
    fn rename_keeps_old_name_reachable() {
        let mut state = state(&["A", "B"]);
        state.rename_column(1, "Beta");
        assert_eq!(state.active_columns, vec!["A", "Beta"]);
        assert_eq!(state.column_index("Beta"), Some(1));
        assert_eq!(state.column_index("B"), Some(1));
        assert_eq!(state.match_col("B"), Ok(1));
    }

    #[test]
    fn cell_styles_follow_their_column() {
        let mut state = state(&["A", "B", "C"]);
        state.fit_rows(1);
        let bold = Style::default().bold(true);
        state.style_cell(2, 0, bold);
        state.insert_column(0, "Z");
        assert_eq!(state.row_styles[0].cells, vec![(3, bold)]);
        state.move_column(3, 0);
        assert_eq!(state.active_columns, vec!["C", "Z", "A", "B"]);
        assert_eq!(state.row_styles[0].cells, vec![(0, bold)]);
        state.remove_column(0);
        assert!(state.row_styles[0].cells.is_empty());
        assert_eq!(state.column_styles.len(), 3);
    }

    #[test]
    fn row_styles_follow_their_row() {
        let mut state = state(&["A"]);
        state.fit_rows(3);
        let struck = Style::default().strikethrough(true);
        state.style_row(2, struck);
        state.insert_row(0, INSERTED);
        assert_eq!(state.row_styles[3].row, Some(struck));
        state.move_row(3, 0);
        assert_eq!(state.row_styles[0].row, Some(struck));
        assert_eq!(state.row_status.len(), state.row_styles.len());
        state.remove_row(0);
        assert!(state.row_styles.iter().all(|r| r.row.is_none()));
    }

    #[test]
    fn resolve_skips_unknown_names() {
        let state = state(&["A", "B"]);
        let mut cells = CellMap::new();
        cells.insert("B".into(), Cell::new("2"));
        cells.insert("Z".into(), Cell::new("9"));
        let (slots, active) = state.resolve(&cells, 2);
        assert_eq!(active, 1);
        assert_eq!(slots, vec![None, Some(Cell::new("2"))]);
    }
}
