//! Containers of named sheets.

use crate::sheet::{MemSheet, Sheet};

/// A collection of sheets a patcher can attach to by name.
pub trait Book {
    type Sheet: Sheet;

    fn sheet_names(&self) -> Vec<String>;

    /// `false` for stores with a single anonymous sheet, such as a CSV file.
    fn named_sheets(&self) -> bool {
        true
    }

    fn sheet_index(&self, name: &str) -> Option<usize>;

    fn sheet(&self, index: usize) -> Option<&Self::Sheet>;

    fn sheet_mut(&mut self, index: usize) -> Option<&mut Self::Sheet>;
}

/// In-memory book of [`MemSheet`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct MemBook {
    sheets: Vec<(String, MemSheet)>,
    named: bool,
}

impl Default for MemBook {
    fn default() -> Self {
        Self::new()
    }
}

impl MemBook {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            named: true,
        }
    }

    /// A book holding one anonymous sheet.
    pub fn unnamed(sheet: MemSheet) -> Self {
        Self {
            sheets: vec![(String::new(), sheet)],
            named: false,
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: MemSheet) -> Self {
        self.add_sheet(name, sheet);
        self
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, sheet: MemSheet) {
        self.sheets.push((name.into(), sheet));
    }

    pub fn get(&self, name: &str) -> Option<&MemSheet> {
        self.sheet_index(name).and_then(|i| self.sheet(i))
    }

    pub fn first(&self) -> Option<&MemSheet> {
        self.sheets.first().map(|(_, sheet)| sheet)
    }
}

impl Book for MemBook {
    type Sheet = MemSheet;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn named_sheets(&self) -> bool {
        self.named
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        if !self.named {
            return None;
        }
        self.sheets.iter().position(|(n, _)| n == name)
    }

    fn sheet(&self, index: usize) -> Option<&MemSheet> {
        self.sheets.get(index).map(|(_, sheet)| sheet)
    }

    fn sheet_mut(&mut self, index: usize) -> Option<&mut MemSheet> {
        self.sheets.get_mut(index).map(|(_, sheet)| sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup_finds_sheets_in_insertion_order() {
        let book = MemBook::new()
            .with_sheet("a", MemSheet::from_rows([["1"]]))
            .with_sheet("b", MemSheet::from_rows([["2"]]));
        assert_eq!(book.sheet_names(), vec!["a", "b"]);
        assert_eq!(book.sheet_index("b"), Some(1));
        assert_eq!(book.get("b").unwrap().text_rows(), vec![vec!["2"]]);
        assert!(book.get("c").is_none());
    }

    #[test]
    fn unnamed_book_never_resolves_names() {
        let book = MemBook::unnamed(MemSheet::from_rows([["x"]]));
        assert!(!book.named_sheets());
        assert_eq!(book.sheet_index(""), None);
        assert!(book.first().is_some());
    }
}
