//! Cell values stored in a sheet.

use serde::{Deserialize, Serialize};

/// A single sheet cell.
///
/// `escaped` marks a logically null cell, which is distinct from a cell holding
/// the empty string. Both fields take part in equality and hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escaped: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Cell {
        Cell {
            text: text.into(),
            escaped: false,
        }
    }

    /// A null cell.
    pub fn null() -> Cell {
        Cell {
            text: String::new(),
            escaped: true,
        }
    }

    pub fn is_null(&self) -> bool {
        self.escaped
    }

    /// Text shown to a reader; null renders as the empty string.
    pub fn display_text(&self) -> &str {
        if self.escaped { "" } else { &self.text }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.escaped {
            write!(f, "NULL")
        } else {
            write!(f, "{}", self.text)
        }
    }
}
