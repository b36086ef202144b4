//! Content hashing for sheets and rows.
//!
//! [`hash_sheet`] produces a cryptographic fingerprint of a sheet's full
//! content, used for equality checks and change detection. [`row_fingerprint`]
//! is a cheap 64-bit hash of a column-name keyed row used by the renderers.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use xxhash_rust::xxh64::Xxh64;

use crate::cell::Cell;
use crate::sheet::Sheet;

pub(crate) const XXH64_SEED: u64 = 0;

const NULL_TOKEN: u8 = b'N';
const TEXT_TOKEN: u8 = b'X';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Hash every cell of `sheet`, ignoring any memoised digest.
///
/// A null cell contributes a single null token; any other cell contributes a
/// text token, the text length, and the raw text. Dimensions are folded in
/// first so that reshaped grids with the same cell stream differ.
pub fn hash_sheet(sheet: &dyn Sheet) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(sheet.width().to_le_bytes());
    hasher.update(sheet.height().to_le_bytes());
    let mut line = Vec::new();
    for row in 0..sheet.height() {
        line.clear();
        for col in 0..sheet.width() {
            let cell = sheet.cell(col, row).unwrap_or_default();
            push_cell_tokens(&mut line, &cell);
        }
        hasher.update(&line);
    }
    ContentHash(hasher.finalize().into())
}

/// Hash `sheet`, consulting and refreshing its memoised digest when
/// `use_cache` is set.
pub fn content_hash(sheet: &dyn Sheet, use_cache: bool) -> ContentHash {
    if use_cache {
        if let Some(known) = sheet.known_hash() {
            return known;
        }
    }
    let hash = hash_sheet(sheet);
    if use_cache {
        sheet.remember_hash(hash);
    }
    hash
}

/// Content equality of two sheets regardless of storage.
pub fn sheets_equal(a: &dyn Sheet, b: &dyn Sheet) -> bool {
    content_hash(a, true) == content_hash(b, true)
}

fn push_cell_tokens(out: &mut Vec<u8>, cell: &Cell) {
    if cell.escaped {
        out.push(NULL_TOKEN);
    } else {
        out.push(TEXT_TOKEN);
        out.extend_from_slice(&(cell.text.len() as u64).to_le_bytes());
        out.extend_from_slice(cell.text.as_bytes());
    }
}

pub(crate) fn row_fingerprint(row: &BTreeMap<String, Cell>) -> u64 {
    let mut hasher = Xxh64::new(XXH64_SEED);
    for (name, cell) in row {
        name.hash(&mut hasher);
        cell.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemSheet;

    #[test]
    fn identical_content_hashes_identically() {
        let a = MemSheet::from_rows([["1", "2"], ["3", "4"]]);
        let mut b = MemSheet::new(2, 0);
        b.insert_row(None).unwrap();
        b.insert_row(None).unwrap();
        for (col, row, text) in [(0, 0, "1"), (1, 0, "2"), (0, 1, "3"), (1, 1, "4")] {
            b.set_cell(col, row, Cell::new(text)).unwrap();
        }
        assert_eq!(hash_sheet(&a), hash_sheet(&b));
    }

    #[test]
    fn null_differs_from_empty_text() {
        let mut a = MemSheet::new(1, 1);
        let b = MemSheet::new(1, 1);
        a.set_cell(0, 0, Cell::null()).unwrap();
        assert_ne!(hash_sheet(&a), hash_sheet(&b));
    }

    #[test]
    fn cell_boundaries_are_part_of_the_hash() {
        let a = MemSheet::from_rows([["aXb", "c"]]);
        let b = MemSheet::from_rows([["a", "bXc"]]);
        assert_ne!(hash_sheet(&a), hash_sheet(&b));
    }

    #[test]
    fn memoised_hash_is_invalidated_by_mutation() {
        let mut sheet = MemSheet::from_rows([["1"]]);
        let before = content_hash(&sheet, true);
        assert_eq!(sheet.known_hash(), Some(before));
        sheet.set_cell(0, 0, Cell::new("2")).unwrap();
        assert_eq!(sheet.known_hash(), None);
        assert_ne!(content_hash(&sheet, true), before);
    }

    #[test]
    fn bypassing_the_cache_recomputes() {
        let sheet = MemSheet::from_rows([["1"]]);
        sheet.remember_hash(ContentHash([0; 32]));
        assert_eq!(content_hash(&sheet, true), ContentHash([0; 32]));
        assert_ne!(content_hash(&sheet, false), ContentHash([0; 32]));
    }
}
