//! The sheet abstraction every other component is written against.
//!
//! - [`Sheet`]: capability interface over a mutable grid of [`Cell`]s
//! - [`MemSheet`]: dense in-memory implementation
//! - [`PendingRow`]: row handle for keyed (non-sequential) stores
//!
//! Row and column positions are zero-based. Wherever an operation accepts
//! `Option<u32>`, `None` means "at the end".

use std::cell::OnceCell;

use thiserror::Error;

use crate::cell::Cell;
use crate::hashing::ContentHash;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("cell ({col}, {row}) is outside a {width}x{height} sheet")]
    OutOfRange {
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    },
    #[error("row {row} is outside a sheet of height {height}")]
    RowOutOfRange { row: u32, height: u32 },
    #[error("column {col} is outside a sheet of width {width}")]
    ColumnOutOfRange { col: u32, width: u32 },
    #[error("sheet is not writable")]
    NotWritable,
    #[error("size mismatch: target is {width}x{height}, source is {src_width}x{src_height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        src_width: u32,
        src_height: u32,
    },
}

/// Capability interface over an in-memory tabular grid.
pub trait Sheet {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn cell(&self, col: u32, row: u32) -> Result<Cell, SheetError>;

    fn set_cell(&mut self, col: u32, row: u32, cell: Cell) -> Result<(), SheetError>;

    /// Insert an empty row before `at`; returns the new row's position.
    fn insert_row(&mut self, at: Option<u32>) -> Result<u32, SheetError>;

    fn delete_row(&mut self, at: u32) -> Result<(), SheetError>;

    /// Move row `from` so it sits immediately before the row currently at
    /// `to`. Returns the row's final position.
    fn move_row(&mut self, from: u32, to: Option<u32>) -> Result<u32, SheetError>;

    fn insert_column(&mut self, at: Option<u32>) -> Result<u32, SheetError>;

    fn delete_column(&mut self, at: u32) -> Result<(), SheetError>;

    fn move_column(&mut self, from: u32, to: Option<u32>) -> Result<u32, SheetError>;

    /// Drop all rows and columns.
    fn clear(&mut self) -> Result<(), SheetError>;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SheetError>;

    /// Whether row order is meaningful. Keyed stores return `false` and take
    /// new rows through [`Sheet::commit_row`].
    fn is_sequential(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_resize(&self) -> bool {
        true
    }

    fn begin_row(&self) -> PendingRow {
        PendingRow::new(self.width())
    }

    /// Flush a pending row into the store.
    fn commit_row(&mut self, row: PendingRow) -> Result<u32, SheetError> {
        let at = self.insert_row(None)?;
        for (col, cell) in row.into_cells() {
            self.set_cell(col, at, cell)?;
        }
        Ok(at)
    }

    /// A digest the sheet already knows, if any.
    fn known_hash(&self) -> Option<ContentHash> {
        None
    }

    /// Offer a freshly computed digest for memoisation.
    fn remember_hash(&self, _hash: ContentHash) {}
}

/// A row being assembled for a keyed store; written by [`Sheet::commit_row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRow {
    cells: Vec<Option<Cell>>,
}

impl PendingRow {
    pub fn new(width: u32) -> Self {
        Self {
            cells: vec![None; width as usize],
        }
    }

    pub fn set_cell(&mut self, col: u32, cell: Cell) {
        let col = col as usize;
        if col >= self.cells.len() {
            self.cells.resize(col + 1, None);
        }
        self.cells[col] = Some(cell);
    }

    pub fn into_cells(self) -> impl Iterator<Item = (u32, Cell)> {
        self.cells
            .into_iter()
            .enumerate()
            .filter_map(|(col, cell)| cell.map(|cell| (col as u32, cell)))
    }
}

/// Copy every cell of `src` into `dst`.
///
/// Nothing is written unless `dst` is writable and (after an optional resize)
/// the same size as `src`.
pub fn copy_data(dst: &mut dyn Sheet, src: &dyn Sheet) -> Result<(), SheetError> {
    if !dst.can_write() {
        return Err(SheetError::NotWritable);
    }
    let same_size = |dst: &dyn Sheet| dst.width() == src.width() && dst.height() == src.height();
    if !same_size(&*dst) && dst.can_resize() {
        dst.resize(src.width(), src.height())?;
    }
    if !same_size(&*dst) {
        return Err(SheetError::SizeMismatch {
            width: dst.width(),
            height: dst.height(),
            src_width: src.width(),
            src_height: src.height(),
        });
    }
    for row in 0..src.height() {
        for col in 0..src.width() {
            dst.set_cell(col, row, src.cell(col, row)?)?;
        }
    }
    Ok(())
}

/// Dense in-memory sheet.
///
/// # Invariants
///
/// Every row holds exactly `width` cells.
#[derive(Debug, Clone)]
pub struct MemSheet {
    width: u32,
    rows: Vec<Vec<Cell>>,
    sequential: bool,
    writable: bool,
    resizable: bool,
    hash_cache: OnceCell<ContentHash>,
}

impl Default for MemSheet {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PartialEq for MemSheet {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.rows == other.rows
    }
}

impl MemSheet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            rows: vec![vec![Cell::default(); width as usize]; height as usize],
            sequential: true,
            writable: true,
            resizable: true,
            hash_cache: OnceCell::new(),
        }
    }

    /// An unordered store: rows are appended through [`Sheet::commit_row`].
    pub fn keyed(width: u32) -> Self {
        Self {
            sequential: false,
            ..Self::new(width, 0)
        }
    }

    /// Build a sheet from text rows. Short rows are padded with empty cells.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<Cell>,
    {
        let mut rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::default());
        }
        Self {
            width: width as u32,
            rows,
            ..Self::new(0, 0)
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Writable, but reports that it cannot be resized; a bulk copy into it
    /// must already match its size.
    pub fn fixed_size(mut self) -> Self {
        self.resizable = false;
        self
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Row contents as display text, convenient for assertions.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.display_text().to_string()).collect())
            .collect()
    }

    fn touch(&mut self) -> Result<(), SheetError> {
        if !self.writable {
            return Err(SheetError::NotWritable);
        }
        self.hash_cache.take();
        Ok(())
    }

    fn check_row(&self, row: u32) -> Result<usize, SheetError> {
        if row >= self.height() {
            return Err(SheetError::RowOutOfRange {
                row,
                height: self.height(),
            });
        }
        Ok(row as usize)
    }

    fn check_col(&self, col: u32) -> Result<usize, SheetError> {
        if col >= self.width {
            return Err(SheetError::ColumnOutOfRange {
                col,
                width: self.width,
            });
        }
        Ok(col as usize)
    }

    fn check_cell(&self, col: u32, row: u32) -> Result<(usize, usize), SheetError> {
        if col >= self.width || row >= self.height() {
            return Err(SheetError::OutOfRange {
                col,
                row,
                width: self.width,
                height: self.height(),
            });
        }
        Ok((col as usize, row as usize))
    }
}

/// Landing position of an item moved from `from` to just before `to` in a
/// sequence of `len` items.
pub(crate) fn move_destination(from: u32, to: Option<u32>, len: u32) -> u32 {
    let to = to.unwrap_or(len).min(len);
    if to > from { to - 1 } else { to }
}

impl Sheet for MemSheet {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    fn cell(&self, col: u32, row: u32) -> Result<Cell, SheetError> {
        let (c, r) = self.check_cell(col, row)?;
        Ok(self.rows[r][c].clone())
    }

    fn set_cell(&mut self, col: u32, row: u32, cell: Cell) -> Result<(), SheetError> {
        let (c, r) = self.check_cell(col, row)?;
        self.touch()?;
        self.rows[r][c] = cell;
        Ok(())
    }

    fn insert_row(&mut self, at: Option<u32>) -> Result<u32, SheetError> {
        let at = match at {
            Some(row) if row > self.height() => {
                return Err(SheetError::RowOutOfRange {
                    row,
                    height: self.height(),
                });
            }
            Some(row) => row,
            None => self.height(),
        };
        self.touch()?;
        self.rows
            .insert(at as usize, vec![Cell::default(); self.width as usize]);
        Ok(at)
    }

    fn delete_row(&mut self, at: u32) -> Result<(), SheetError> {
        let r = self.check_row(at)?;
        self.touch()?;
        self.rows.remove(r);
        Ok(())
    }

    fn move_row(&mut self, from: u32, to: Option<u32>) -> Result<u32, SheetError> {
        let r = self.check_row(from)?;
        self.touch()?;
        let dest = move_destination(from, to, self.height());
        let row = self.rows.remove(r);
        self.rows.insert(dest as usize, row);
        Ok(dest)
    }

    fn insert_column(&mut self, at: Option<u32>) -> Result<u32, SheetError> {
        let at = match at {
            Some(col) if col > self.width => {
                return Err(SheetError::ColumnOutOfRange {
                    col,
                    width: self.width,
                });
            }
            Some(col) => col,
            None => self.width,
        };
        self.touch()?;
        for row in &mut self.rows {
            row.insert(at as usize, Cell::default());
        }
        self.width += 1;
        Ok(at)
    }

    fn delete_column(&mut self, at: u32) -> Result<(), SheetError> {
        let c = self.check_col(at)?;
        self.touch()?;
        for row in &mut self.rows {
            row.remove(c);
        }
        self.width -= 1;
        Ok(())
    }

    fn move_column(&mut self, from: u32, to: Option<u32>) -> Result<u32, SheetError> {
        let c = self.check_col(from)?;
        self.touch()?;
        let dest = move_destination(from, to, self.width) as usize;
        for row in &mut self.rows {
            let cell = row.remove(c);
            row.insert(dest, cell);
        }
        Ok(dest as u32)
    }

    fn clear(&mut self) -> Result<(), SheetError> {
        self.touch()?;
        self.rows.clear();
        self.width = 0;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SheetError> {
        self.touch()?;
        self.width = width;
        self.rows
            .resize(height as usize, vec![Cell::default(); width as usize]);
        for row in &mut self.rows {
            row.resize(width as usize, Cell::default());
        }
        Ok(())
    }

    fn is_sequential(&self) -> bool {
        self.sequential
    }

    fn can_write(&self) -> bool {
        self.writable
    }

    fn can_resize(&self) -> bool {
        self.writable && self.resizable
    }

    fn known_hash(&self) -> Option<ContentHash> {
        self.hash_cache.get().copied()
    }

    fn remember_hash(&self, hash: ContentHash) {
        let _ = self.hash_cache.set(hash);
    }
}
