//! Literal CSV patch output.
//!
//! Each event becomes one or two CSV rows whose first field names the action.
//! Row payloads are laid out under the most recent `names` row; a column the
//! event does not mention is left blank, while an empty text cell is written
//! as `""`.
//!
//! Quoting follows the dtbl rules rather than minimal CSV quoting: text with a
//! space, tab or apostrophe is quoted too, and an empty text cell is `""`
//! while an absent one is bare. `CsvStyle` encodes each field and the `csv`
//! writer frames the records.

use std::io::Write;

use crate::cell::Cell;
use crate::change::{CellMap, OrderChange, OrderChangeMode, PoolChange, RowChange, RowChangeMode};
use crate::error::PatchError;
use crate::sink::Patcher;

pub const CSV_PATCH_HEADER: [&str; 4] = ["dtbl", "csv", "version", "0.2"];

/// Encoding rules for CSV text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvStyle {
    pub delimiter: u8,
    pub null_token: String,
    /// End records with `\r\n` instead of `\n`.
    pub crlf: bool,
}

impl Default for CsvStyle {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_token: "NULL".to_string(),
            crlf: false,
        }
    }
}

impl CsvStyle {
    /// Encode one field. `None` is an absent value and encodes as nothing.
    ///
    /// Null cells become the null token. Text that would read back as the
    /// null token gains a leading `_`.
    pub fn encode_cell(&self, cell: Option<&Cell>) -> String {
        let Some(cell) = cell else {
            return String::new();
        };
        if cell.is_null() {
            return self.null_token.clone();
        }
        let text = if cell.text.trim_start_matches('_') == self.null_token {
            format!("_{}", cell.text)
        } else {
            cell.text.clone()
        };
        self.quote(&text)
    }

    /// Encode plain text, quoting as needed.
    pub fn encode_text(&self, text: &str) -> String {
        self.encode_cell(Some(&Cell::new(text)))
    }

    fn quote(&self, text: &str) -> String {
        let needs_quotes = text.is_empty()
            || text.chars().any(|ch| {
                ch == char::from(self.delimiter) || matches!(ch, '"' | '\'' | '\r' | '\n' | '\t' | ' ')
            });
        if !needs_quotes {
            return text.to_string();
        }
        format!("\"{}\"", text.replace('"', "\"\""))
    }

    /// Record framing for fields that are already encoded.
    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let terminator = if self.crlf {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        };
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .terminator(terminator)
            .quote_style(csv::QuoteStyle::Never)
            .flexible(true);
        builder
    }

    /// Frame rows of encoded fields as CSV text.
    pub fn encode_rows(&self, rows: &[Vec<String>]) -> Result<String, PatchError> {
        let mut writer = self.writer_builder().from_writer(Vec::new());
        for row in rows {
            writer.write_record(row).map_err(PatchError::sink)?;
        }
        let bytes = writer.into_inner().map_err(PatchError::sink)?;
        String::from_utf8(bytes).map_err(PatchError::sink)
    }
}

pub struct CsvPatchWriter<W: Write> {
    w: csv::Writer<W>,
    style: CsvStyle,
    wrote_header: bool,
    columns: Vec<String>,
}

impl<W: Write> CsvPatchWriter<W> {
    pub fn new(w: W) -> Self {
        Self::with_style(w, CsvStyle::default())
    }

    pub fn with_style(w: W, style: CsvStyle) -> Self {
        Self {
            w: style.writer_builder().from_writer(w),
            style,
            wrote_header: false,
            columns: Vec::new(),
        }
    }

    /// Flush buffered records and hand back the destination.
    pub fn into_inner(self) -> Result<W, PatchError> {
        self.w.into_inner().map_err(PatchError::sink)
    }

    fn write_fields(&mut self, fields: Vec<String>) -> Result<(), PatchError> {
        if !self.wrote_header {
            self.w
                .write_record(CSV_PATCH_HEADER)
                .map_err(PatchError::sink)?;
            self.wrote_header = true;
        }
        self.w.write_record(&fields).map_err(PatchError::sink)
    }

    fn write_texts<'t>(
        &mut self,
        texts: impl IntoIterator<Item = &'t str>,
    ) -> Result<(), PatchError> {
        let fields = texts
            .into_iter()
            .map(|t| self.style.encode_text(t))
            .collect();
        self.write_fields(fields)
    }

    fn write_names(&mut self) -> Result<(), PatchError> {
        let mut fields = vec!["names".to_string()];
        fields.extend(self.columns.iter().map(|n| self.style.encode_text(n)));
        self.write_fields(fields)
    }

    fn write_cells(&mut self, action: &str, cells: &CellMap) -> Result<(), PatchError> {
        let mut fields = vec![action.to_string()];
        fields.extend(
            self.columns
                .iter()
                .map(|name| self.style.encode_cell(cells.get(name))),
        );
        self.write_fields(fields)
    }

    /// Make sure every column the event mentions has a slot.
    fn cover(&mut self, change: &RowChange) -> Result<(), PatchError> {
        if self.columns.is_empty() && !change.names.is_empty() {
            self.columns = change.names.clone();
        }
        let missing: Vec<String> = change
            .touched_columns()
            .filter(|name| !self.columns.iter().any(|c| c.as_str() == *name))
            .map(str::to_string)
            .collect();
        if self.columns.is_empty() || !missing.is_empty() {
            self.columns.extend(missing);
            self.write_names()?;
        }
        Ok(())
    }
}

impl<W: Write> Patcher for CsvPatchWriter<W> {
    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        let subject = change.subject;
        let before = change.name_before(subject).unwrap_or_default();
        let after = change.name_after(subject).unwrap_or_default();
        let anchor = change.successor_after(subject).unwrap_or_default();
        match change.mode {
            OrderChangeMode::Insert => self.write_texts(["column", "insert", after, anchor])?,
            OrderChangeMode::Delete => self.write_texts(["column", "delete", before])?,
            OrderChangeMode::Move => self.write_texts(["column", "move", after, anchor])?,
            OrderChangeMode::Rename => self.write_texts(["column", "rename", before, after])?,
        }
        self.columns = change.names_after.clone();
        Ok(())
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        self.cover(change)?;
        match change.mode {
            RowChangeMode::Insert => self.write_cells("insert", &change.val),
            RowChangeMode::Delete => self.write_cells("delete", &change.cond),
            RowChangeMode::Context => self.write_cells("context", &change.cond),
            RowChangeMode::Update | RowChangeMode::Move => {
                self.write_cells("select", &change.cond)?;
                self.write_cells(change.mode.as_str(), &change.val)
            }
        }
    }

    fn declare_names(&mut self, names: &[String], _is_final: bool) -> Result<(), PatchError> {
        if names == self.columns.as_slice() {
            return Ok(());
        }
        self.columns = names.to_vec();
        self.write_names()
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        let mut fields = vec![
            "pool".to_string(),
            self.style.encode_text(&change.pool_name),
            self.style.encode_text(&change.table_name),
        ];
        fields.extend(
            change
                .pool
                .iter()
                .map(|field| self.style.encode_text(&field.to_string())),
        );
        self.write_fields(fields)
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.columns.clear();
        self.write_texts(["sheet", name])
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        self.w.flush().map_err(PatchError::sink)
    }
}
