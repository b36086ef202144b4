//! Compact textual diff.
//!
//! ```text
//! # tdiff version 0.3
//! @@@ people
//! @ |id|name|
//! * |id=2|name=->rob|
//! + |id=3|name=eve|
//! ```
//!
//! Column names and cell text are wrapped in double quotes (inner quotes
//! doubled) when they contain `|`, `=`, `->`, a quote or whitespace, and a
//! text cell that reads like the null token is quoted too, so a bare `NULL`
//! is always a null:
//!
//! ```text
//! * |id=4|note="a|b"->"x = y"|
//! + |id=5|"unit price"=3|note="NULL"|
//! ```
//!
//! Row events are buffered and rendered through
//! [`interpret`](crate::alignment::interpret) so that an adjacent delete and
//! insert of the same row reads as one changed line.

use std::borrow::Cow;
use std::io::Write;

use crate::alignment::{RowInstruction, RowLabel, interpret};
use crate::change::{OrderChange, OrderChangeMode, RowChange};
use crate::config::PatchConfig;
use crate::cell::Cell;
use crate::error::PatchError;
use crate::sink::Patcher;

pub const TDIFF_HEADER: &str = "# tdiff version 0.3";

/// `text`, quoted if it could be misread inside a `|name=value|` field.
fn token(text: &str) -> Cow<'_, str> {
    let ambiguous = text.contains(['|', '=', '"'])
        || text.contains("->")
        || text.chars().any(char::is_whitespace);
    if ambiguous {
        Cow::Owned(quoted(text))
    } else {
        Cow::Borrowed(text)
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn value<'c>(cell: &'c Cell, null_token: &'c str) -> Cow<'c, str> {
    if cell.is_null() {
        Cow::Borrowed(null_token)
    } else if cell.text == null_token {
        Cow::Owned(quoted(&cell.text))
    } else {
        token(&cell.text)
    }
}

pub struct TdiffWriter<W: Write> {
    w: W,
    config: PatchConfig,
    wrote_header: bool,
    columns: Vec<String>,
    pending: Vec<RowChange>,
    emitted: Vec<RowInstruction>,
}

impl<W: Write> TdiffWriter<W> {
    pub fn new(w: W, config: PatchConfig) -> Self {
        Self {
            w,
            config,
            wrote_header: false,
            columns: Vec::new(),
            pending: Vec::new(),
            emitted: Vec::new(),
        }
    }

    /// Every row instruction written so far.
    pub fn instructions(&self) -> &[RowInstruction] {
        &self.emitted
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    fn line(&mut self, text: &str) -> Result<(), PatchError> {
        if !self.wrote_header {
            writeln!(self.w, "{TDIFF_HEADER}").map_err(PatchError::sink)?;
            self.wrote_header = true;
        }
        writeln!(self.w, "{text}").map_err(PatchError::sink)
    }

    fn flush_rows(&mut self) -> Result<(), PatchError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let events = std::mem::take(&mut self.pending);
        let instructions = interpret(&events, &self.config.costs);
        for instruction in &instructions {
            let text = self.render(instruction);
            self.line(&text)?;
        }
        self.emitted.extend(instructions);
        Ok(())
    }

    /// Names touched by `instruction`, declared columns first.
    fn ordered_names<'i>(&'i self, instruction: &'i RowInstruction) -> Vec<&'i str> {
        let touched = |name: &str| {
            instruction.cond.contains_key(name) || instruction.val.contains_key(name)
        };
        let mut names: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|name| touched(*name))
            .collect();
        for name in instruction.cond.keys().chain(instruction.val.keys()) {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }

    fn render(&self, instruction: &RowInstruction) -> String {
        let null = self.config.null_token.as_str();
        let prefix = match instruction.label {
            RowLabel::Kept => "=",
            RowLabel::Changed => "*",
            RowLabel::Moved => ":",
            RowLabel::Inserted => "+",
            RowLabel::Deleted => "-",
        };
        let shows_change = matches!(instruction.label, RowLabel::Changed | RowLabel::Moved);
        let mut cells = Vec::new();
        for name in self.ordered_names(instruction) {
            let before = instruction.cond.get(name);
            let after = instruction.val.get(name);
            let label = token(name);
            let cell = match (before, after) {
                (Some(b), Some(a)) => format!("{label}={}->{}", value(b, null), value(a, null)),
                (None, Some(a)) if shows_change => format!("{label}=->{}", value(a, null)),
                (Some(c), None) | (None, Some(c)) => format!("{label}={}", value(c, null)),
                (None, None) => continue,
            };
            cells.push(cell);
        }
        format!("{prefix} |{}|", cells.join("|"))
    }

    fn show_columns(&mut self, names: &[String]) -> Result<(), PatchError> {
        if names == self.columns.as_slice() {
            return Ok(());
        }
        self.columns = names.to_vec();
        let labels: Vec<Cow<'_, str>> = names.iter().map(|n| token(n)).collect();
        let text = format!("@ |{}|", labels.join("|"));
        self.line(&text)
    }
}

impl<W: Write> Patcher for TdiffWriter<W> {
    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        self.flush_rows()?;
        let subject = change.subject;
        let before = token(change.name_before(subject).unwrap_or_default());
        let after = token(change.name_after(subject).unwrap_or_default());
        let text = match change.mode {
            OrderChangeMode::Insert => format!("@+ {after}"),
            OrderChangeMode::Delete => format!("@- {before}"),
            OrderChangeMode::Move => format!("@: {after}"),
            OrderChangeMode::Rename => format!("@= {before} {after}"),
        };
        self.line(&text)?;
        self.columns = change.names_after.clone();
        Ok(())
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        if !change.sequential {
            self.flush_rows()?;
        }
        self.pending.push(change.clone());
        if self.pending.len() >= self.config.alignment_window as usize {
            self.flush_rows()?;
        }
        Ok(())
    }

    fn declare_names(&mut self, names: &[String], _is_final: bool) -> Result<(), PatchError> {
        self.flush_rows()?;
        self.show_columns(names)
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.flush_rows()?;
        self.columns.clear();
        self.line(&format!("@@@ {name}"))
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        self.flush_rows()
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        self.flush_rows()?;
        self.w.flush().map_err(PatchError::sink)
    }
}
