//! Applies a change stream to a sheet held in a [`Book`].
//!
//! In destructive mode edits mutate the sheet directly. In descriptive mode
//! the sheet keeps its data and gains annotations instead: a gutter column of
//! row statuses, a column status row, composite `old->new` cells, and
//! requests to an optional [`StyleSink`].

use crate::appearance::{Rgb16, Style, StyleSink};
use crate::book::Book;
use crate::cell::Cell;
use crate::change::{
    ConfigChange, OrderChange, OrderChangeMode, PoolChange, RowChange, RowChangeMode,
};
use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::names::{HeaderSniffer, NameSniffer};
use crate::session::{INSERTED, SessionState, TOMBSTONE};
use crate::sheet::{Sheet, move_destination};
use crate::sink::Patcher;

const SEPARATOR: &str = "->";
const ELLIPSIS: &str = "...";

pub struct SheetPatcher<'a, B: Book> {
    book: B,
    config: PatchConfig,
    sheet: Option<usize>,
    state: SessionState,
    sniffer: Box<dyn NameSniffer + 'a>,
    styles: Option<Box<dyn StyleSink + 'a>>,
    pools: Vec<PoolChange>,
    change_count: usize,
}

fn attached<B: Book>(book: &mut B, at: Option<usize>) -> Result<&mut B::Sheet, PatchError> {
    at.and_then(|i| book.sheet_mut(i))
        .ok_or(PatchError::SheetUnavailable)
}

/// First row, not struck out, whose cells equal every active condition.
fn match_row<S: Sheet + ?Sized>(
    sheet: &S,
    row_status: &[String],
    cond: &[Option<Cell>],
) -> Option<u32> {
    (0..sheet.height()).find(|&r| {
        if row_status.get(r as usize).map(String::as_str) == Some(TOMBSTONE) {
            return false;
        }
        cond.iter().enumerate().all(|(c, want)| match want {
            Some(want) => sheet.cell(c as u32, r).is_ok_and(|have| &have == want),
            None => true,
        })
    })
}

/// Cursor value after working on row `r` of a sheet `height` rows tall.
fn cursor_after(r: u32, height: u32) -> Option<u32> {
    (r + 1 < height).then_some(r + 1)
}

impl<'a, B: Book> SheetPatcher<'a, B> {
    pub fn new(book: B, config: PatchConfig) -> Self {
        Self {
            book,
            config,
            sheet: None,
            state: SessionState::new(),
            sniffer: Box::new(HeaderSniffer),
            styles: None,
            pools: Vec::new(),
            change_count: 0,
        }
    }

    pub fn with_sniffer(mut self, sniffer: impl NameSniffer + 'a) -> Self {
        self.sniffer = Box::new(sniffer);
        self
    }

    pub fn with_styles(mut self, styles: impl StyleSink + 'a) -> Self {
        self.styles = Some(Box::new(styles));
        self
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    pub fn book(&self) -> &B {
        &self.book
    }

    pub fn into_book(self) -> B {
        self.book
    }

    /// The attached sheet, if any.
    pub fn sheet(&self) -> Option<&B::Sheet> {
        self.sheet.and_then(|i| self.book.sheet(i))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn row_cursor(&self) -> Option<u32> {
        self.state.row_cursor
    }

    pub fn active_columns(&self) -> &[String] {
        &self.state.active_columns
    }

    pub fn column_status(&self) -> &[String] {
        &self.state.column_status
    }

    pub fn pools(&self) -> &[PoolChange] {
        &self.pools
    }

    /// Column and row events applied so far.
    pub fn change_count(&self) -> usize {
        self.change_count
    }

    /// Sniff column names for the attached sheet once per session.
    fn set_names(&mut self) {
        if self.state.sniffed {
            return;
        }
        let Some(sheet) = self.sheet.and_then(|i| self.book.sheet(i)) else {
            return;
        };
        let sniffed = self.sniffer.sniff(sheet);
        log::debug!(
            "columns {:?} (header height {})",
            sniffed.names,
            sniffed.header_height
        );
        self.state.seed(sniffed);
    }

    fn no_match(&mut self, change: &RowChange) -> PatchError {
        self.state.row_cursor = None;
        log::warn!(
            "no row matches {} condition {}",
            change.mode,
            change.describe_cond()
        );
        PatchError::RowNotFound {
            mode: change.mode,
            cond: change.describe_cond(),
        }
    }

    fn move_column(&mut self, idx: u32, to: Option<u32>) -> Result<(), PatchError> {
        let sheet = attached(&mut self.book, self.sheet)?;
        let width = sheet.width();
        if !self.config.is_descriptive() {
            let dest = sheet.move_column(idx, to)?;
            self.state.move_column(idx as usize, dest as usize);
            return Ok(());
        }
        let dest = move_destination(idx, to, width);
        if dest == idx {
            return Ok(());
        }
        let (crossed, arrow) = if dest > idx {
            (idx + 1..=dest, ">")
        } else {
            (dest..=idx - 1, "<")
        };
        let status = &mut self.state.column_status;
        let arrows: String = crossed
            .filter(|&c| status.get(c as usize).map(String::as_str) != Some(TOMBSTONE))
            .map(|_| arrow)
            .collect();
        if !arrows.is_empty() {
            status[idx as usize] = arrows;
        }
        Ok(())
    }

    /// Write `val` into row `r`: overwriting in destructive mode, as
    /// `old->new` composites in descriptive mode.
    fn mark_changes(&mut self, r: u32, val: &[Option<Cell>]) -> Result<(), PatchError> {
        if val.iter().all(Option::is_none) {
            return Ok(());
        }
        let descriptive = self.config.is_descriptive();
        let null_token = self.config.null_token.as_str();
        let sheet = attached(&mut self.book, self.sheet)?;
        let mut separator = SEPARATOR.to_string();
        while (0..sheet.width())
            .any(|c| sheet.cell(c, r).is_ok_and(|cell| cell.text.contains(&separator)))
        {
            separator.insert(0, '-');
        }
        let mut changed = Vec::new();
        for (c, to) in val.iter().enumerate() {
            let Some(to) = to else { continue };
            let c = c as u32;
            if descriptive {
                let prev = sheet.cell(c, r)?;
                let to = if to.is_null() { null_token } else { to.text.as_str() };
                let composite = format!("{}{separator}{to}", prev.display_text());
                sheet.set_cell(c, r, Cell::new(composite))?;
                changed.push(c);
            } else {
                sheet.set_cell(c, r, to.clone())?;
            }
        }
        if let Some(status) = self.state.row_status.get_mut(r as usize) {
            *status = separator;
        }
        for c in changed {
            self.state
                .style_cell(c, r, Style::default().background(Rgb16::CHANGED).bold(true));
        }
        Ok(())
    }

    fn insert_row(&mut self, val: &[Option<Cell>]) -> Result<(), PatchError> {
        let sheet = attached(&mut self.book, self.sheet)?;
        if !sheet.is_sequential() {
            let mut pending = sheet.begin_row();
            for (c, cell) in val.iter().enumerate() {
                if let Some(cell) = cell {
                    pending.set_cell(c as u32, cell.clone());
                }
            }
            let r = sheet.commit_row(pending)?;
            self.state.insert_row(r as usize, INSERTED);
            return Ok(());
        }
        let r = sheet.insert_row(self.state.row_cursor)?;
        for (c, cell) in val.iter().enumerate() {
            if let Some(cell) = cell {
                sheet.set_cell(c as u32, r, cell.clone())?;
            }
        }
        let height = sheet.height();
        self.state.insert_row(r as usize, INSERTED);
        self.state.row_cursor = cursor_after(r, height);
        if self.config.is_descriptive() {
            self.state
                .style_row(r, Style::default().background(Rgb16::INSERTED));
        }
        Ok(())
    }

    fn delete_row(&mut self, r: u32) -> Result<(), PatchError> {
        let descriptive = self.config.is_descriptive();
        let sheet = attached(&mut self.book, self.sheet)?;
        self.state.row_cursor = Some(r);
        if descriptive {
            self.state.row_status[r as usize] = TOMBSTONE.to_string();
            self.state.style_row(
                r,
                Style::default()
                    .background(Rgb16::DELETED)
                    .strikethrough(true),
            );
        } else {
            sheet.delete_row(r)?;
            self.state.remove_row(r as usize);
            if r >= sheet.height() {
                self.state.row_cursor = None;
            }
        }
        Ok(())
    }

    fn delete_column(&mut self, idx: u32) -> Result<(), PatchError> {
        let sheet = attached(&mut self.book, self.sheet)?;
        if self.config.is_descriptive() {
            self.state.column_status[idx as usize] = TOMBSTONE.to_string();
            self.state.style_column(
                idx,
                Style::default()
                    .background(Rgb16::DELETED)
                    .strikethrough(true),
            );
            if self.state.all_columns_struck() {
                self.state.kill_neutral = true;
            }
        } else {
            sheet.delete_column(idx)?;
            self.state.remove_column(idx as usize);
            if sheet.width() == 0 {
                sheet.clear()?;
                self.state.clear_rows();
                self.state.row_cursor = None;
            }
        }
        self.state.update_cols();
        Ok(())
    }

    fn insert_column(&mut self, name: &str, before: Option<&str>) -> Result<(), PatchError> {
        let before = before.map(|n| self.state.match_col(n)).transpose()?;
        let sheet = attached(&mut self.book, self.sheet)?;
        let at = sheet.insert_column(before)?;
        self.state.insert_column(at as usize, name);
        if self.config.is_descriptive() {
            self.state
                .style_column(at, Style::default().background(Rgb16::INSERTED));
        }
        Ok(())
    }

    /// Lay out descriptive annotations once the whole stream has been seen.
    fn finish_descriptive(&mut self) -> Result<(), PatchError> {
        let null_token = self.config.null_token.clone();
        let context = self.config.context_rows;
        let clean = move |cell: Cell| -> String {
            if cell.is_null() || cell.text == null_token {
                String::new()
            } else {
                cell.text
            }
        };

        let sheet = attached(&mut self.book, self.sheet)?;
        sheet.insert_column(Some(0))?;
        let rows = sheet.height().min(self.state.row_status.len() as u32);
        for r in 0..rows {
            let mut status = self.state.row_status[r as usize].clone();
            if status.is_empty() && self.state.kill_neutral {
                status = TOMBSTONE.to_string();
            }
            if !status.is_empty() {
                sheet.set_cell(0, r, Cell::new(status))?;
            }
        }

        let mut header = None;
        if self.state.header_height > 0 {
            let last = self.state.header_height - 1;
            if last < sheet.height() {
                let key = clean(sheet.cell(0, last)?);
                if key.is_empty() || key == SEPARATOR {
                    for r in 0..=last {
                        let text = format!("@{}", clean(sheet.cell(0, r)?));
                        sheet.set_cell(0, r, Cell::new(text))?;
                    }
                    header = Some(last);
                }
            }
        }
        let synthesized = header.is_none();
        let header = match header {
            Some(r) => r,
            None => {
                sheet.insert_row(Some(0))?;
                sheet.set_cell(0, 0, Cell::new("@@"))?;
                for (c, name) in self.state.active_columns.iter().enumerate() {
                    if c as u32 + 1 < sheet.width() {
                        sheet.set_cell(c as u32 + 1, 0, Cell::new(name.as_str()))?;
                    }
                }
                0
            }
        };

        let mut offset = 0;
        if self.state.column_status.iter().any(|s| !s.is_empty()) {
            sheet.insert_row(Some(0))?;
            sheet.set_cell(0, 0, Cell::new("!"))?;
            for (c, status) in self.state.column_status.iter().enumerate() {
                if c as u32 + 1 < sheet.width() {
                    sheet.set_cell(c as u32 + 1, 0, Cell::new(status.as_str()))?;
                }
            }
            offset = 1;
        }

        let height = sheet.height();
        let width = sheet.width();
        let mut show = vec![false; height as usize];
        for r in 0..height {
            if !clean(sheet.cell(0, r)?).is_empty() {
                let lo = r.saturating_sub(context);
                let hi = r.saturating_add(context).min(height - 1);
                for k in lo..=hi {
                    show[k as usize] = true;
                }
            }
        }
        // final position of every row present before the collapse
        let mut landed = Vec::with_capacity(show.len());
        let mut k = 0;
        let mut in_break = false;
        for visible in show {
            if visible {
                in_break = false;
                landed.push(Some(k));
            } else if in_break {
                sheet.delete_row(k)?;
                landed.push(None);
                continue;
            } else {
                for c in 0..width {
                    sheet.set_cell(c, k, Cell::new(ELLIPSIS))?;
                }
                in_break = true;
                landed.push(None);
            }
            k += 1;
        }

        let mut gutter = Vec::new();
        for r in 0..sheet.height() {
            let status = clean(sheet.cell(0, r)?);
            if !status.is_empty() && status != ELLIPSIS {
                gutter.push(r);
            }
        }
        log::debug!("descriptive layout finished after {} changes", self.change_count);

        let Some(styles) = self.styles.as_mut() else {
            return Ok(());
        };
        let added = (offset + u32::from(synthesized)) as usize;
        let final_row = |r: usize| landed.get(r + added).copied().flatten();
        for (c, style) in self.state.column_styles.iter().enumerate() {
            if let Some(style) = style {
                styles.style_column(c as u32 + 1, *style);
            }
        }
        for (r, row) in self.state.row_styles.iter().enumerate() {
            let Some(at) = final_row(r) else { continue };
            if let Some(style) = row.row {
                styles.style_row(at, style);
            }
            for &(c, style) in &row.cells {
                styles.style_cell(c + 1, at, style);
            }
        }
        let bold = Style::default().bold(true);
        for r in gutter {
            styles.style_cell(0, r, bold);
        }
        if let Some(at) = landed.get((header + offset) as usize).copied().flatten() {
            styles.style_row(at, bold);
        }
        Ok(())
    }
}

impl<B: Book> Patcher for SheetPatcher<'_, B> {
    fn change_config(&mut self, change: &ConfigChange) -> Result<(), PatchError> {
        self.state.config = *change;
        Ok(())
    }

    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        attached(&mut self.book, self.sheet)?;
        self.change_count += 1;
        let subject = change.subject;
        let missing = || PatchError::ColumnNotFound {
            name: format!("#{subject}"),
        };
        log::debug!("column {} of #{subject}", change.mode.as_str());
        match change.mode {
            OrderChangeMode::Delete => {
                let name = change.name_before(subject).ok_or_else(missing)?;
                let idx = self.state.match_col(name)?;
                self.delete_column(idx)
            }
            OrderChangeMode::Insert => {
                let name = change.name_after(subject).ok_or_else(missing)?;
                self.insert_column(name, change.successor_after(subject))
            }
            OrderChangeMode::Move => {
                let name = change.name_after(subject).ok_or_else(missing)?;
                let idx = self.state.match_col(name)?;
                let to = change
                    .successor_after(subject)
                    .map(|n| self.state.match_col(n))
                    .transpose()?;
                self.move_column(idx, to)
            }
            OrderChangeMode::Rename => {
                let old = change.name_before(subject).ok_or_else(missing)?;
                let new = change.name_after(subject).ok_or_else(missing)?;
                let idx = self.state.match_col(old)?;
                self.state.rename_column(idx as usize, new);
                Ok(())
            }
        }
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        let sheet = attached(&mut self.book, self.sheet)?;
        self.change_count += 1;
        let width = sheet.width() as usize;
        let height = sheet.height() as usize;
        if self.state.row_status.len() != height {
            self.state.fit_rows(height);
        }
        if !change.sequential {
            self.state.row_cursor = None;
        }
        let (cond, active_conds) = self.state.resolve(&change.cond, width);
        let (val, _) = self.state.resolve(&change.val, width);
        log::debug!(
            "row {} {} at cursor {:?}",
            change.mode,
            change.describe_cond(),
            self.state.row_cursor
        );

        match change.mode {
            RowChangeMode::Insert => self.insert_row(&val),
            RowChangeMode::Delete => {
                let sheet = attached(&mut self.book, self.sheet)?;
                let Some(r) = match_row(sheet, &self.state.row_status, &cond) else {
                    return Err(self.no_match(change));
                };
                self.delete_row(r)
            }
            RowChangeMode::Context => {
                if active_conds == 0 {
                    self.state.row_cursor = Some(0);
                    return Ok(());
                }
                let sheet = attached(&mut self.book, self.sheet)?;
                let Some(r) = match_row(sheet, &self.state.row_status, &cond) else {
                    return Err(self.no_match(change));
                };
                self.state.row_cursor = cursor_after(r, sheet.height());
                Ok(())
            }
            RowChangeMode::Update => {
                let sheet = attached(&mut self.book, self.sheet)?;
                let Some(r) = match_row(sheet, &self.state.row_status, &cond) else {
                    return Err(self.no_match(change));
                };
                let height = sheet.height();
                self.mark_changes(r, &val)?;
                self.state.row_cursor = cursor_after(r, height);
                Ok(())
            }
            RowChangeMode::Move => {
                let sheet = attached(&mut self.book, self.sheet)?;
                let Some(from) = match_row(sheet, &self.state.row_status, &cond) else {
                    return Err(self.no_match(change));
                };
                let height = sheet.height();
                let r = sheet.move_row(from, self.state.row_cursor)?;
                self.state.move_row(from as usize, r as usize);
                self.mark_changes(r, &val)?;
                self.state.row_cursor = cursor_after(r, height);
                Ok(())
            }
        }
    }

    fn declare_names(&mut self, names: &[String], is_final: bool) -> Result<(), PatchError> {
        let sheet = attached(&mut self.book, self.sheet)?;
        if self.state.config.trust_names {
            return Err(PatchError::Unsupported {
                what: "name-trusting column matching".to_string(),
            });
        }
        let descriptive = self.config.is_descriptive();
        let width = sheet.width() as usize;
        if !descriptive && names.len() != width {
            return Err(PatchError::NameMismatch {
                expected: width,
                got: names.len(),
            });
        }
        if !is_final {
            let pairs: Vec<(String, String)> = names
                .iter()
                .zip(&self.state.active_columns)
                .filter(|(declared, active)| declared != active && declared.starts_with('['))
                .map(|(declared, active)| (declared.clone(), active.clone()))
                .collect();
            for (synonym, name) in pairs {
                log::debug!("column '{name}' also known as '{synonym}'");
                self.state.add_synonym(&synonym, &name);
            }
            self.state.update_cols();
            return Ok(());
        }
        if descriptive {
            return Ok(());
        }
        for (i, declared) in names.iter().enumerate() {
            let Some(active) = self.state.active_columns.get(i) else {
                break;
            };
            if declared == active || declared.starts_with('[') {
                continue;
            }
            let active = active.clone();
            let from = self.state.match_col(declared)?;
            let to = self.state.match_col(&active)?;
            self.move_column(from, Some(to))?;
        }
        self.state.update_cols();
        Ok(())
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        self.pools.push(change.clone());
        Ok(())
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.state.reset();
        self.sheet = None;
        let index = match self.book.sheet_index(name) {
            Some(i) => i,
            None if !self.book.named_sheets() && self.book.sheet(0).is_some() => 0,
            None => {
                return Err(PatchError::SheetNotFound {
                    requested: name.to_string(),
                    available: self.book.sheet_names(),
                });
            }
        };
        log::debug!("attached sheet '{name}' (#{index})");
        self.sheet = Some(index);
        self.set_names();
        Ok(())
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        attached(&mut self.book, self.sheet)?;
        self.state.kill_neutral = false;
        self.state.clear_rows();
        self.state.row_cursor = None;
        self.set_names();
        Ok(())
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        if !self.config.is_descriptive() {
            return Ok(());
        }
        self.finish_descriptive()
    }
}
