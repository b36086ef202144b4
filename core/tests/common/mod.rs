//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use sheet_patch::{
    LetterSniffer, MemBook, MemSheet, OrderChange, OrderChangeMode, PatchConfig, Patcher,
    SheetPatcher,
};

pub fn sheet(rows: &[&[&str]]) -> MemSheet {
    MemSheet::from_rows(rows.iter().map(|row| row.iter().copied()))
}

pub fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// A patcher attached to `rows` whose columns are named `A`, `B`, ...
pub fn letters_patcher(rows: &[&[&str]], config: PatchConfig) -> SheetPatcher<'static, MemBook> {
    let mut patcher =
        SheetPatcher::new(MemBook::unnamed(sheet(rows)), config).with_sniffer(LetterSniffer);
    patcher.set_sheet("sheet").expect("unnamed book accepts any sheet name");
    patcher.merge_start().expect("sheet is attached");
    patcher
}

/// A patcher attached to `rows` whose first row is a header.
pub fn header_patcher(rows: &[&[&str]], config: PatchConfig) -> SheetPatcher<'static, MemBook> {
    let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet(rows)), config);
    patcher.set_sheet("sheet").expect("unnamed book accepts any sheet name");
    patcher.merge_start().expect("sheet is attached");
    patcher
}

pub fn texts(patcher: &SheetPatcher<'_, MemBook>) -> Vec<Vec<String>> {
    patcher.sheet().expect("sheet is attached").text_rows()
}

/// A column change between two name lists, with identities given in the
/// same order as the names.
pub fn column_change(
    mode: OrderChangeMode,
    subject: i32,
    before: (&[i32], &[&str]),
    after: (&[i32], &[&str]),
) -> OrderChange {
    OrderChange::new(mode, subject)
        .with_before(before.0.iter().copied(), before.1.iter().copied())
        .with_after(after.0.iter().copied(), after.1.iter().copied())
}
