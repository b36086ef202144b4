mod common;

use common::{column_change, header_patcher, letters_patcher, sheet, strings, texts};
use sheet_patch::{
    MemBook, OrderChangeMode, PatchConfig, Patcher, RecordingStyles, Rgb16, RowChange,
    SheetPatcher, Style, StyleTarget, TOMBSTONE,
};

#[test]
fn update_is_shown_next_to_the_old_value() {
    let mut patcher = letters_patcher(&[&["1", "2"], &["3", "4"]], PatchConfig::descriptive());
    patcher
        .change_row(&RowChange::update().with_cond("A", "1").with_val("B", "9"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "2->9"], vec!["3", "4"]]);
    assert_eq!(patcher.state().row_status, strings(&["->", ""]));
}

#[test]
fn unchanged_runs_collapse_around_changes() {
    let rows: &[&[&str]] = &[
        &["id", "v"],
        &["1", "a"],
        &["2", "b"],
        &["3", "c"],
        &["4", "d"],
        &["5", "e"],
        &["6", "f"],
        &["7", "g"],
    ];
    let mut styles = RecordingStyles::new();
    {
        let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet(rows)), PatchConfig::descriptive())
            .with_styles(&mut styles);
        patcher.set_sheet("s").unwrap();
        patcher.merge_start().unwrap();
        patcher
            .change_row(&RowChange::update().with_cond("id", "1").with_val("v", "x"))
            .unwrap();
        patcher.merge_all_done().unwrap();
        assert_eq!(
            texts(&patcher),
            vec![
                vec!["@", "id", "v"],
                vec!["->", "1", "a->x"],
                vec!["", "2", "b"],
                vec!["", "3", "c"],
                vec!["...", "...", "..."],
            ]
        );
    }
    let changed = Style::default().background(Rgb16::CHANGED).bold(true);
    assert!(
        styles
            .applied
            .contains(&(StyleTarget::Cell { col: 2, row: 1 }, changed))
    );
    let bold = Style::default().bold(true);
    assert!(styles.applied.contains(&(StyleTarget::Row(0), bold)));
    assert!(styles.applied.contains(&(StyleTarget::Cell { col: 0, row: 1 }, bold)));
}

#[test]
fn context_window_is_configurable() {
    let config = PatchConfig::builder()
        .mode(sheet_patch::PatchMode::Descriptive)
        .context_rows(0)
        .build()
        .unwrap();
    let mut patcher = header_patcher(&[&["id"], &["1"], &["2"], &["3"]], config);
    patcher
        .change_row(&RowChange::update().with_cond("id", "3").with_val("id", "9"))
        .unwrap();
    patcher.merge_all_done().unwrap();
    assert_eq!(
        texts(&patcher),
        vec![vec!["@", "id"], vec!["...", "..."], vec!["->", "3->9"]]
    );
}

#[test]
fn inserted_column_and_row_are_flagged() {
    let mut patcher = letters_patcher(&[&["1", "2"]], PatchConfig::descriptive());
    let change = column_change(
        OrderChangeMode::Insert,
        2,
        (&[0, 1], &["A", "B"]),
        (&[0, 2, 1], &["A", "C", "B"]),
    );
    patcher.change_column(&change).unwrap();
    patcher
        .change_row(&RowChange::insert().with_val("A", "3"))
        .unwrap();
    patcher.merge_all_done().unwrap();
    assert_eq!(
        texts(&patcher),
        vec![
            vec!["!", "", "+++", ""],
            vec!["@@", "A", "C", "B"],
            vec!["", "1", "", "2"],
            vec!["+++", "3", "", ""],
        ]
    );
}

#[test]
fn deleted_row_stays_but_is_struck() {
    let mut styles = RecordingStyles::new();
    {
        let mut patcher =
            SheetPatcher::new(MemBook::unnamed(sheet(&[&["1"], &["2"]])), PatchConfig::descriptive())
                .with_sniffer(sheet_patch::LetterSniffer)
                .with_styles(&mut styles);
        patcher.set_sheet("s").unwrap();
        patcher.merge_start().unwrap();
        patcher
            .change_row(&RowChange::delete().with_cond("A", "2"))
            .unwrap();
        patcher.merge_all_done().unwrap();
        assert_eq!(
            texts(&patcher),
            vec![vec!["@@", "A"], vec!["", "1"], vec![TOMBSTONE, "2"]]
        );
    }
    let struck = Style::default()
        .background(Rgb16::DELETED)
        .strikethrough(true);
    assert!(styles.applied.contains(&(StyleTarget::Row(2), struck)));
}

#[test]
fn styles_land_on_the_final_layout() {
    let rows: Vec<Vec<String>> = (1..=12)
        .map(|i| vec![i.to_string(), ((b'a' + i as u8 - 1) as char).to_string()])
        .collect();
    let mut styles = RecordingStyles::new();
    let final_rows = {
        let sheet = sheet_patch::MemSheet::from_rows(rows);
        let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet), PatchConfig::descriptive())
            .with_sniffer(sheet_patch::LetterSniffer)
            .with_styles(&mut styles);
        patcher.set_sheet("s").unwrap();
        patcher.merge_start().unwrap();
        patcher
            .change_row(&RowChange::update().with_cond("A", "2").with_val("B", "z"))
            .unwrap();
        patcher
            .change_column(&column_change(
                OrderChangeMode::Insert,
                2,
                (&[0, 1], &["A", "B"]),
                (&[0, 2, 1], &["A", "C", "B"]),
            ))
            .unwrap();
        patcher
            .change_row(&RowChange::delete().with_cond("A", "12").non_sequential())
            .unwrap();
        patcher.merge_all_done().unwrap();
        texts(&patcher)
    };
    assert_eq!(
        final_rows,
        vec![
            vec!["!", "", "+++", ""],
            vec!["@@", "A", "C", "B"],
            vec!["", "1", "", "a"],
            vec!["->", "2", "", "b->z"],
            vec!["", "3", "", "c"],
            vec!["", "4", "", "d"],
            vec!["...", "...", "...", "..."],
            vec!["", "10", "", "j"],
            vec!["", "11", "", "k"],
            vec![TOMBSTONE, "12", "", "l"],
        ]
    );

    let changed = Style::default().background(Rgb16::CHANGED).bold(true);
    let struck = Style::default()
        .background(Rgb16::DELETED)
        .strikethrough(true);
    let inserted = Style::default().background(Rgb16::INSERTED);
    for (target, style) in &styles.applied {
        match *target {
            StyleTarget::Cell { col, row } if *style == changed => {
                assert!(final_rows[row as usize][col as usize].contains("->"));
            }
            StyleTarget::Row(row) if *style == struck => {
                assert_eq!(final_rows[row as usize][0], TOMBSTONE);
            }
            StyleTarget::Column(col) if *style == inserted => {
                assert_eq!(final_rows[0][col as usize], "+++");
            }
            StyleTarget::Cell { col: 0, row } => {
                assert!(!final_rows[row as usize][0].is_empty());
            }
            _ => {}
        }
    }
    for expected in [
        (StyleTarget::Cell { col: 3, row: 3 }, changed),
        (StyleTarget::Row(9), struck),
        (StyleTarget::Column(2), inserted),
        (StyleTarget::Row(1), Style::default().bold(true)),
    ] {
        assert!(styles.applied.contains(&expected), "{expected:?}");
    }
}

#[test]
fn deleting_every_column_strikes_every_row() {
    let mut patcher = letters_patcher(&[&["1"], &["2"]], PatchConfig::descriptive());
    let change = column_change(OrderChangeMode::Delete, 0, (&[0], &["A"]), (&[], &[]));
    patcher.change_column(&change).unwrap();
    assert!(patcher.state().kill_neutral);
    patcher.change_row(&RowChange::context()).unwrap();
    patcher.merge_all_done().unwrap();
    assert_eq!(
        texts(&patcher),
        vec![
            vec!["!", TOMBSTONE],
            vec!["@@", "A"],
            vec![TOMBSTONE, "1"],
            vec![TOMBSTONE, "2"],
        ]
    );
}

#[test]
fn moved_column_is_annotated_not_moved() {
    let mut patcher = letters_patcher(&[&["1", "2", "3"]], PatchConfig::descriptive());
    let change = column_change(
        OrderChangeMode::Move,
        2,
        (&[0, 1, 2], &["A", "B", "C"]),
        (&[2, 0, 1], &["C", "A", "B"]),
    );
    patcher.change_column(&change).unwrap();
    assert_eq!(patcher.column_status(), strings(&["", "", "<<"]).as_slice());
    assert_eq!(texts(&patcher), vec![vec!["1", "2", "3"]]);
}

#[test]
fn names_count_is_not_enforced_when_describing() {
    let mut patcher = letters_patcher(&[&["1", "2"]], PatchConfig::descriptive());
    patcher.declare_names(&strings(&["A"]), false).unwrap();
    patcher.declare_names(&strings(&["B", "A"]), true).unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "2"]]);
}
