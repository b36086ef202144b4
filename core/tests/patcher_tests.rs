mod common;

use common::{column_change, header_patcher, letters_patcher, strings, texts};
use sheet_patch::{
    Book, Cell, MemBook, MemSheet, OrderChangeMode, PatchConfig, PatchError, Patcher, RowChange,
    RowChangeMode, Sheet, SheetPatcher, content_hash, sheets_equal,
};

#[test]
fn insert_column_before_existing_column() {
    let mut patcher = letters_patcher(&[&["1", "2"]], PatchConfig::default());
    let change = column_change(
        OrderChangeMode::Insert,
        2,
        (&[0, 1], &["A", "B"]),
        (&[0, 2, 1], &["A", "C", "B"]),
    );
    patcher.change_column(&change).unwrap();
    assert_eq!(patcher.active_columns(), strings(&["A", "C", "B"]).as_slice());
    assert_eq!(texts(&patcher), vec![vec!["1", "", "2"]]);
}

#[test]
fn insert_column_at_end() {
    let mut patcher = letters_patcher(&[&["1", "2"]], PatchConfig::default());
    let change = column_change(
        OrderChangeMode::Insert,
        2,
        (&[0, 1], &["A", "B"]),
        (&[0, 1, 2], &["A", "B", "C"]),
    );
    patcher.change_column(&change).unwrap();
    patcher
        .change_row(&RowChange::update().with_cond("A", "1").with_val("C", "3"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "2", "3"]]);
}

#[test]
fn update_overwrites_and_advances_cursor() {
    let mut patcher = letters_patcher(&[&["1", "2"], &["3", "4"]], PatchConfig::default());
    patcher
        .change_row(&RowChange::update().with_cond("A", "1").with_val("B", "9"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "9"], vec!["3", "4"]]);
    assert_eq!(patcher.row_cursor(), Some(1));
}

#[test]
fn sequential_inserts_keep_their_order() {
    let mut patcher = letters_patcher(&[], PatchConfig::default());
    // an empty sheet has no columns to sniff, so give it one
    let change = column_change(OrderChangeMode::Insert, 0, (&[], &[]), (&[0], &["A"]));
    patcher.change_column(&change).unwrap();
    for value in ["1", "2", "3"] {
        patcher
            .change_row(&RowChange::insert().with_val("A", value))
            .unwrap();
    }
    assert_eq!(texts(&patcher), vec![vec!["1"], vec!["2"], vec!["3"]]);
}

#[test]
fn context_anchors_the_next_insert() {
    let mut patcher = letters_patcher(&[&["1"], &["3"]], PatchConfig::default());
    patcher
        .change_row(&RowChange::context().with_cond("A", "1"))
        .unwrap();
    assert_eq!(patcher.row_cursor(), Some(1));
    patcher
        .change_row(&RowChange::insert().with_val("A", "2"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1"], vec!["2"], vec!["3"]]);
    assert_eq!(patcher.row_cursor(), Some(2));
}

#[test]
fn context_without_conditions_rewinds_to_the_top() {
    let mut patcher = letters_patcher(&[&["2"]], PatchConfig::default());
    patcher.change_row(&RowChange::context()).unwrap();
    assert_eq!(patcher.row_cursor(), Some(0));
    patcher
        .change_row(&RowChange::insert().with_val("A", "1"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1"], vec!["2"]]);
}

#[test]
fn failed_match_only_forgets_the_cursor() {
    let mut patcher = letters_patcher(&[&["1", "2"], &["3", "4"]], PatchConfig::default());
    patcher
        .change_row(&RowChange::context().with_cond("A", "1"))
        .unwrap();
    let before = content_hash(patcher.sheet().unwrap(), false);

    for mode in [RowChangeMode::Update, RowChangeMode::Delete, RowChangeMode::Move] {
        patcher
            .change_row(&RowChange::context().with_cond("A", "1"))
            .unwrap();
        let change = RowChange::new(mode).with_cond("A", "9").with_val("B", "0");
        let err = patcher.change_row(&change).unwrap_err();
        assert_eq!(
            err,
            PatchError::RowNotFound {
                mode,
                cond: "{A=9}".to_string()
            }
        );
        assert_eq!(patcher.row_cursor(), None);
        assert_eq!(content_hash(patcher.sheet().unwrap(), false), before);
    }

    // the session carries on
    patcher
        .change_row(&RowChange::update().with_cond("A", "3").with_val("B", "5"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "2"], vec!["3", "5"]]);
}

#[test]
fn unknown_columns_are_ignored() {
    let mut patcher = letters_patcher(&[&["1", "2"]], PatchConfig::default());
    patcher
        .change_row(
            &RowChange::update()
                .with_cond("A", "1")
                .with_cond("gone", "x")
                .with_val("B", "7")
                .with_val("gone", "y"),
        )
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "7"]]);
}

#[test]
fn move_row_lands_at_the_cursor() {
    let mut patcher = letters_patcher(&[&["a"], &["b"], &["c"]], PatchConfig::default());
    patcher.change_row(&RowChange::context()).unwrap();
    patcher
        .change_row(&RowChange::moved().with_cond("A", "c"))
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["c"], vec!["a"], vec!["b"]]);
    assert_eq!(patcher.row_cursor(), Some(1));
}

#[test]
fn null_cells_match_only_nulls() {
    let mut sheet = MemSheet::from_rows([["", "1"], ["", "2"]]);
    sheet.set_cell(0, 1, Cell::null()).unwrap();
    let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet), PatchConfig::default())
        .with_sniffer(sheet_patch::LetterSniffer);
    patcher.set_sheet("s").unwrap();
    patcher.merge_start().unwrap();
    patcher
        .change_row(
            &RowChange::update()
                .with_cond("A", Cell::null())
                .with_val("B", "x"),
        )
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["", "1"], vec!["", "x"]]);
}

#[test]
fn keyed_sheets_append_through_pending_rows() {
    let mut patcher = SheetPatcher::new(MemBook::unnamed(MemSheet::keyed(2)), PatchConfig::default());
    patcher.set_sheet("s").unwrap();
    patcher.merge_start().unwrap();
    patcher
        .change_row(&RowChange::insert().with_val("B", "2").with_val("A", "1"))
        .unwrap();
    patcher
        .change_row(&RowChange::insert().with_val("A", "3").non_sequential())
        .unwrap();
    assert_eq!(texts(&patcher), vec![vec!["1", "2"], vec!["3", ""]]);
    assert_eq!(patcher.state().row_status, strings(&["+++", "+++"]));
}

#[test]
fn column_identities_survive_a_sequence_of_edits() {
    let mut patcher = letters_patcher(&[&["a", "b", "c"]], PatchConfig::default());

    let moved = column_change(
        OrderChangeMode::Move,
        2,
        (&[0, 1, 2], &["A", "B", "C"]),
        (&[2, 0, 1], &["C", "A", "B"]),
    );
    patcher.change_column(&moved).unwrap();
    assert_eq!(texts(&patcher), vec![vec!["c", "a", "b"]]);

    let deleted = column_change(
        OrderChangeMode::Delete,
        0,
        (&[2, 0, 1], &["C", "A", "B"]),
        (&[2, 1], &["C", "B"]),
    );
    assert_eq!(deleted.identity_to_index(0), Some(1));
    assert_eq!(deleted.identity_to_index_after(1), Some(1));
    patcher.change_column(&deleted).unwrap();
    assert_eq!(texts(&patcher), vec![vec!["c", "b"]]);

    let inserted = column_change(
        OrderChangeMode::Insert,
        3,
        (&[2, 1], &["C", "B"]),
        (&[2, 1, 3], &["C", "B", "D"]),
    );
    patcher.change_column(&inserted).unwrap();

    let renamed = column_change(
        OrderChangeMode::Rename,
        1,
        (&[2, 1, 3], &["C", "B", "D"]),
        (&[2, 1, 3], &["C", "Beta", "D"]),
    );
    patcher.change_column(&renamed).unwrap();

    patcher
        .change_row(
            &RowChange::update()
                .with_cond("C", "c")
                .with_val("Beta", "bb")
                .with_val("D", "d"),
        )
        .unwrap();
    assert_eq!(patcher.active_columns(), strings(&["C", "Beta", "D"]).as_slice());
    assert_eq!(texts(&patcher), vec![vec!["c", "bb", "d"]]);
}

#[test]
fn missing_column_is_reported_by_name() {
    let mut patcher = letters_patcher(&[&["1"]], PatchConfig::default());
    let change = column_change(OrderChangeMode::Delete, 5, (&[5], &["Z"]), (&[], &[]));
    assert_eq!(
        patcher.change_column(&change),
        Err(PatchError::ColumnNotFound {
            name: "Z".to_string()
        })
    );
}

#[test]
fn patching_reproduces_the_target_sheet() {
    let target = MemSheet::from_rows([["id", "v"], ["1", "x"], ["3", "c"]]);
    let mut patcher = header_patcher(
        &[&["id", "v"], &["1", "a"], &["2", "b"]],
        PatchConfig::default(),
    );
    assert_eq!(patcher.active_columns(), strings(&["id", "v"]).as_slice());
    for change in [
        RowChange::update().with_cond("id", "1").with_val("v", "x"),
        RowChange::delete().with_cond("id", "2").with_cond("v", "b"),
        RowChange::insert().with_val("id", "3").with_val("v", "c"),
    ] {
        patcher.change_row(&change).unwrap();
    }
    assert!(sheets_equal(patcher.sheet().unwrap(), &target));
}

#[test]
fn set_sheet_finds_named_sheets_only() {
    let book = MemBook::new()
        .with_sheet("people", MemSheet::from_rows([["id"], ["1"]]))
        .with_sheet("places", MemSheet::from_rows([["city"], ["Oslo"]]));
    let mut patcher = SheetPatcher::new(book, PatchConfig::default());

    let err = patcher.set_sheet("things").unwrap_err();
    assert_eq!(
        err,
        PatchError::SheetNotFound {
            requested: "things".to_string(),
            available: strings(&["people", "places"]),
        }
    );
    assert!(err.is_terminal());
    assert_eq!(
        patcher.change_row(&RowChange::context()),
        Err(PatchError::SheetUnavailable)
    );

    patcher.set_sheet("places").unwrap();
    patcher.merge_start().unwrap();
    patcher
        .change_row(&RowChange::update().with_cond("city", "Oslo").with_val("city", "Bergen"))
        .unwrap();
    let book = patcher.into_book();
    assert_eq!(book.get("places").unwrap().text_rows()[1], vec!["Bergen"]);
    assert_eq!(book.get("people").unwrap().text_rows()[1], vec!["1"]);
    assert_eq!(book.sheet_names(), strings(&["people", "places"]));
}

#[test]
fn set_sheet_resets_session_state() {
    let mut patcher = letters_patcher(&[&["1"], &["2"]], PatchConfig::default());
    patcher
        .change_row(&RowChange::context().with_cond("A", "1"))
        .unwrap();
    assert_eq!(patcher.row_cursor(), Some(1));
    patcher.set_sheet("again").unwrap();
    assert_eq!(patcher.row_cursor(), None);
    assert_eq!(patcher.active_columns(), strings(&["A"]).as_slice());
}

#[test]
fn read_only_sheets_refuse_edits() {
    let sheet = MemSheet::from_rows([["1"]]).read_only();
    let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet), PatchConfig::default())
        .with_sniffer(sheet_patch::LetterSniffer);
    patcher.set_sheet("s").unwrap();
    patcher.merge_start().unwrap();
    let err = patcher
        .change_row(&RowChange::update().with_cond("A", "1").with_val("A", "2"))
        .unwrap_err();
    assert_eq!(err, PatchError::Sheet(sheet_patch::SheetError::NotWritable));
    assert!(!err.is_terminal());
}
