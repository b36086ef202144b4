use serde::Serialize;

use crate::alignment::viterbi::decode;
use crate::change::{CellMap, RowChange, RowChangeMode};
use crate::config::AlignmentCosts;
use crate::hashing::row_fingerprint;

/// How one rendered row should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLabel {
    Kept,
    Changed,
    Moved,
    Inserted,
    Deleted,
}

/// One line of rendered output.
///
/// `cond` holds the identifying cells of the row before the change and `val`
/// the cells that differ afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowInstruction {
    pub label: RowLabel,
    pub cond: CellMap,
    pub val: CellMap,
}

const LITERAL: usize = 0;
const MERGE_HEAD: usize = 1;
const MERGE_TAIL: usize = 2;

/// Whether two adjacent events can be shown as one changed row.
fn mergeable(a: &RowChange, b: &RowChange) -> bool {
    let pair = matches!(
        (a.mode, b.mode),
        (RowChangeMode::Delete, RowChangeMode::Insert)
            | (RowChangeMode::Insert, RowChangeMode::Delete)
    );
    pair && a
        .touched_columns()
        .any(|name| b.cond.contains_key(name) || b.val.contains_key(name))
}

fn literal_label(mode: RowChangeMode) -> RowLabel {
    match mode {
        RowChangeMode::Insert => RowLabel::Inserted,
        RowChangeMode::Delete => RowLabel::Deleted,
        RowChangeMode::Update => RowLabel::Changed,
        RowChangeMode::Move => RowLabel::Moved,
        RowChangeMode::Context => RowLabel::Kept,
    }
}

fn label_cost(label: RowLabel, costs: &AlignmentCosts) -> u32 {
    match label {
        RowLabel::Kept => costs.kept,
        RowLabel::Changed => costs.changed,
        RowLabel::Moved => costs.moved,
        RowLabel::Inserted => costs.inserted,
        RowLabel::Deleted => costs.deleted,
    }
}

fn literal(change: &RowChange) -> RowInstruction {
    let label = literal_label(change.mode);
    let (cond, val) = match label {
        RowLabel::Inserted => (CellMap::new(), change.val.clone()),
        RowLabel::Deleted | RowLabel::Kept => (change.cond.clone(), CellMap::new()),
        RowLabel::Changed | RowLabel::Moved => (change.cond.clone(), change.val.clone()),
    };
    RowInstruction { label, cond, val }
}

fn merged(a: &RowChange, b: &RowChange) -> RowInstruction {
    let (deleted, inserted) = if a.mode == RowChangeMode::Delete {
        (a, b)
    } else {
        (b, a)
    };
    let before = &deleted.cond;
    let after = &inserted.val;
    if row_fingerprint(before) == row_fingerprint(after) && before == after {
        return RowInstruction {
            label: RowLabel::Kept,
            cond: before.clone(),
            val: CellMap::new(),
        };
    }
    let val = after
        .iter()
        .filter(|(name, cell)| before.get(*name) != Some(*cell))
        .map(|(name, cell)| (name.clone(), cell.clone()))
        .collect();
    RowInstruction {
        label: RowLabel::Changed,
        cond: before.clone(),
        val,
    }
}

/// Label a window of row events with the cheapest rendering.
///
/// Each event is either rendered as its literal label or, when a delete and an
/// insert are adjacent and share a column, merged with its neighbour into one
/// changed row. Event order is preserved.
pub fn interpret(events: &[RowChange], costs: &AlignmentCosts) -> Vec<RowInstruction> {
    let n = events.len();
    let step_cost = |step: usize, prev: Option<usize>, next: usize| -> Option<u32> {
        match (prev, next) {
            (Some(MERGE_HEAD), MERGE_TAIL) if mergeable(&events[step - 1], &events[step]) => {
                Some(costs.merged_pair)
            }
            (Some(MERGE_HEAD), _) | (_, MERGE_TAIL) => None,
            (_, MERGE_HEAD) => (step + 1 < n && mergeable(&events[step], &events[step + 1]))
                .then_some(0),
            (_, _) => Some(label_cost(literal_label(events[step].mode), costs)),
        }
    };
    let Some(decoded) = decode(3, n, step_cost) else {
        return events.iter().map(literal).collect();
    };

    let mut out = Vec::with_capacity(n);
    let mut step = 0;
    while step < n {
        if decoded.path[step] == MERGE_HEAD {
            out.push(merged(&events[step], &events[step + 1]));
            step += 2;
        } else {
            debug_assert_eq!(decoded.path[step], LITERAL);
            out.push(literal(&events[step]));
            step += 1;
        }
    }
    out
}
