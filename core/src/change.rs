//! The change model: one record per atomic edit in a change stream.
//!
//! - [`ConfigChange`]: session-wide policy
//! - [`OrderChange`]: column delete/insert/move/rename
//! - [`RowChange`]: row delete/insert/update/context/move
//! - [`NameChange`]: column-name declarations
//! - [`PoolChange`] / [`TableField`] / [`LinkDeclare`]: cross-table references
//! - [`PatchEvent`]: any inbound call on a [`Patcher`], as data
//!
//! Records are produced by an upstream comparison, consumed in order, and
//! never mutated by patchers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::PatchError;
use crate::sink::Patcher;

pub type CellMap = BTreeMap<String, Cell>;

/// Session-wide comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigChange {
    pub ordered: bool,
    pub complete: bool,
    /// Match columns by name rather than position.
    pub trust_names: bool,
}

impl Default for ConfigChange {
    fn default() -> Self {
        Self {
            ordered: true,
            complete: true,
            trust_names: false,
        }
    }
}

/// Name of one field within one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableField {
    pub table_name: String,
    pub field_name: String,
    #[serde(default)]
    pub invented: bool,
}

impl TableField {
    pub fn new(table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            field_name: field_name.into(),
            invented: false,
        }
    }
}

impl std::fmt::Display for TableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.table_name, self.field_name)?;
        if self.invented {
            write!(f, "(create)")?;
        }
        Ok(())
    }
}

/// A pool of fields that must share a value space across tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolChange {
    pub pool_name: String,
    pub table_name: String,
    pub pool: Vec<TableField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderChangeMode {
    Delete,
    Insert,
    Move,
    Rename,
}

impl OrderChangeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderChangeMode::Delete => "delete",
            OrderChangeMode::Insert => "insert",
            OrderChangeMode::Move => "move",
            OrderChangeMode::Rename => "rename",
        }
    }
}

/// A column edit.
///
/// `indices_before`/`names_before` map each pre-change position to a column
/// identity and display name; `indices_after`/`names_after` do the same after
/// the change. `subject` and `object` are identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChange {
    pub mode: OrderChangeMode,
    pub subject: i32,
    #[serde(default = "no_identity")]
    pub object: i32,
    pub indices_before: Vec<i32>,
    pub names_before: Vec<String>,
    pub indices_after: Vec<i32>,
    pub names_after: Vec<String>,
}

fn no_identity() -> i32 {
    -1
}

impl OrderChange {
    pub fn new(mode: OrderChangeMode, subject: i32) -> Self {
        Self {
            mode,
            subject,
            object: -1,
            indices_before: Vec::new(),
            names_before: Vec::new(),
            indices_after: Vec::new(),
            names_after: Vec::new(),
        }
    }

    pub fn with_before<S: Into<String>>(
        mut self,
        indices: impl IntoIterator<Item = i32>,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.indices_before = indices.into_iter().collect();
        self.names_before = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_after<S: Into<String>>(
        mut self,
        indices: impl IntoIterator<Item = i32>,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.indices_after = indices.into_iter().collect();
        self.names_after = names.into_iter().map(Into::into).collect();
        self
    }

    /// Position of identity `id` before the change.
    pub fn identity_to_index(&self, id: i32) -> Option<usize> {
        self.indices_before.iter().position(|&x| x == id)
    }

    /// Position of identity `id` after the change.
    pub fn identity_to_index_after(&self, id: i32) -> Option<usize> {
        self.indices_after.iter().position(|&x| x == id)
    }

    pub fn name_before(&self, id: i32) -> Option<&str> {
        self.identity_to_index(id)
            .and_then(|i| self.names_before.get(i))
            .map(String::as_str)
    }

    pub fn name_after(&self, id: i32) -> Option<&str> {
        self.identity_to_index_after(id)
            .and_then(|i| self.names_after.get(i))
            .map(String::as_str)
    }

    /// Name of the column displayed immediately after `id` once the change is
    /// applied; `None` when `id` ends up last.
    pub fn successor_after(&self, id: i32) -> Option<&str> {
        let at = self.identity_to_index_after(id)?;
        self.names_after.get(at + 1).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowChangeMode {
    Delete,
    Insert,
    Update,
    Context,
    Move,
}

impl RowChangeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RowChangeMode::Delete => "delete",
            RowChangeMode::Insert => "insert",
            RowChangeMode::Update => "update",
            RowChangeMode::Context => "context",
            RowChangeMode::Move => "move",
        }
    }
}

impl std::fmt::Display for RowChangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row edit.
///
/// `cond` selects the target row, `val` holds values to assign. Entries of
/// `indexes` flag `cond` columns that are positional rather than confirming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    pub mode: RowChangeMode,
    #[serde(default)]
    pub cond: CellMap,
    #[serde(default)]
    pub val: CellMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicting_val: CellMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicting_parent_val: CellMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_names: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, bool>,
    #[serde(default = "yes")]
    pub sequential: bool,
    #[serde(default)]
    pub conflicted: bool,
    #[serde(default = "rows_unknown")]
    pub p_row: i32,
    #[serde(default = "rows_unknown")]
    pub l_row: i32,
    #[serde(default = "rows_unknown")]
    pub r_row: i32,
}

fn yes() -> bool {
    true
}

fn rows_unknown() -> i32 {
    -2
}

impl RowChange {
    pub fn new(mode: RowChangeMode) -> Self {
        Self {
            mode,
            cond: CellMap::new(),
            val: CellMap::new(),
            conflicting_val: CellMap::new(),
            conflicting_parent_val: CellMap::new(),
            names: Vec::new(),
            all_names: Vec::new(),
            indexes: BTreeMap::new(),
            sequential: true,
            conflicted: false,
            p_row: -2,
            l_row: -2,
            r_row: -2,
        }
    }

    pub fn insert() -> Self {
        Self::new(RowChangeMode::Insert)
    }

    pub fn delete() -> Self {
        Self::new(RowChangeMode::Delete)
    }

    pub fn update() -> Self {
        Self::new(RowChangeMode::Update)
    }

    pub fn context() -> Self {
        Self::new(RowChangeMode::Context)
    }

    pub fn moved() -> Self {
        Self::new(RowChangeMode::Move)
    }

    pub fn with_cond(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.cond.insert(name.into(), cell.into());
        self
    }

    pub fn with_val(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.val.insert(name.into(), cell.into());
        self
    }

    /// Mark a `cond` column as positional.
    pub fn with_index(mut self, name: impl Into<String>) -> Self {
        self.indexes.insert(name.into(), true);
        self
    }

    pub fn non_sequential(mut self) -> Self {
        self.sequential = false;
        self
    }

    pub fn with_rows(mut self, p_row: i32, l_row: i32, r_row: i32) -> Self {
        self.p_row = p_row;
        self.l_row = l_row;
        self.r_row = r_row;
        self
    }

    pub fn rows_known(&self) -> bool {
        self.p_row >= -1
    }

    pub fn is_index(&self, name: &str) -> bool {
        self.indexes.get(name).copied().unwrap_or(false)
    }

    /// Column names touched by either `cond` or `val`.
    pub fn touched_columns(&self) -> impl Iterator<Item = &str> {
        self.cond
            .keys()
            .chain(self.val.keys().filter(|k| !self.cond.contains_key(*k)))
            .map(String::as_str)
    }

    /// `cond` rendered as `{a=1, b=2}` for diagnostics.
    pub fn describe_cond(&self) -> String {
        let parts: Vec<String> = self
            .cond
            .iter()
            .map(|(name, cell)| format!("{name}={cell}"))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameChangeMode {
    Declare,
    Select,
}

/// A declaration of the full ordered column-name list.
///
/// Declarations arrive twice per session: once with `final == false` before
/// any column edits, and once with `final == true` after them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameChange {
    pub mode: NameChangeMode,
    pub names: Vec<String>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub loud: bool,
    #[serde(default)]
    pub strong: bool,
}

impl NameChange {
    pub fn declare<S: Into<String>>(names: impl IntoIterator<Item = S>, is_final: bool) -> Self {
        Self {
            mode: NameChangeMode::Declare,
            names: names.into_iter().map(Into::into).collect(),
            is_final,
            constant: false,
            loud: false,
            strong: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDeclareMode {
    Local,
    Remote,
    Merge,
}

/// Declares that rows (or columns) in the pivot/local/remote tables
/// correspond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDeclare {
    pub mode: LinkDeclareMode,
    #[serde(default)]
    pub column: bool,
    pub rc_id_pivot: i32,
    pub rc_id_local: i32,
    pub rc_id_remote: i32,
    #[serde(default)]
    pub rc_deleted: bool,
    #[serde(default)]
    pub rc_str_pivot: String,
    #[serde(default)]
    pub rc_str_local: String,
    #[serde(default)]
    pub rc_str_remote: String,
}

/// Any inbound call on a [`Patcher`], as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PatchEvent {
    Config(ConfigChange),
    Column(OrderChange),
    Row(RowChange),
    Name(NameChange),
    Pool(PoolChange),
    Link(LinkDeclare),
    SetSheet { name: String },
    MergeStart,
    MergeDone,
    MergeAllDone,
}

impl PatchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PatchEvent::Config(_) => "config",
            PatchEvent::Column(_) => "column",
            PatchEvent::Row(_) => "row",
            PatchEvent::Name(_) => "name",
            PatchEvent::Pool(_) => "pool",
            PatchEvent::Link(_) => "link",
            PatchEvent::SetSheet { .. } => "set_sheet",
            PatchEvent::MergeStart => "merge_start",
            PatchEvent::MergeDone => "merge_done",
            PatchEvent::MergeAllDone => "merge_all_done",
        }
    }

    /// Deliver this event to `patcher`.
    pub fn dispatch<P: Patcher + ?Sized>(&self, patcher: &mut P) -> Result<(), PatchError> {
        match self {
            PatchEvent::Config(change) => patcher.change_config(change),
            PatchEvent::Column(change) => patcher.change_column(change),
            PatchEvent::Row(change) => patcher.change_row(change),
            PatchEvent::Name(change) => patcher.change_name(change),
            PatchEvent::Pool(change) => patcher.change_pool(change),
            PatchEvent::Link(decl) => patcher.declare_link(decl),
            PatchEvent::SetSheet { name } => patcher.set_sheet(name),
            PatchEvent::MergeStart => patcher.merge_start(),
            PatchEvent::MergeDone => patcher.merge_done(),
            PatchEvent::MergeAllDone => patcher.merge_all_done(),
        }
    }
}

impl From<OrderChange> for PatchEvent {
    fn from(change: OrderChange) -> Self {
        PatchEvent::Column(change)
    }
}

impl From<RowChange> for PatchEvent {
    fn from(change: RowChange) -> Self {
        PatchEvent::Row(change)
    }
}

impl From<NameChange> for PatchEvent {
    fn from(change: NameChange) -> Self {
        PatchEvent::Name(change)
    }
}

impl From<ConfigChange> for PatchEvent {
    fn from(change: ConfigChange) -> Self {
        PatchEvent::Config(change)
    }
}
