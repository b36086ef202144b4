use std::io::{BufRead, Write};

use serde::Serialize;

use crate::change::{
    ConfigChange, LinkDeclare, NameChange, OrderChange, PatchEvent, PoolChange, RowChange,
};
use crate::error::PatchError;
use crate::sink::Patcher;

pub const EVENT_SCHEMA_VERSION: &str = "1";

#[derive(Serialize)]
struct JsonLinesHeader<'a> {
    kind: &'static str,
    version: &'a str,
}

/// Writes every event as one JSON object per line, after a header line.
pub struct JsonLinesPatcher<W: Write> {
    w: W,
    wrote_header: bool,
}

impl<W: Write> JsonLinesPatcher<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            wrote_header: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    fn begin(&mut self) -> Result<(), PatchError> {
        if self.wrote_header {
            return Ok(());
        }
        let header = JsonLinesHeader {
            kind: "Header",
            version: EVENT_SCHEMA_VERSION,
        };
        serde_json::to_writer(&mut self.w, &header).map_err(PatchError::sink)?;
        self.w.write_all(b"\n").map_err(PatchError::sink)?;
        self.wrote_header = true;
        Ok(())
    }

    fn emit(&mut self, event: &PatchEvent) -> Result<(), PatchError> {
        self.begin()?;
        serde_json::to_writer(&mut self.w, event).map_err(PatchError::sink)?;
        self.w.write_all(b"\n").map_err(PatchError::sink)?;
        Ok(())
    }
}

impl<W: Write> Patcher for JsonLinesPatcher<W> {
    fn change_config(&mut self, change: &ConfigChange) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Config(*change))
    }

    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Column(change.clone()))
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Row(change.clone()))
    }

    fn change_name(&mut self, change: &NameChange) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Name(change.clone()))
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Pool(change.clone()))
    }

    fn declare_link(&mut self, decl: &LinkDeclare) -> Result<(), PatchError> {
        self.emit(&PatchEvent::Link(decl.clone()))
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.emit(&PatchEvent::SetSheet {
            name: name.to_string(),
        })
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        self.emit(&PatchEvent::MergeStart)
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        self.emit(&PatchEvent::MergeDone)
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        self.emit(&PatchEvent::MergeAllDone)?;
        self.w.flush().map_err(PatchError::sink)
    }
}

/// Read back a stream written by [`JsonLinesPatcher`]. Header and blank lines
/// are skipped.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<PatchEvent>, PatchError> {
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(PatchError::sink)?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line).map_err(PatchError::sink)?;
        if value.get("kind").and_then(|k| k.as_str()) == Some("Header") {
            continue;
        }
        events.push(serde_json::from_value(value).map_err(PatchError::sink)?);
    }
    Ok(events)
}
