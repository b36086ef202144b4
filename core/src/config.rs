//! Configuration for patchers and renderers.
//!
//! `PatchConfig` centralizes the behavioral knobs and rendering weights so
//! that no component hardcodes them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a [`SheetPatcher`](crate::SheetPatcher) applies edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchMode {
    /// Edits physically mutate the sheet.
    Destructive,
    /// Edits are recorded as annotations next to the data.
    Descriptive,
}

/// Per-label weights used when choosing how to render buffered row events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentCosts {
    pub kept: u32,
    pub changed: u32,
    pub moved: u32,
    pub inserted: u32,
    pub deleted: u32,
    /// Cost of rendering an adjacent delete/insert pair as one changed row.
    pub merged_pair: u32,
}

impl Default for AlignmentCosts {
    fn default() -> Self {
        Self {
            kept: 0,
            changed: 1,
            moved: 2,
            inserted: 2,
            deleted: 2,
            merged_pair: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub mode: PatchMode,
    /// Unchanged rows kept on either side of a change in descriptive output.
    pub context_rows: u32,
    /// Row events buffered before the renderer interprets them.
    pub alignment_window: u32,
    pub null_token: String,
    pub costs: AlignmentCosts,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            mode: PatchMode::Destructive,
            context_rows: 2,
            alignment_window: 16,
            null_token: "NULL".to_string(),
            costs: AlignmentCosts::default(),
        }
    }
}

impl PatchConfig {
    pub fn destructive() -> Self {
        Self::default()
    }

    pub fn descriptive() -> Self {
        Self {
            mode: PatchMode::Descriptive,
            ..Default::default()
        }
    }

    pub fn builder() -> PatchConfigBuilder {
        PatchConfigBuilder {
            inner: PatchConfig::default(),
        }
    }

    pub fn is_descriptive(&self) -> bool {
        self.mode == PatchMode::Descriptive
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alignment_window == 0 {
            return Err(ConfigError::NonPositiveLimit {
                field: "alignment_window",
                value: 0,
            });
        }
        if self.null_token.is_empty() {
            return Err(ConfigError::EmptyNullToken);
        }
        let costs = &self.costs;
        if costs.merged_pair > costs.inserted + costs.deleted {
            return Err(ConfigError::MergeNotCheaper {
                merged_pair: costs.merged_pair,
                separate: costs.inserted + costs.deleted,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveLimit { field: &'static str, value: u64 },
    #[error("null_token must not be empty")]
    EmptyNullToken,
    #[error("merged_pair cost {merged_pair} exceeds rendering the pair separately ({separate})")]
    MergeNotCheaper { merged_pair: u32, separate: u32 },
}

#[derive(Debug, Clone)]
pub struct PatchConfigBuilder {
    inner: PatchConfig,
}

impl Default for PatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchConfigBuilder {
    pub fn new() -> Self {
        PatchConfig::builder()
    }

    pub fn mode(mut self, value: PatchMode) -> Self {
        self.inner.mode = value;
        self
    }

    pub fn context_rows(mut self, value: u32) -> Self {
        self.inner.context_rows = value;
        self
    }

    pub fn alignment_window(mut self, value: u32) -> Self {
        self.inner.alignment_window = value;
        self
    }

    pub fn null_token(mut self, value: impl Into<String>) -> Self {
        self.inner.null_token = value.into();
        self
    }

    pub fn costs(mut self, value: AlignmentCosts) -> Self {
        self.inner.costs = value;
        self
    }

    pub fn build(self) -> Result<PatchConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
