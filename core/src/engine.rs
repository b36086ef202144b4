//! Drives a recorded change stream through a [`Patcher`].

use serde::Serialize;

use crate::change::PatchEvent;
use crate::error::StreamError;
use crate::sink::Patcher;

/// A recoverable failure: the event was skipped and the stream went on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchIssue {
    pub index: usize,
    pub event: &'static str,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of [`apply_events`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub events: usize,
    pub applied: usize,
    pub issues: Vec<PatchIssue>,
    /// True when every event applied without an issue.
    pub complete: bool,
}

/// Deliver `events` to `patcher` in order.
///
/// Per-event errors are collected into the report's `issues` and the stream
/// continues. The first terminal error (see
/// [`PatchError::is_terminal`](crate::PatchError::is_terminal)) stops the
/// stream and is returned with the index of the offending event.
pub fn apply_events<'e, P>(
    patcher: &mut P,
    events: impl IntoIterator<Item = &'e PatchEvent>,
) -> Result<PatchReport, StreamError>
where
    P: Patcher + ?Sized,
{
    let mut report = PatchReport::default();
    for (index, event) in events.into_iter().enumerate() {
        report.events += 1;
        match event.dispatch(patcher) {
            Ok(()) => report.applied += 1,
            Err(err) if err.is_terminal() => {
                log::warn!("event #{index} ({}) aborted the stream: {err}", event.kind());
                return Err(StreamError {
                    index,
                    event: event.kind(),
                    source: err,
                });
            }
            Err(err) => {
                log::warn!("event #{index} ({}) skipped: {err}", event.kind());
                report.issues.push(PatchIssue {
                    index,
                    event: event.kind(),
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
    }
    report.complete = report.issues.is_empty();
    Ok(report)
}
