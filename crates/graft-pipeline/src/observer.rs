//! Load progress callbacks

use graft_core::MergeResult;

use crate::report::{RecordFailure, SourceReport};

/// What happened to one record
#[derive(Debug, Clone, Copy)]
pub enum RecordEvent<'a> {
    Merged(&'a MergeResult),
    /// Dry run: the record normalized and would have been merged
    Normalized(&'a MergeResult),
    Failed(&'a RecordFailure),
}

/// Receives progress from the [`BatchLoader`](crate::BatchLoader)
///
/// All methods default to doing nothing.
pub trait LoadObserver: Send + Sync {
    /// `index` is 0-based within `total` sources
    fn source_started(&self, _name: &str, _index: usize, _total: usize) {}

    fn record_finished(&self, _source: &str, _line: usize, _event: RecordEvent<'_>) {}

    fn source_finished(&self, _report: &SourceReport) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}
