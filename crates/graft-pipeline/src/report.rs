//! Load bookkeeping

use std::fmt;
use std::time::Duration;

use graft_core::MergeResult;

/// Stage at which a record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The line is not valid JSON
    Parse,
    /// The record lacks required fields or is not an object
    Normalize,
    /// The store rejected the unit, or it failed the pre-merge checks
    Merge,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Normalize => "normalize",
            Self::Merge => "merge",
        })
    }
}

/// One rejected record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// 1-based line number within the source
    pub line: usize,
    pub chunk_id: Option<String>,
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(chunk_id) = &self.chunk_id {
            write!(f, " (chunk '{}')", chunk_id)?;
        }
        write!(f, ": {} error: {}", self.kind, self.reason)
    }
}

/// Outcome of one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    /// Records merged (or normalized, on a dry run)
    pub succeeded: usize,
    pub failures: Vec<RecordFailure>,
    /// Set when the source could not be opened or stopped mid-read
    pub read_error: Option<String>,
    pub entities: usize,
    pub mentions: usize,
    pub relations: usize,
    pub tables: usize,
}

impl SourceReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Non-blank lines seen
    pub fn records(&self) -> usize {
        self.succeeded + self.failed()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.read_error.is_none()
    }

    pub(crate) fn record_success(&mut self, result: &MergeResult) {
        self.succeeded += 1;
        self.entities += result.entities;
        self.mentions += result.mentions;
        self.relations += result.relations;
        if result.table {
            self.tables += 1;
        }
    }
}

/// Outcome of a whole load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl LoadReport {
    /// No sources were given
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn total_succeeded(&self) -> usize {
        self.sources.iter().map(|s| s.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.sources.iter().map(SourceReport::failed).sum()
    }

    pub fn total_records(&self) -> usize {
        self.sources.iter().map(SourceReport::records).sum()
    }

    pub fn unreadable_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.read_error.is_some()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &RecordFailure)> {
        self.sources
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (s.name.as_str(), f)))
    }
}
