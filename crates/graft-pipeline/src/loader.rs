//! Batch loader
//!
//! Streams records from each source in turn, feeding every non-blank line
//! through the normalizer and then the store. A bad record is recorded and
//! skipped; only a store that stays unreachable stops the run.
//!
//! ```text
//! InputSource ─ line ─> serde_json ─> RecordNormalizer ─> dimension guard ─> GraphStore::apply_unit
//!                          │                │                    │                    │
//!                        Parse          Normalize              Merge        Merge / retry / fatal
//! ```

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use graft_config::GraftConfig;
use graft_core::{CanonicalUnit, GraphStore, MergeResult, RecordNormalizer, StoreError};

use crate::error::LoadError;
use crate::observer::{LoadObserver, NoopObserver, RecordEvent};
use crate::report::{FailureKind, LoadReport, RecordFailure, SourceReport};
use crate::retry::RetryPolicy;
use crate::source::InputSource;

/// Why one line did not load
enum LineError {
    Record(RecordFailure),
    /// Connectivity lost for good; ends the run
    Fatal(StoreError),
}

/// Sequential JSON Lines loader
pub struct BatchLoader {
    /// `None` on a dry run
    store: Option<Arc<dyn GraphStore>>,
    normalizer: RecordNormalizer,
    retry: RetryPolicy,
    /// Embedding length enforced before merging
    expected_dimension: Option<usize>,
    progress_every: usize,
    observer: Arc<dyn LoadObserver>,
}

impl BatchLoader {
    pub fn new(store: Arc<dyn GraphStore>, config: &GraftConfig) -> Self {
        let mut loader = Self::dry_run(config);
        loader.store = Some(store);
        loader
    }

    /// Normalize and check every record without touching a store
    pub fn dry_run(config: &GraftConfig) -> Self {
        Self {
            store: None,
            normalizer: RecordNormalizer::new(&config.normalize),
            retry: RetryPolicy::from_config(&config.loader),
            expected_dimension: config
                .merge
                .enforce_embedding_dimension
                .then_some(config.schema.vector_dimension),
            progress_every: config.loader.progress_every,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.store.is_none()
    }

    /// Load every source in order
    ///
    /// An empty source list produces an empty report. Returns
    /// [`LoadError::Connection`] with the partial report when the store stays
    /// unreachable through the retry budget.
    pub async fn load(&self, sources: &[InputSource]) -> Result<LoadReport, LoadError> {
        let start = Instant::now();
        let mut report = LoadReport {
            dry_run: self.is_dry_run(),
            ..Default::default()
        };

        if sources.is_empty() {
            warn!("No input sources to load");
            return Ok(report);
        }

        info!(
            "Loading {} source(s) with {} label override(s){}",
            sources.len(),
            self.normalizer.overrides().len(),
            if self.is_dry_run() { " (dry run)" } else { "" }
        );

        let mut seen = 0usize;
        for (index, source) in sources.iter().enumerate() {
            let name = source.name();
            self.observer.source_started(&name, index, sources.len());

            let outcome = self.load_source(source, &name, &mut seen).await;
            let (source_report, fatal) = match outcome {
                Ok(source_report) => (source_report, None),
                Err((source_report, err)) => (source_report, Some(err)),
            };

            info!(
                "{}: {} processed, {} failed",
                name,
                source_report.succeeded,
                source_report.failed()
            );
            self.observer.source_finished(&source_report);
            report.sources.push(source_report);

            if let Some(source) = fatal {
                report.elapsed = start.elapsed();
                error!("Store unreachable, stopping load: {}", source);
                return Err(LoadError::Connection {
                    source,
                    report: Box::new(report),
                });
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Loaded {} record(s), {} failed, in {:?}",
            report.total_succeeded(),
            report.total_failed(),
            report.elapsed
        );
        Ok(report)
    }

    async fn load_source(
        &self,
        source: &InputSource,
        name: &str,
        seen: &mut usize,
    ) -> Result<SourceReport, (SourceReport, StoreError)> {
        let mut report = SourceReport::new(name);

        let mut lines = match source.open().await {
            Ok(lines) => lines,
            Err(err) => {
                warn!("Cannot read {}: {}", name, err);
                report.read_error = Some(err.to_string());
                return Ok(report);
            }
        };

        let mut line_number = 0usize;
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!("Stopped reading {} after line {}: {}", name, line_number, err);
                    report.read_error = Some(format!("after line {}: {}", line_number, err));
                    break;
                }
            };
            line_number += 1;

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match self.load_line(&line, line_number).await {
                Ok(result) => {
                    report.record_success(&result);
                    let event = if self.is_dry_run() {
                        RecordEvent::Normalized(&result)
                    } else {
                        RecordEvent::Merged(&result)
                    };
                    self.observer.record_finished(name, line_number, event);
                }
                Err(LineError::Record(failure)) => {
                    warn!("{}: {}", name, failure);
                    self.observer
                        .record_finished(name, line_number, RecordEvent::Failed(&failure));
                    report.failures.push(failure);
                }
                Err(LineError::Fatal(err)) => return Err((report, err)),
            }

            *seen += 1;
            if self.progress_every > 0 && *seen % self.progress_every == 0 {
                info!("Processed {} records", seen);
            }
        }

        Ok(report)
    }

    async fn load_line(&self, line: &[u8], line_number: usize) -> Result<MergeResult, LineError> {
        // Invalid UTF-8 surfaces here as a parse error for this line only
        let record: Value = serde_json::from_slice(line).map_err(|e| {
            LineError::Record(RecordFailure {
                line: line_number,
                chunk_id: None,
                kind: FailureKind::Parse,
                reason: e.to_string(),
            })
        })?;

        let unit = self.normalizer.normalize(&record).map_err(|e| {
            LineError::Record(RecordFailure {
                line: line_number,
                chunk_id: e.chunk_id().map(str::to_string),
                kind: FailureKind::Normalize,
                reason: e.to_string(),
            })
        })?;

        let merge_failure = |reason: String| {
            LineError::Record(RecordFailure {
                line: line_number,
                chunk_id: Some(unit.chunk.id.clone()),
                kind: FailureKind::Merge,
                reason,
            })
        };

        if let Some(dimension) = self.expected_dimension {
            let actual = unit.chunk.embedding.len();
            if unit.chunk.has_embedding() && actual != dimension {
                return Err(merge_failure(format!(
                    "embedding has {} dimensions, index expects {}",
                    actual, dimension
                )));
            }
        }

        let Some(store) = &self.store else {
            return Ok(MergeResult::for_unit(&unit));
        };

        match self.merge_with_retry(store.as_ref(), &unit).await {
            Ok(result) => Ok(result),
            Err(err) if err.is_connectivity() => Err(LineError::Fatal(err)),
            Err(err) => Err(merge_failure(err.to_string())),
        }
    }

    async fn merge_with_retry(
        &self,
        store: &dyn GraphStore,
        unit: &CanonicalUnit,
    ) -> Result<MergeResult, StoreError> {
        let mut retry_count = 0;
        loop {
            match store.apply_unit(unit).await {
                Ok(result) => {
                    debug!(chunk_id = %unit.chunk.id, "Merged after {} retries", retry_count);
                    return Ok(result);
                }
                Err(err) => {
                    if !self.retry.should_retry(&err, retry_count) {
                        return Err(err);
                    }
                    warn!(
                        "Merge of chunk {} failed (attempt {}): {}",
                        unit.chunk.id,
                        retry_count + 1,
                        err
                    );

                    retry_count += 1;
                    let retry_delay = self.retry.delay(retry_count);
                    debug!(
                        "Retrying chunk {} in {:?} (attempt {}/{})",
                        unit.chunk.id, retry_delay, retry_count, self.retry.max_retries
                    );
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
}
