//! Progress bar for `graft load`

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

use graft_pipeline::{LoadObserver, RecordEvent, SourceReport};

/// Bar over input files; the message tracks records in the current file
pub struct LoadProgress {
    bar: ProgressBar,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl LoadProgress {
    pub fn new(files: usize) -> Self {
        let bar = ProgressBar::new(files as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self::with_bar(bar)
    }

    /// Progress that draws nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl LoadObserver for LoadProgress {
    fn source_started(&self, name: &str, _index: usize, _total: usize) {
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.bar.set_message(short_name(name));
    }

    fn record_finished(&self, source: &str, _line: usize, event: RecordEvent<'_>) {
        match event {
            RecordEvent::Merged(_) | RecordEvent::Normalized(_) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            RecordEvent::Failed(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.bar.set_message(format!(
            "{}: {} ok, {} failed",
            short_name(source),
            self.succeeded.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        ));
        self.bar.tick();
    }

    fn source_finished(&self, _report: &SourceReport) {
        self.bar.inc(1);
    }
}

/// File name without its directory
fn short_name(name: &str) -> String {
    std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_directories() {
        assert_eq!(short_name("graph_rag_files/report.jsonl"), "report.jsonl");
        assert_eq!(short_name("inline"), "inline");
    }

    #[test]
    fn counts_reset_per_source() {
        let progress = LoadProgress::hidden();
        let result = graft_core::MergeResult::default();
        progress.source_started("a.jsonl", 0, 2);
        progress.record_finished("a.jsonl", 1, RecordEvent::Merged(&result));
        assert_eq!(progress.succeeded.load(Ordering::Relaxed), 1);

        progress.source_started("b.jsonl", 1, 2);
        assert_eq!(progress.succeeded.load(Ordering::Relaxed), 0);
    }
}
