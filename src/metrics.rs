use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    batches_completed: AtomicU64,
    documents_processed: AtomicU64,
    summaries_degraded: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed batch and the number of documents it contained.
    pub fn record_batch(&self, document_count: u64) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
        self.documents_processed
            .fetch_add(document_count, Ordering::Relaxed);
    }

    /// Record a summary that resolved to a degraded placeholder.
    pub fn record_degraded_summary(&self) {
        self.summaries_degraded.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_completed: self.batches_completed.load(Ordering::Relaxed),
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            summaries_degraded: self.summaries_degraded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of batches completed since startup.
    pub batches_completed: u64,
    /// Total documents that passed through the pipeline.
    pub documents_processed: u64,
    /// Summaries that resolved to a degraded placeholder string.
    pub summaries_degraded: u64,
}
