//! Job-status reporting boundary. The pipeline pushes a status payload
//! after each record and at run completion; the transport (polling cache,
//! pub/sub) is the caller's concern.

use async_trait::async_trait;

use leadscout_common::JobStatus;

#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Delivery is best-effort; a sink must not fail the ingestion run.
    async fn report(&self, status: JobStatus);
}

/// Discards all reports.
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn report(&self, _status: JobStatus) {}
}

/// Logs each report through tracing.
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn report(&self, status: JobStatus) {
        tracing::info!(
            state = ?status.state,
            progress = status.progress_percent,
            new = status.stats.new,
            merged = status.stats.merged,
            skipped = status.stats.skipped,
            error = status.error.as_deref(),
            "Ingestion progress"
        );
    }
}
