//! Job-level gauges: status counts plus sync throughput statistics.

use super::connections::ConnectionIndex;
use crate::airbyte::model::{Job, JobStatus};
use crate::airbyte::parse;
use crate::metrics::Metrics;
use std::collections::HashMap;
use tracing::warn;

/// Statistics accumulated over one job list.
///
/// The accumulation is a pure single pass, separate from the gauge writes,
/// so the arithmetic can be verified directly in tests.
#[derive(Debug, Default)]
pub struct JobSummary {
    pub running: i64,
    pub pending: i64,
    pub failed: i64,
    pub successful_syncs: i64,
    pub failed_syncs: i64,
    pub total_bytes_synced: i64,
    pub total_rows_synced: i64,
    /// Durations (seconds) of succeeded sync jobs that reported one
    pub sync_durations: Vec<f64>,
    /// Latest succeeded-sync timestamp (epoch seconds) per connection
    pub last_successful_sync: HashMap<String, i64>,
    pub succeeded_per_connection: HashMap<String, i64>,
    pub failed_per_connection: HashMap<String, i64>,
}

impl JobSummary {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut summary = Self::default();
        for job in jobs {
            summary.observe(job);
        }
        summary
    }

    fn observe(&mut self, job: &Job) {
        match job.status {
            JobStatus::Running => self.running += 1,
            JobStatus::Pending => self.pending += 1,
            JobStatus::Failed => self.failed += 1,
            _ => {}
        }

        if !job.is_sync() {
            return;
        }

        match job.status {
            JobStatus::Succeeded => {
                self.successful_syncs += 1;
                self.total_bytes_synced += job.bytes_synced.unwrap_or(0);
                self.total_rows_synced += job.rows_synced.unwrap_or(0);

                if let Some(connection_id) = job.connection_id.as_deref() {
                    *self
                        .succeeded_per_connection
                        .entry(connection_id.to_string())
                        .or_default() += 1;

                    if let Some(updated_at) = job.last_updated_at.as_deref() {
                        // A malformed timestamp loses this one derived value,
                        // never the rest of the pass.
                        match parse::rfc3339_epoch(updated_at) {
                            Ok(timestamp) => {
                                let latest = self
                                    .last_successful_sync
                                    .entry(connection_id.to_string())
                                    .or_insert(timestamp);
                                *latest = (*latest).max(timestamp);
                            }
                            Err(error) => {
                                warn!("skipping lastUpdatedAt for connection {connection_id}: {error:#}");
                            }
                        }
                    }
                }

                if let Some(duration) = job.duration.as_deref() {
                    match parse::duration_seconds(duration) {
                        Ok(seconds) => self.sync_durations.push(seconds),
                        Err(error) => warn!("skipping job duration: {error:#}"),
                    }
                }
            }
            JobStatus::Failed => {
                self.failed_syncs += 1;
                if let Some(connection_id) = job.connection_id.as_deref() {
                    *self
                        .failed_per_connection
                        .entry(connection_id.to_string())
                        .or_default() += 1;
                }
            }
            _ => {}
        }
    }

    /// Arithmetic mean of collected sync durations, 0 when none were collected
    pub fn avg_sync_duration(&self) -> f64 {
        if self.sync_durations.is_empty() {
            return 0.0;
        }
        self.sync_durations.iter().sum::<f64>() / self.sync_durations.len() as f64
    }
}

/// Accumulate over the job list and write every job gauge, resolving
/// connection names through the index built earlier in the same cycle
pub fn collect_job_metrics(metrics: &Metrics, jobs: &[Job], index: &ConnectionIndex) {
    let summary = JobSummary::from_jobs(jobs);

    metrics.num_running_jobs.set(summary.running);
    metrics.num_pending_jobs.set(summary.pending);
    metrics.workflow_failures.set(summary.failed);
    metrics.num_successful_syncs.set(summary.successful_syncs);
    metrics.num_failed_syncs.set(summary.failed_syncs);
    metrics.total_bytes_synced.set(summary.total_bytes_synced);
    metrics.total_rows_synced.set(summary.total_rows_synced);
    metrics
        .avg_successful_sync_duration
        .set(summary.avg_sync_duration());

    for (connection_id, timestamp) in &summary.last_successful_sync {
        metrics
            .last_successful_sync_timestamp
            .with_label_values(&[connection_id, index.resolve(connection_id)])
            .set(*timestamp);
    }
    for (connection_id, count) in &summary.succeeded_per_connection {
        metrics
            .successful_syncs_per_connection
            .with_label_values(&[connection_id, index.resolve(connection_id)])
            .set(*count);
    }
    for (connection_id, count) in &summary.failed_per_connection {
        metrics
            .failed_syncs_per_connection
            .with_label_values(&[connection_id, index.resolve(connection_id)])
            .set(*count);
    }
}
