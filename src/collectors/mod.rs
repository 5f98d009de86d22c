//! Translate fetched resource lists into gauge updates.
//!
//! Collectors are plain functions over already-fetched data, so every derived
//! statistic is testable without a live API. Within one poll cycle the
//! connection collector must run before the job collector: it returns the
//! [`ConnectionIndex`] the job collector uses to attach display names.

pub mod connections;
pub mod jobs;


pub use connections::{collect_connection_metrics, ConnectionIndex};
pub use jobs::{collect_job_metrics, JobSummary};

use crate::airbyte::model::{Destination, Source};
use crate::metrics::Metrics;

/// Label value used whenever an optional field is absent
pub const UNKNOWN: &str = "unknown";

pub fn collect_destination_metrics(metrics: &Metrics, destinations: &[Destination]) {
    metrics.num_destinations.set(destinations.len() as i64);
}

pub fn collect_source_metrics(metrics: &Metrics, sources: &[Source]) {
    metrics.num_sources.set(sources.len() as i64);
}
