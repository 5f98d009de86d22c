//! Prometheus gauge registry.
//!
//! One `Metrics` value owns the registry and every gauge the exporter
//! publishes. It is built once at startup and shared behind an `Arc`: the
//! poll loop writes, the scrape endpoint reads. Label sets accumulate for
//! the lifetime of the process; series for deleted connections stay visible
//! until restart.

use anyhow::Result;
use prometheus::{Gauge, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

/// Exposition content type for the text format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub struct Metrics {
    registry: Registry,

    // Jobs
    pub num_running_jobs: IntGauge,
    pub num_pending_jobs: IntGauge,
    pub workflow_failures: IntGauge,
    pub num_successful_syncs: IntGauge,
    pub num_failed_syncs: IntGauge,
    pub total_bytes_synced: IntGauge,
    pub total_rows_synced: IntGauge,
    pub avg_successful_sync_duration: Gauge,
    pub last_successful_sync_timestamp: IntGaugeVec,
    pub successful_syncs_per_connection: IntGaugeVec,
    pub failed_syncs_per_connection: IntGaugeVec,

    // Connections
    pub active_connections: IntGauge,
    pub connection_status: IntGaugeVec,
    pub connection_info: IntGaugeVec,
    pub connection_streams_count: IntGaugeVec,
    pub connection_created_at: IntGaugeVec,

    // Destinations / sources
    pub num_destinations: IntGauge,
    pub num_sources: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let num_running_jobs = int_gauge(&registry, "monitoring_num_running_jobs", "Number of running jobs")?;
        let num_pending_jobs = int_gauge(&registry, "monitoring_num_pending_jobs", "Number of pending jobs")?;
        let workflow_failures = int_gauge(
            &registry,
            "monitoring_temporal_workflow_failure",
            "Number of failed jobs",
        )?;
        let num_successful_syncs = int_gauge(
            &registry,
            "monitoring_num_successful_syncs",
            "Number of successful sync jobs",
        )?;
        let num_failed_syncs = int_gauge(
            &registry,
            "monitoring_num_failed_syncs",
            "Number of failed sync jobs",
        )?;
        let total_bytes_synced = int_gauge(
            &registry,
            "monitoring_total_bytes_synced",
            "Total bytes synced across all successful sync jobs",
        )?;
        let total_rows_synced = int_gauge(
            &registry,
            "monitoring_total_rows_synced",
            "Total rows synced across all successful sync jobs",
        )?;
        let avg_successful_sync_duration = gauge(
            &registry,
            "monitoring_avg_successful_sync_duration",
            "Average duration of successful sync jobs in seconds",
        )?;
        let last_successful_sync_timestamp = int_gauge_vec(
            &registry,
            "monitoring_last_successful_sync_timestamp",
            "Timestamp of last successful sync per connection",
            &["connection_id", "name"],
        )?;
        let successful_syncs_per_connection = int_gauge_vec(
            &registry,
            "monitoring_successful_syncs_per_connection",
            "Number of successful syncs per connection",
            &["connection_id", "name"],
        )?;
        let failed_syncs_per_connection = int_gauge_vec(
            &registry,
            "monitoring_failed_syncs_per_connection",
            "Number of failed syncs per connection",
            &["connection_id", "name"],
        )?;

        let active_connections = int_gauge(
            &registry,
            "monitoring_active_connections",
            "Number of active connections",
        )?;
        let connection_status = int_gauge_vec(
            &registry,
            "monitoring_connection_status",
            "Status of connections (1 for active, 0 for inactive)",
            &["connection_id", "name", "source_id", "destination_id", "schedule_type"],
        )?;
        let connection_info = int_gauge_vec(
            &registry,
            "monitoring_connection_info",
            "Info about connections",
            &[
                "connection_id",
                "data_residency",
                "non_breaking_schema_updates_behavior",
                "namespace_definition",
                "prefix",
            ],
        )?;
        let connection_streams_count = int_gauge_vec(
            &registry,
            "monitoring_connection_streams_count",
            "Number of streams per connection",
            &["connection_id", "name"],
        )?;
        let connection_created_at = int_gauge_vec(
            &registry,
            "monitoring_connection_created_at",
            "Creation timestamp of the connection",
            &["connection_id", "name"],
        )?;

        let num_destinations =
            int_gauge(&registry, "monitoring_num_destinations", "Number of destinations")?;
        let num_sources = int_gauge(&registry, "monitoring_num_sources", "Number of sources")?;

        Ok(Self {
            registry,
            num_running_jobs,
            num_pending_jobs,
            workflow_failures,
            num_successful_syncs,
            num_failed_syncs,
            total_bytes_synced,
            total_rows_synced,
            avg_successful_sync_duration,
            last_successful_sync_timestamp,
            successful_syncs_per_connection,
            failed_syncs_per_connection,
            active_connections,
            connection_status,
            connection_info,
            connection_streams_count,
            connection_created_at,
            num_destinations,
            num_sources,
        })
    }

    /// Render every registered gauge in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .unwrap_or_default()
    }
}

fn int_gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge> {
    let gauge = IntGauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge> {
    let gauge = Gauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn int_gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<IntGaugeVec> {
    let gauge = IntGaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builds() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.num_running_jobs.get(), 0);
        assert_eq!(metrics.avg_successful_sync_duration.get(), 0.0);
    }

    #[test]
    fn test_render_includes_scalar_gauges() {
        let metrics = Metrics::new().unwrap();
        metrics.num_sources.set(3);

        let body = metrics.render();
        assert!(body.contains("monitoring_num_sources 3"));
        assert!(body.contains("monitoring_num_running_jobs 0"));
    }

    #[test]
    fn test_render_includes_labeled_series() {
        let metrics = Metrics::new().unwrap();
        metrics
            .connection_streams_count
            .with_label_values(&["c1", "Foo"])
            .set(4);

        let body = metrics.render();
        assert!(body
            .contains(r#"monitoring_connection_streams_count{connection_id="c1",name="Foo"} 4"#));
    }
}
