//! Resource shapes returned by the Airbyte list endpoints.
//!
//! Every field the exporter does not strictly need is optional: the API has
//! grown fields over time and a missing one must never fail a whole page.

use serde::Deserialize;

/// Job lifecycle states. Unrecognized values collapse to `Other` so new
/// upstream states cannot break deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Incomplete,
    Failed,
    Succeeded,
    Cancelled,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
    /// RFC 3339 timestamp of the last status change
    #[serde(default)]
    pub last_updated_at: Option<String>,
    #[serde(default)]
    pub bytes_synced: Option<i64>,
    #[serde(default)]
    pub rows_synced: Option<i64>,
    /// ISO-8601 duration, reported for finished jobs
    #[serde(default)]
    pub duration: Option<String>,
}

impl Job {
    pub fn is_sync(&self) -> bool {
        self.job_type.as_deref() == Some("sync")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub schedule_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configurations {
    #[serde(default)]
    pub streams: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub data_residency: Option<String>,
    #[serde(default)]
    pub non_breaking_schema_updates_behavior: Option<String>,
    #[serde(default)]
    pub namespace_definition: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    /// Creation time in epoch seconds
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub configurations: Configurations,
}

impl Connection {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn schedule_type(&self) -> Option<&str> {
        self.schedule.as_ref()?.schedule_type.as_deref()
    }

    pub fn streams_count(&self) -> usize {
        self.configurations.streams.len()
    }
}

/// Destination payloads are opaque to the exporter; only the count is used
#[derive(Debug, Clone, Deserialize)]
pub struct Destination(pub serde_json::Value);

/// Source payloads are opaque to the exporter; only the count is used
#[derive(Debug, Clone, Deserialize)]
pub struct Source(pub serde_json::Value);
