//! Connection-level gauges and the per-cycle name index.

use super::UNKNOWN;
use crate::airbyte::model::Connection;
use crate::metrics::Metrics;
use std::collections::HashMap;

/// Maps connection id to display name for the current poll cycle.
///
/// Rebuilt from scratch each cycle; ids that vanished since the last cycle
/// resolve to "unknown".
#[derive(Debug, Default)]
pub struct ConnectionIndex {
    names: HashMap<String, String>,
}

impl ConnectionIndex {
    pub fn resolve(&self, connection_id: &str) -> &str {
        self.names
            .get(connection_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn label(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

/// Update every connection gauge and return the freshly built name index
pub fn collect_connection_metrics(
    metrics: &Metrics,
    connections: &[Connection],
) -> ConnectionIndex {
    let mut names = HashMap::new();
    let mut active_connections = 0;

    for connection in connections {
        let connection_id = label(&connection.connection_id);
        let name = label(&connection.name);

        names.insert(connection_id.to_string(), name.to_string());

        let status_value = if connection.is_active() {
            active_connections += 1;
            1
        } else {
            0
        };

        metrics
            .connection_status
            .with_label_values(&[
                connection_id,
                name,
                label(&connection.source_id),
                label(&connection.destination_id),
                connection.schedule_type().unwrap_or(UNKNOWN),
            ])
            .set(status_value);

        // Existence marker: the value is always 1, the labels carry the info
        metrics
            .connection_info
            .with_label_values(&[
                connection_id,
                label(&connection.data_residency),
                label(&connection.non_breaking_schema_updates_behavior),
                label(&connection.namespace_definition),
                label(&connection.prefix),
            ])
            .set(1);

        metrics
            .connection_streams_count
            .with_label_values(&[connection_id, name])
            .set(connection.streams_count() as i64);

        metrics
            .connection_created_at
            .with_label_values(&[connection_id, name])
            .set(connection.created_at.unwrap_or(0));
    }

    metrics.active_connections.set(active_connections);

    ConnectionIndex { names }
}
