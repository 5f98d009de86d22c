// Environment-driven configuration
pub mod config;

// OAuth client-credentials token cache
pub mod auth;

// Airbyte API client and resource models
pub mod airbyte;

// Prometheus gauge registry
pub mod metrics;

// Resource lists to gauge updates
pub mod collectors;

// Metrics exposition endpoint
pub mod api;

// The fetch/aggregate/sleep loop
pub mod poller;
