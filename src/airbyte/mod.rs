// Airbyte public API integration

pub mod client;
pub mod model;
pub mod parse;

pub use client::ApiClient;
pub use model::{Connection, Destination, Job, JobStatus, Source};
