//! HTTP API Module
//!
//! Serves `GET /<domain>` lookups as versioned JSON envelopes.
//! Health and metrics endpoints live on a separate, optional listener.

mod conditional;
mod metrics;
mod routes;

pub use metrics::Metrics;
pub use routes::{run_api_server, run_metrics_server};
