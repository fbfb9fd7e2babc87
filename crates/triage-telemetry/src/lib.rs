//! Civic Triage Telemetry
//!
//! Counters for routing decisions. Every recorded prediction updates an
//! in-process snapshot and is also forwarded to the `metrics` facade, so
//! an embedding application can install whatever recorder it runs.

pub mod metrics;

pub use crate::metrics::{MetricsSnapshot, PredictionMetrics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsSnapshot, PredictionMetrics};
}
