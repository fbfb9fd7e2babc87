//! Prediction metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use triage_core::{DepartmentSource, Prediction, Priority};

/// Metrics collector for routing decisions
#[derive(Clone)]
pub struct PredictionMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    total_predictions: AtomicU64,
    model_resolved: AtomicU64,
    keyword_resolved: AtomicU64,
    defaulted: AtomicU64,
    high_priority: AtomicU64,
    medium_priority: AtomicU64,
    low_priority: AtomicU64,
    inference_failures: AtomicU64,
    total_latency_us: AtomicU64,
}

impl PredictionMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        metrics::describe_counter!(
            "triage_predictions_total",
            "Total number of complaints routed, by department source and priority"
        );
        metrics::describe_counter!(
            "triage_inference_failures_total",
            "Model inference failures absorbed by keyword fallback"
        );
        metrics::describe_histogram!(
            "triage_prediction_latency_us",
            metrics::Unit::Microseconds,
            "Prediction latency in microseconds"
        );

        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record one routing decision
    pub fn record_prediction(&self, prediction: &Prediction, latency_us: u64) {
        let inner = &self.inner;
        inner.total_predictions.fetch_add(1, Ordering::Relaxed);
        inner.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        let source = match prediction.source {
            DepartmentSource::Model => {
                inner.model_resolved.fetch_add(1, Ordering::Relaxed);
                "model"
            }
            DepartmentSource::Keyword => {
                inner.keyword_resolved.fetch_add(1, Ordering::Relaxed);
                "keyword"
            }
            DepartmentSource::Default => {
                inner.defaulted.fetch_add(1, Ordering::Relaxed);
                "default"
            }
        };

        match prediction.priority {
            Priority::High => inner.high_priority.fetch_add(1, Ordering::Relaxed),
            Priority::Medium => inner.medium_priority.fetch_add(1, Ordering::Relaxed),
            Priority::Low => inner.low_priority.fetch_add(1, Ordering::Relaxed),
        };

        metrics::counter!(
            "triage_predictions_total",
            "source" => source,
            "priority" => prediction.priority.as_str()
        )
        .increment(1);
        metrics::histogram!("triage_prediction_latency_us").record(latency_us as f64);
    }

    /// Record a model failure that was absorbed by the fallback path
    pub fn record_inference_failure(&self) {
        self.inner.inference_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("triage_inference_failures_total").increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            total_predictions: inner.total_predictions.load(Ordering::Relaxed),
            model_resolved: inner.model_resolved.load(Ordering::Relaxed),
            keyword_resolved: inner.keyword_resolved.load(Ordering::Relaxed),
            defaulted: inner.defaulted.load(Ordering::Relaxed),
            high_priority: inner.high_priority.load(Ordering::Relaxed),
            medium_priority: inner.medium_priority.load(Ordering::Relaxed),
            low_priority: inner.low_priority.load(Ordering::Relaxed),
            inference_failures: inner.inference_failures.load(Ordering::Relaxed),
            total_latency_us: inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredictionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PredictionMetrics").field(&self.snapshot()).finish()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub total_predictions: u64,
    pub model_resolved: u64,
    pub keyword_resolved: u64,
    pub defaulted: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    pub inference_failures: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per prediction
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_predictions == 0 {
            0
        } else {
            self.total_latency_us / self.total_predictions
        }
    }

    /// Share of predictions whose department came from the model
    pub fn model_rate(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            self.model_resolved as f64 / self.total_predictions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Department;

    #[test]
    fn test_metrics_collection() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(
            &Prediction {
                department: Department::Fire,
                priority: Priority::High,
                confidence: 0.82,
                source: DepartmentSource::Model,
            },
            400,
        );
        metrics.record_prediction(&Prediction::fallback(Priority::Low), 200);
        metrics.record_inference_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_predictions, 2);
        assert_eq!(snapshot.model_resolved, 1);
        assert_eq!(snapshot.defaulted, 1);
        assert_eq!(snapshot.high_priority, 1);
        assert_eq!(snapshot.low_priority, 1);
        assert_eq!(snapshot.inference_failures, 1);
        assert_eq!(snapshot.avg_latency_us(), 300);
        assert_eq!(snapshot.model_rate(), 0.5);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = PredictionMetrics::new();
        let clone = metrics.clone();
        clone.record_prediction(&Prediction::fallback(Priority::Medium), 10);
        assert_eq!(metrics.snapshot().medium_priority, 1);
    }
}
