//! Prediction orchestrator.
//!
//! Priority always comes from the keyword rules. The department comes from
//! the model when its top probability reaches the threshold, otherwise from
//! the department keyword table, otherwise it defaults to Municipal. No
//! failure inside the model path ever reaches the caller.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use triage_core::{Department, DepartmentSource, Prediction, Result};
use triage_telemetry::PredictionMetrics;

use crate::cache::ModelCache;
use crate::classifier::Classifier;
use crate::config::{EngineConfig, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::model::ForestClassifier;
use crate::rules::RuleTables;

/// Round to three decimal places
pub fn round_confidence(value: f32) -> f32 {
    ((value as f64 * 1000.0).round() / 1000.0) as f32
}

/// Routes complaints to a department and priority.
///
/// Immutable once built; share it behind an `Arc` or a [`RouterHandle`].
pub struct ComplaintRouter {
    rules: RuleTables,
    classifier: Option<Arc<dyn Classifier>>,
    threshold: f32,
    metrics: Option<PredictionMetrics>,
}

impl ComplaintRouter {
    /// Router with the built-in rule tables and no model
    pub fn new() -> Result<Self> {
        Ok(Self::with_rules(RuleTables::standard()?))
    }

    pub fn with_rules(rules: RuleTables) -> Self {
        Self {
            rules,
            classifier: None,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            metrics: None,
        }
    }

    /// Consult `classifier` before the keyword fallback
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Default threshold used by [`predict`](Self::predict)
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_metrics(mut self, metrics: PredictionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build a router from cached artifacts, training from the dataset on a
    /// cache miss.
    ///
    /// A missing dataset or failed training leaves the router without a
    /// model; it then routes with keyword rules alone.
    pub fn load_or_train(config: &EngineConfig) -> Result<Self> {
        let cache = ModelCache::from_config(config);

        let classifier = match cache.load() {
            Ok(Some(classifier)) => Some(classifier),
            Ok(None) => train_quietly(config, &cache),
            Err(e) => {
                tracing::warn!(error = %e, "model cache unreadable, retraining");
                train_quietly(config, &cache)
            }
        };

        let router = Self::new()?.with_threshold(config.confidence_threshold);
        Ok(match classifier {
            Some(classifier) => router.with_classifier(Arc::new(classifier)),
            None => router,
        })
    }

    /// Copy of this router using a different classifier
    pub fn with_replaced_classifier(&self, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            rules: self.rules.clone(),
            classifier: Some(classifier),
            threshold: self.threshold,
            metrics: self.metrics.clone(),
        }
    }

    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn rules(&self) -> &RuleTables {
        &self.rules
    }

    pub fn metrics(&self) -> Option<&PredictionMetrics> {
        self.metrics.as_ref()
    }

    /// Route a complaint using the configured threshold
    pub fn predict(&self, text: &str) -> Prediction {
        self.predict_with_threshold(text, self.threshold)
    }

    /// Route a complaint, accepting the model's department when its
    /// probability is at least `threshold`
    pub fn predict_with_threshold(&self, text: &str, threshold: f32) -> Prediction {
        let start = Instant::now();
        let priority = self.rules.match_priority(text);

        let prediction = if let Some((department, score)) = self.model_department(text, threshold) {
            Prediction {
                department,
                priority,
                confidence: round_confidence(score),
                source: DepartmentSource::Model,
            }
        } else if let Some(hit) = self.rules.match_department_keyword(text) {
            tracing::trace!(keyword = hit.keyword, department = %hit.category, "keyword fallback");
            Prediction {
                department: hit.category,
                priority,
                confidence: Prediction::KEYWORD_CONFIDENCE,
                source: DepartmentSource::Keyword,
            }
        } else {
            Prediction::fallback(priority)
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_prediction(&prediction, start.elapsed().as_micros() as u64);
        }
        prediction
    }

    /// Model department and probability, if the model is confident enough
    fn model_department(&self, text: &str, threshold: f32) -> Option<(Department, f32)> {
        let classifier = self.classifier.as_ref()?;

        let result = match classifier.classify(text) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(classifier = classifier.name(), error = %e, "inference failed, using keyword fallback");
                if let Some(metrics) = &self.metrics {
                    metrics.record_inference_failure();
                }
                return None;
            }
        };

        // zero means the model saw nothing it knows
        if !(result.score > 0.0 && result.exceeds_threshold(threshold)) {
            return None;
        }

        let department = Department::from_label(&result.label).unwrap_or_else(|| {
            tracing::debug!(label = %result.label, "unknown model label, routing to Municipal");
            Department::Municipal
        });
        Some((department, result.score))
    }
}

impl std::fmt::Debug for ComplaintRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplaintRouter")
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("threshold", &self.threshold)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Train from the configured dataset and write the result to `cache`.
///
/// A failed store is logged and does not discard the trained model.
pub fn train_and_store(config: &EngineConfig, cache: &ModelCache) -> Result<ForestClassifier> {
    let classifier = ForestClassifier::train_from_dataset(config)?;
    if let Err(e) = cache.store(&classifier) {
        tracing::warn!(error = %e, "failed to store trained classifier");
    }
    Ok(classifier)
}

fn train_quietly(config: &EngineConfig, cache: &ModelCache) -> Option<ForestClassifier> {
    let dataset = config.dataset_path();
    if !dataset.exists() {
        tracing::warn!(path = %dataset.display(), "dataset not found, routing with keyword rules only");
        return None;
    }
    match train_and_store(config, cache) {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            tracing::warn!(error = %e, "training failed, routing with keyword rules only");
            None
        }
    }
}

/// Shared, swappable reference to the active router.
///
/// Readers take a cheap `Arc` clone; a retrained router is built off to the
/// side and swapped in whole, so in-flight predictions never see a partial
/// update.
#[derive(Clone)]
pub struct RouterHandle {
    inner: Arc<RwLock<Arc<ComplaintRouter>>>,
}

impl RouterHandle {
    pub fn new(router: ComplaintRouter) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(router))),
        }
    }

    /// The router currently serving predictions
    pub fn current(&self) -> Arc<ComplaintRouter> {
        self.inner.read().clone()
    }

    /// Install a new router, returning the previous one
    pub fn replace(&self, router: ComplaintRouter) -> Arc<ComplaintRouter> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(router))
    }

    pub fn predict(&self, text: &str) -> Prediction {
        self.current().predict(text)
    }

    /// Retrain from the dataset and swap the new model in.
    ///
    /// On failure the current router keeps serving.
    pub fn retrain(&self, config: &EngineConfig) -> Result<()> {
        let cache = ModelCache::from_config(config);
        let classifier = train_and_store(config, &cache)?;
        let router = self.current().with_replaced_classifier(Arc::new(classifier));
        self.replace(router);
        tracing::info!("swapped in retrained classifier");
        Ok(())
    }
}

impl std::fmt::Debug for RouterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RouterHandle").field(&*self.current()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Priority;

    #[test]
    fn test_round_confidence() {
        assert_eq!(round_confidence(0.123456), 0.123);
        assert_eq!(round_confidence(0.9996), 1.0);
        assert_eq!(round_confidence(0.0), 0.0);
    }

    #[test]
    fn test_rules_only_router() {
        let router = ComplaintRouter::new().unwrap();
        assert!(!router.has_model());

        let prediction = router.predict("tap leaking");
        assert_eq!(prediction.department, Department::Water);
        assert_eq!(prediction.confidence, 0.5);
        assert_eq!(prediction.source, DepartmentSource::Keyword);

        assert_eq!(router.predict("").as_tuple(), ("Municipal", "Low", 0.0));
    }

    #[test]
    fn test_load_or_train_without_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.paths.data_dir = dir.path().to_path_buf();

        let router = ComplaintRouter::load_or_train(&config).unwrap();
        assert!(!router.has_model());
        assert_eq!(router.predict("gas leak").priority, Priority::High);
    }
}
