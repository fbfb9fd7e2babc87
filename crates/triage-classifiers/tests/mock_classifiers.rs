//! Mock classifiers for testing
//!
//! Configurable implementations of the Classifier trait for exercising
//! the router's threshold, fallback and error handling paths.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use triage_classifiers::{ClassificationMetadata, ClassificationResult, Classifier};
use triage_core::Result;

/// A classifier returning a fixed label and score
pub struct MockClassifier {
    name: String,
    score: f32,
    label: String,
    /// Per-text overrides of (label, score)
    overrides: HashMap<String, (String, f32)>,
    call_count: AtomicU32,
}

impl MockClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0.5,
            label: "Municipality".to_string(),
            overrides: HashMap::new(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the score this classifier will return
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the label this classifier will return
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Return `label` and `score` for exactly `text`
    pub fn with_override(mut self, text: &str, label: &str, score: f32) -> Self {
        self.overrides
            .insert(text.to_string(), (label.to_string(), score));
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let (label, score) = self
            .overrides
            .get(text)
            .cloned()
            .unwrap_or_else(|| (self.label.clone(), self.score));

        Ok(ClassificationResult {
            label,
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: None,
            },
            latency_us: 10,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier {
    name: String,
    error_message: String,
    call_count: AtomicU32,
}

impl FailingClassifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error_message: "Simulated classifier failure".to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for FailingClassifier {
    fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(triage_core::Error::classifier(&self.error_message))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_classifier_basic() {
        let classifier = MockClassifier::new("test")
            .with_score(0.8)
            .with_label("Water");

        let result = classifier.classify("hello").unwrap();
        assert_eq!(result.score, 0.8);
        assert_eq!(result.label, "Water");
        assert_eq!(classifier.call_count(), 1);
    }

    #[test]
    fn test_mock_classifier_override() {
        let classifier = MockClassifier::new("test").with_override("fire", "Fire", 0.9);
        assert_eq!(classifier.classify("fire").unwrap().label, "Fire");
        assert_eq!(classifier.classify("other").unwrap().label, "Municipality");
    }

    #[test]
    fn test_failing_classifier() {
        let classifier = FailingClassifier::new("fail-test").with_error("Custom error");
        let err = classifier.classify("test").unwrap_err();
        assert!(err.to_string().contains("Custom error"));
        assert_eq!(classifier.call_count(), 1);
    }
}
