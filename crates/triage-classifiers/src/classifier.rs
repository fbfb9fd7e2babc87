//! Classifier trait and common types

use triage_core::Result;

/// Trait for department classifiers consulted by the router.
///
/// Implementations must be pure with respect to `text`: the same input
/// always yields the same result.
pub trait Classifier: Send + Sync {
    /// Classify the given text
    fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Top class label, as known to the classifier
    pub label: String,

    /// Probability of the top class (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Result carrying no opinion: the input had nothing the model knows
    pub fn abstain() -> Self {
        Self::new("", 0.0)
    }

    /// Check if score reaches threshold
    pub fn exceeds_threshold(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores (for multi-class classifiers)
    pub all_scores: Option<Vec<(String, f32)>>,
}
