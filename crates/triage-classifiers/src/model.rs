//! TF-IDF + random forest department classifier

use serde::{Deserialize, Serialize};
use std::time::Instant;
use triage_core::{Error, Result, TrainingSample};

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::config::EngineConfig;
use crate::dataset::load_dataset;
use crate::features::TfIdfVectorizer;
use crate::forest::RandomForest;
use crate::label_encoder::LabelEncoder;

/// Model name reported in classification metadata
pub const MODEL_NAME: &str = "tfidf-random-forest";

/// Trained forest together with the label encoder that names its classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentModel {
    pub encoder: LabelEncoder,
    pub forest: RandomForest,
}

/// Statistical department classifier.
///
/// Returns the corpus label of the most probable class (for example
/// "Police/Traffic"); mapping to canonical departments happens in the
/// router. Text with no in-vocabulary terms yields an abstaining result.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    vectorizer: TfIdfVectorizer,
    model: DepartmentModel,
}

impl ForestClassifier {
    /// Assemble a classifier from separately persisted parts
    pub fn from_parts(vectorizer: TfIdfVectorizer, model: DepartmentModel) -> Result<Self> {
        vectorizer.validate()?;
        model.forest.validate()?;
        if vectorizer.dimension() != model.forest.n_features() {
            return Err(Error::classifier(format!(
                "vectorizer produces {} features but forest expects {}",
                vectorizer.dimension(),
                model.forest.n_features()
            )));
        }
        if model.encoder.len() != model.forest.n_classes() {
            return Err(Error::classifier(format!(
                "label encoder has {} classes but forest has {}",
                model.encoder.len(),
                model.forest.n_classes()
            )));
        }
        Ok(Self { vectorizer, model })
    }

    /// Fit vectorizer, label encoder and forest on labeled samples
    pub fn train(samples: &[TrainingSample], config: &EngineConfig) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::dataset("no training samples"));
        }
        let start = Instant::now();

        let texts: Vec<String> = samples.iter().map(|s| s.text.clone()).collect();
        let labels: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();

        let encoder = LabelEncoder::fit(&labels)?;
        let y = encoder.transform_all(&labels)?;

        let mut vectorizer = TfIdfVectorizer::new(config.vectorizer.clone());
        let x = vectorizer.fit_transform(&texts)?;

        let forest = RandomForest::fit(&x, &y, encoder.len(), &config.forest)?;

        tracing::info!(
            samples = samples.len(),
            classes = encoder.len(),
            features = vectorizer.dimension(),
            trees = forest.trees().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "trained department classifier"
        );

        Self::from_parts(vectorizer, DepartmentModel { encoder, forest })
    }

    /// Train from the CSV dataset named by the configuration
    pub fn train_from_dataset(config: &EngineConfig) -> Result<Self> {
        let samples = load_dataset(config.dataset_path())?;
        Self::train(&samples, config)
    }

    /// Probability for every class label, in encoder order
    pub fn predict_proba(&self, text: &str) -> Result<Vec<(String, f32)>> {
        let vector = self.vectorizer.transform(text)?;
        let proba = self.model.forest.predict_proba(&vector)?;
        Ok(self
            .model
            .encoder
            .classes()
            .iter()
            .cloned()
            .zip(proba)
            .collect())
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &DepartmentModel {
        &self.model
    }

    pub fn classes(&self) -> &[String] {
        self.model.encoder.classes()
    }
}

impl Classifier for ForestClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let vector = self.vectorizer.transform(text)?;
        if vector.is_zero() {
            let mut result = ClassificationResult::abstain();
            result.latency_us = start.elapsed().as_micros() as u64;
            return Ok(result);
        }

        let proba = self.model.forest.predict_proba(&vector)?;

        // first maximum wins ties, matching class order
        let mut top = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[top] {
                top = idx;
            }
        }

        let label = self.model.encoder.inverse(top)?.to_string();
        let all_scores: Vec<(String, f32)> = self
            .model
            .encoder
            .classes()
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();

        Ok(ClassificationResult {
            label,
            score: proba[top],
            metadata: ClassificationMetadata {
                model: Some(MODEL_NAME.to_string()),
                all_scores: Some(all_scores),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use triage_core::Priority;

    fn samples() -> Vec<TrainingSample> {
        let mut out = Vec::new();
        for i in 0..6 {
            out.push(TrainingSample::new(
                format!("water pipe leaking near house {}", i),
                "Water",
                Priority::Medium,
            ));
            out.push(TrainingSample::new(
                format!("street light pole broken in lane {}", i),
                "Electricity",
                Priority::Low,
            ));
            out.push(TrainingSample::new(
                format!("phone stolen theft reported at market {}", i),
                "Police/Traffic",
                Priority::Medium,
            ));
        }
        out
    }

    fn config() -> EngineConfig {
        EngineConfig {
            forest: ForestConfig {
                n_trees: 15,
                min_samples_split: 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_trained_classifier_predicts_corpus_label() {
        let classifier = ForestClassifier::train(&samples(), &config()).unwrap();
        let result = classifier.classify("Water pipe leaking near the house").unwrap();
        assert_eq!(result.label, "Water");
        assert!(result.score > 0.5);

        let result = classifier
            .classify("phone stolen, theft reported at market")
            .unwrap();
        assert_eq!(result.label, "Police/Traffic");
    }

    #[test]
    fn test_out_of_vocabulary_text_abstains() {
        let classifier = ForestClassifier::train(&samples(), &config()).unwrap();
        let result = classifier.classify("zzz qqq").unwrap();
        assert_eq!(result.score, 0.0);
        assert!(result.label.is_empty());
    }

    #[test]
    fn test_all_scores_reported() {
        let classifier = ForestClassifier::train(&samples(), &config()).unwrap();
        let result = classifier.classify("street light broken").unwrap();
        let scores = result.metadata.all_scores.unwrap();
        assert_eq!(scores.len(), 3);
        let sum: f32 = scores.iter().map(|(_, s)| s).sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_parts_checks_dimensions() {
        let classifier = ForestClassifier::train(&samples(), &config()).unwrap();
        let mut other = TfIdfVectorizer::new(Default::default());
        other
            .fit(&[
                "alpha beta".to_string(),
                "alpha beta".to_string(),
                "gamma".to_string(),
            ])
            .unwrap();
        assert!(ForestClassifier::from_parts(other, classifier.model().clone()).is_err());
    }

    #[test]
    fn test_empty_training_set_rejected() {
        assert!(ForestClassifier::train(&[], &config()).is_err());
    }
}
