//! Configuration for training, caching and prediction

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use triage_core::{Error, Result};

/// Default ML acceptance threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Configuration for the whole triage engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dataset and artifact locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Feature extraction parameters
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Random forest parameters
    #[serde(default)]
    pub forest: ForestConfig,

    /// Synthetic corpus parameters
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Minimum model probability for accepting an ML department
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f32,
}

impl EngineConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        self.vectorizer.validate()?;
        self.forest.validate()?;
        if self.corpus.samples_per_category == 0 {
            return Err(Error::config("corpus.samples_per_category must be positive"));
        }
        Ok(())
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.dataset_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.vectorizer_file)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.classifier_file)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            vectorizer: VectorizerConfig::default(),
            forest: ForestConfig::default(),
            corpus: CorpusConfig::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Filesystem layout; file names are relative to `data_dir`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,

    #[serde(default = "default_vectorizer_file")]
    pub vectorizer_file: String,

    #[serde(default = "default_classifier_file")]
    pub classifier_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            dataset_file: default_dataset_file(),
            vectorizer_file: default_vectorizer_file(),
            classifier_file: default_classifier_file(),
        }
    }
}

/// TF-IDF vectorizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Vocabulary cap, keeping the most frequent terms
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum share of documents a term may appear in
    pub max_df: f32,
    /// Use `1 + ln(tf)` instead of raw counts
    pub sublinear_tf: bool,
    /// Drop English stopwords before building n-grams
    pub stop_words: bool,
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::config("vectorizer.max_features must be positive"));
        }
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(Error::config(format!(
                "invalid n-gram range ({}, {})",
                self.ngram_min, self.ngram_max
            )));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::config(format!(
                "vectorizer.max_df must be within (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 2,
            max_df: 0.95,
            sublinear_tf: true,
            stop_words: true,
        }
    }
}

/// Random forest parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Seed for bootstrap sampling and feature selection
    pub seed: u64,
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(Error::config("forest.n_trees must be positive"));
        }
        if self.max_depth == 0 {
            return Err(Error::config("forest.max_depth must be positive"));
        }
        if self.min_samples_split < 2 {
            return Err(Error::config("forest.min_samples_split must be at least 2"));
        }
        Ok(())
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 20,
            min_samples_split: 5,
            seed: 42,
        }
    }
}

/// Synthetic corpus parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Rows generated per (department, priority) cell
    pub samples_per_category: usize,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            samples_per_category: 200,
            seed: 42,
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_dataset_file() -> String {
    "dataset.csv".to_string()
}

fn default_vectorizer_file() -> String {
    "vectorizer_cache.bin".to_string()
}

fn default_classifier_file() -> String {
    "model_cache.bin".to_string()
}
