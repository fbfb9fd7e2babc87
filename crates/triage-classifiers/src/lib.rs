//! Civic Triage Classifiers
//!
//! Hybrid routing engine for citizen complaints.
//!
//! Two signals decide each prediction:
//! - Keyword rule tables, which alone decide priority and act as the
//!   department fallback
//! - A TF-IDF + random forest classifier trained offline on a synthetic
//!   corpus, preferred for the department when it is confident
//!
//! [`ComplaintRouter`] arbitrates between them and never fails the caller.
//! Trained artifacts are cached on disk by [`ModelCache`].

pub mod cache;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod evaluation;
pub mod features;
pub mod forest;
pub mod label_encoder;
pub mod model;
pub mod router;
pub mod rules;
pub mod stopwords;

pub use cache::ModelCache;
pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use config::{
    CorpusConfig, EngineConfig, ForestConfig, PathsConfig, VectorizerConfig,
    DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use corpus::CorpusBuilder;
pub use dataset::{load_dataset, write_dataset, DatasetSummary};
pub use evaluation::{evaluate, EvaluationReport, Outcome, Scenario, SCENARIOS};
pub use features::{SparseVector, TfIdfVectorizer};
pub use forest::{DecisionTree, RandomForest};
pub use label_encoder::LabelEncoder;
pub use model::{DepartmentModel, ForestClassifier};
pub use router::{train_and_store, ComplaintRouter, RouterHandle};
pub use rules::{KeywordTable, RuleTables};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::EngineConfig;
    pub use crate::model::ForestClassifier;
    pub use crate::router::{ComplaintRouter, RouterHandle};
    pub use crate::rules::RuleTables;
    pub use triage_core::{Department, DepartmentSource, Prediction, Priority};
}
