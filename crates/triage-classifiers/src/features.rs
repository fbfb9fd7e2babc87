//! TF-IDF vectorizer for text feature extraction.
//!
//! Text is lowercased and split into runs of word characters of length
//! two or more. Stopwords are dropped before n-grams are built, so a
//! bigram joins the two surviving tokens on either side of a stopword.
//! The vocabulary is frozen by [`TfIdfVectorizer::fit`]; terms unseen at
//! fit time are ignored by [`TfIdfVectorizer::transform`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use triage_core::{Error, Result};

use crate::config::VectorizerConfig;
use crate::stopwords::is_stop_word;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"))
}

/// Sparse row of a document-term matrix, indices strictly increasing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs; zero values are dropped
    pub fn from_pairs(dim: usize, mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_unstable_by_key(|(idx, _)| *idx);
        pairs.dedup_by_key(|(idx, _)| *idx);
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    /// Vector of the given dimension with no non-zero entries
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// Value at `feature`, zero when absent
    pub fn get(&self, feature: u32) -> f32 {
        match self.indices.binary_search(&feature) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate non-zero `(index, value)` entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// TF-IDF vectorizer with a frozen, capped vocabulary
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Term -> column index
    vocabulary: HashMap<String, u32>,
    /// Smoothed inverse document frequency per column
    idf: Vec<f32>,
    /// Number of documents seen during fit
    n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("config", &self.config)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Learn vocabulary and IDF weights from the training corpus
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| Error::feature_extraction(e.to_string()))?;
        if documents.is_empty() {
            return Err(Error::feature_extraction("cannot fit on an empty corpus"));
        }

        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.analyze(doc);
            let mut seen = HashSet::with_capacity(terms.len());
            for term in terms {
                *corpus_frequency.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = self.config.max_df as f64 * n_documents as f64;
        let mut kept: Vec<(String, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= self.config.min_df && (df as f64) <= max_doc_count)
            .map(|(term, _)| (term.clone(), corpus_frequency[term]))
            .collect();

        if kept.is_empty() {
            return Err(Error::feature_extraction(
                "no terms remain after document-frequency pruning",
            ));
        }

        if kept.len() > self.config.max_features {
            kept.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(self.config.max_features);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (idx, term) in terms.into_iter().enumerate() {
            let df = document_frequency[&term] as f64;
            idf.push((((n_documents as f64 + 1.0) / (df + 1.0)).ln() + 1.0) as f32);
            vocabulary.insert(term, idx as u32);
        }

        tracing::debug!(
            vocabulary_size = vocabulary.len(),
            n_documents,
            "fitted tf-idf vocabulary"
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;
        Ok(())
    }

    /// Transform a document into an L2-normalized TF-IDF vector.
    ///
    /// Empty or all-stopword input yields the zero vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(Error::feature_extraction("vectorizer has not been fitted"));
        }

        let mut counts: HashMap<u32, u32> = HashMap::new();
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(idx, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f32).ln()
                } else {
                    count as f32
                };
                (idx, tf * self.idf[idx as usize])
            })
            .collect();
        // fixed summation order keeps the norm bit-identical across runs
        pairs.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = pairs.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut pairs {
                *v /= norm;
            }
        }

        Ok(SparseVector::from_pairs(self.dimension(), pairs))
    }

    /// Transform many documents
    pub fn transform_batch(&self, documents: &[String]) -> Result<Vec<SparseVector>> {
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Fit on the corpus and return its vectors
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Lowercase, tokenize, drop stopwords, and expand to n-grams
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = token_pattern()
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !(self.config.stop_words && is_stop_word(token)))
            .collect();

        let mut terms = Vec::new();
        for n in self.config.ngram_min..=self.config.ngram_max {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Structural check for vectorizers that did not come from
    /// [`fit`](Self::fit), such as decoded cache artifacts
    pub fn validate(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| Error::feature_extraction(e.to_string()))?;
        if !self.is_fitted() {
            return Err(Error::feature_extraction("vectorizer has an empty vocabulary"));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::feature_extraction(format!(
                "{} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        if let Some((term, idx)) = self
            .vocabulary
            .iter()
            .find(|&(_, &idx)| idx as usize >= self.idf.len())
        {
            return Err(Error::feature_extraction(format!(
                "term '{}' maps to column {} of {}",
                term,
                idx,
                self.idf.len()
            )));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::feature_extraction("non-finite idf weight"));
        }
        Ok(())
    }

    /// Number of columns in produced vectors
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Column index of a term, if it is in the vocabulary
    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}
