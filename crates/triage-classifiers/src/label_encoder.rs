//! Bijection between department label strings and class indices

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triage_core::{Error, Result};

/// Maps labels to contiguous class indices in sorted label order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the sorted set of distinct labels
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let classes: BTreeSet<&str> = labels.iter().map(|l| l.as_ref()).collect();
        if classes.is_empty() {
            return Err(Error::classifier("cannot fit label encoder on no labels"));
        }
        Ok(Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        })
    }

    /// Class index of a label
    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| Error::classifier(format!("unknown label: {}", label)))
    }

    /// Encode a slice of labels
    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.transform(l.as_ref())).collect()
    }

    /// Label of a class index
    pub fn inverse(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::classifier(format!("class index {} out of range", index)))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
