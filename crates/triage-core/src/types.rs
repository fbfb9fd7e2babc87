//! Core types for complaint triage

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical municipal routing target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Electricity,
    Water,
    Police,
    #[serde(rename = "PWD")]
    Pwd,
    Health,
    Fire,
    Municipal,
}

impl Department {
    /// All departments, in keyword-fallback order
    pub const ALL: [Department; 7] = [
        Self::Electricity,
        Self::Water,
        Self::Police,
        Self::Pwd,
        Self::Health,
        Self::Fire,
        Self::Municipal,
    ];

    /// Runtime name handed to the embedding application
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::Water => "Water",
            Self::Police => "Police",
            Self::Pwd => "PWD",
            Self::Health => "Health",
            Self::Fire => "Fire",
            Self::Municipal => "Municipal",
        }
    }

    /// Name used for this department in the training corpus
    pub fn training_label(&self) -> &'static str {
        match self {
            Self::Police => "Police/Traffic",
            Self::Health => "Health Department",
            Self::Municipal => "Municipality",
            other => other.as_str(),
        }
    }

    /// Resolve a corpus or runtime label to its canonical department.
    ///
    /// Training labels are renamed here: "Police/Traffic" becomes Police,
    /// "Health Department" becomes Health and "Municipality" becomes
    /// Municipal.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Electricity" => Some(Self::Electricity),
            "Water" => Some(Self::Water),
            "Police" | "Police/Traffic" => Some(Self::Police),
            "PWD" => Some(Self::Pwd),
            "Health" | "Health Department" => Some(Self::Health),
            "Fire" => Some(Self::Fire),
            "Municipal" | "Municipality" => Some(Self::Municipal),
            _ => None,
        }
    }
}

impl Default for Department {
    fn default() -> Self {
        Self::Municipal
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown department: {}", s))
    }
}

/// Urgency tier, independent of department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// All priorities, highest severity first
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Low
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Which signal resolved the department of a prediction.
///
/// The confidence of a [`Prediction`] means something different for each
/// source: a model probability, the keyword sentinel 0.5, or the default
/// sentinel 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepartmentSource {
    /// Statistical classifier, probability at or above threshold
    Model,
    /// Keyword rule table fallback
    Keyword,
    /// Nothing matched
    Default,
}

/// Result of routing a single complaint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub department: Department,
    pub priority: Priority,
    /// Rounded to three decimals
    pub confidence: f32,
    pub source: DepartmentSource,
}

impl Prediction {
    /// Confidence reported for a keyword-table department match
    pub const KEYWORD_CONFIDENCE: f32 = 0.5;

    /// Prediction used when no signal resolves the department
    pub fn fallback(priority: Priority) -> Self {
        Self {
            department: Department::Municipal,
            priority,
            confidence: 0.0,
            source: DepartmentSource::Default,
        }
    }

    /// The `(department, priority, confidence)` triple
    pub fn as_tuple(&self) -> (&'static str, &'static str, f32) {
        (self.department.as_str(), self.priority.as_str(), self.confidence)
    }
}

/// One labeled row of the training corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub text: String,
    /// Department name as written in the corpus
    pub label: String,
    pub priority: Priority,
}

impl TrainingSample {
    pub fn new(text: impl Into<String>, label: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_labels_collapse_to_runtime_names() {
        assert_eq!(Department::from_label("Police/Traffic"), Some(Department::Police));
        assert_eq!(Department::from_label("Municipality"), Some(Department::Municipal));
        assert_eq!(Department::from_label("Health Department"), Some(Department::Health));
        assert_eq!(Department::from_label("Sanitation"), None);
    }

    #[test]
    fn test_training_label_round_trip() {
        for dept in Department::ALL {
            assert_eq!(Department::from_label(dept.training_label()), Some(dept));
        }
    }

    #[test]
    fn test_prediction_tuple() {
        let prediction = Prediction::fallback(Priority::Low);
        assert_eq!(prediction.as_tuple(), ("Municipal", "Low", 0.0));
        assert_eq!(prediction.source, DepartmentSource::Default);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("Urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_pwd_serializes_upper_case() {
        let json = serde_json::to_string(&Department::Pwd).unwrap();
        assert_eq!(json, "\"PWD\"");
    }
}
