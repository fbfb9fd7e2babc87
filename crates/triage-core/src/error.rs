//! Error types for the triage engine

/// Result type alias using the triage Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for triage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Training dataset missing, unreadable or malformed
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Vectorizer fitting or transform errors
    #[error("feature extraction error: {0}")]
    FeatureExtraction(String),

    /// Classifier training or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Model cache read/write errors
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new feature extraction error
    pub fn feature_extraction(msg: impl Into<String>) -> Self {
        Self::FeatureExtraction(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::dataset("missing file").to_string(),
            "dataset error: missing file"
        );
        assert_eq!(
            Error::cache("bad envelope").to_string(),
            "cache error: bad envelope"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(Error::from(io), Error::Io(_)));
    }
}
