//! On-disk cache for trained classifier artifacts.
//!
//! The vectorizer and the forest (with its label encoder) live in two
//! separate bincode files. Both must be present, decode under the current
//! format version and agree on the feature dimension for a load to count
//! as a hit.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use triage_core::{Error, Result};

use crate::config::EngineConfig;
use crate::features::TfIdfVectorizer;
use crate::model::{DepartmentModel, ForestClassifier};

/// Bumped whenever the layout of a cached artifact changes
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on a single decoded artifact
const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    format_version: u32,
    payload: T,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_ARTIFACT_BYTES)
}

/// Paths of the two cached artifacts
#[derive(Debug, Clone)]
pub struct ModelCache {
    vectorizer_path: PathBuf,
    classifier_path: PathBuf,
}

impl ModelCache {
    pub fn new(vectorizer_path: impl Into<PathBuf>, classifier_path: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer_path: vectorizer_path.into(),
            classifier_path: classifier_path.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.vectorizer_path(), config.classifier_path())
    }

    /// Load a cached classifier.
    ///
    /// `Ok(None)` when either artifact is missing; an error when both
    /// exist but cannot be decoded or do not belong together.
    pub fn load(&self) -> Result<Option<ForestClassifier>> {
        if !self.vectorizer_path.exists() || !self.classifier_path.exists() {
            tracing::debug!(
                vectorizer = %self.vectorizer_path.display(),
                classifier = %self.classifier_path.display(),
                "model cache miss"
            );
            return Ok(None);
        }

        let vectorizer: TfIdfVectorizer = read_artifact(&self.vectorizer_path)?;
        let model: DepartmentModel = read_artifact(&self.classifier_path)?;
        let classifier = ForestClassifier::from_parts(vectorizer, model)
            .map_err(|e| Error::cache(format!("cached artifacts do not match: {}", e)))?;

        tracing::info!(
            classifier = %self.classifier_path.display(),
            features = classifier.vectorizer().dimension(),
            "loaded classifier from cache"
        );
        Ok(Some(classifier))
    }

    /// Persist both artifacts
    pub fn store(&self, classifier: &ForestClassifier) -> Result<()> {
        write_artifact(&self.vectorizer_path, classifier.vectorizer())?;
        write_artifact(&self.classifier_path, classifier.model())?;
        tracing::info!(
            classifier = %self.classifier_path.display(),
            vectorizer = %self.vectorizer_path.display(),
            "stored classifier in cache"
        );
        Ok(())
    }

    /// Remove both artifacts; missing files are not an error
    pub fn clear(&self) -> Result<()> {
        for path in [&self.vectorizer_path, &self.classifier_path] {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed cached artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Whether both artifacts are present on disk
    pub fn exists(&self) -> bool {
        self.vectorizer_path.exists() && self.classifier_path.exists()
    }

    pub fn vectorizer_path(&self) -> &Path {
        &self.vectorizer_path
    }

    pub fn classifier_path(&self) -> &Path {
        &self.classifier_path
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::cache(format!("cannot open {}: {}", path.display(), e)))?;
    let envelope: Envelope<T> = codec()
        .deserialize_from(BufReader::new(file))
        .map_err(|e| Error::cache(format!("cannot decode {}: {}", path.display(), e)))?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(Error::cache(format!(
            "{} has format version {}, expected {}",
            path.display(),
            envelope.format_version,
            FORMAT_VERSION
        )));
    }
    Ok(envelope.payload)
}

fn write_artifact<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let envelope = Envelope {
        format_version: FORMAT_VERSION,
        payload,
    };
    let mut writer = BufWriter::new(File::create(&tmp)?);
    codec()
        .serialize_into(&mut writer, &envelope)
        .map_err(|e| Error::cache(format!("cannot encode {}: {}", path.display(), e)))?;
    writer.flush()?;
    drop(writer);

    std::fs::rename(&tmp, path)?;
    Ok(())
}
