//! CSV training dataset: `text,label,priority` with a header row

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use triage_core::{Error, Priority, Result, TrainingSample};

/// Read all rows of a dataset file
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<TrainingSample>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::dataset(format!("cannot open {}: {}", path.display(), e)))?;
    let samples = read_dataset(BufReader::new(file))
        .map_err(|e| Error::dataset(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), rows = samples.len(), "loaded dataset");
    Ok(samples)
}

/// Parse dataset rows from any reader
pub fn read_dataset<R: Read>(reader: R) -> Result<Vec<TrainingSample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (line, row) in csv_reader.deserialize::<TrainingSample>().enumerate() {
        // header is line 1
        let sample = row.map_err(|e| Error::dataset(format!("row {}: {}", line + 2, e)))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(Error::dataset("dataset has no rows"));
    }
    Ok(samples)
}

/// Write rows to `path`, replacing any existing file
pub fn write_dataset(path: impl AsRef<Path>, samples: &[TrainingSample]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_rows(BufWriter::new(file), samples)?;
    tracing::info!(path = %path.display(), rows = samples.len(), "wrote dataset");
    Ok(())
}

fn write_rows<W: Write>(writer: W, samples: &[TrainingSample]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for sample in samples {
        csv_writer
            .serialize(sample)
            .map_err(|e| Error::dataset(format!("failed to write row: {}", e)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Row counts of a dataset by department label and priority
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub by_label: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
}

impl DatasetSummary {
    pub fn from_samples(samples: &[TrainingSample]) -> Self {
        let mut summary = Self {
            total: samples.len(),
            ..Default::default()
        };
        for sample in samples {
            *summary.by_label.entry(sample.label.clone()).or_insert(0) += 1;
            *summary.by_priority.entry(sample.priority).or_insert(0) += 1;
        }
        summary
    }

    /// Smallest label count as a percentage of the largest; 100 means
    /// perfectly balanced
    pub fn balance_score(&self) -> f64 {
        let min = self.by_label.values().min().copied().unwrap_or(0);
        let max = self.by_label.values().max().copied().unwrap_or(0);
        if max == 0 {
            return 0.0;
        }
        min as f64 / max as f64 * 100.0
    }
}
