//! Subcommand implementations

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use triage_classifiers::{
    evaluate, load_dataset, ComplaintRouter, CorpusBuilder, DatasetSummary, EngineConfig,
    ForestClassifier, ModelCache, Outcome, SCENARIOS,
};
use triage_telemetry::PredictionMetrics;

/// Resolve the engine config from an optional file plus CLI overrides
pub fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.paths.data_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

pub fn generate_dataset(
    mut config: EngineConfig,
    samples_per_category: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(n) = samples_per_category {
        config.corpus.samples_per_category = n;
    }
    if let Some(seed) = seed {
        config.corpus.seed = seed;
    }
    config.validate()?;

    let path = output.unwrap_or_else(|| config.dataset_path());
    let samples = CorpusBuilder::new(&config.corpus)
        .write_to(&path)
        .with_context(|| format!("failed to write dataset to {}", path.display()))?;

    println!("Dataset written to {}", path.display());
    print_summary(&DatasetSummary::from_samples(&samples));
    Ok(())
}

pub fn inspect_dataset(config: &EngineConfig, path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| config.dataset_path());
    let samples = load_dataset(&path)?;
    let summary = DatasetSummary::from_samples(&samples);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Dataset: {}", path.display());
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &DatasetSummary) {
    println!("  Total rows: {}", summary.total);
    println!();
    println!("  Department distribution:");
    for (label, count) in &summary.by_label {
        println!("    {:<20} {}", label, count);
    }
    println!();
    println!("  Priority distribution:");
    for (priority, count) in &summary.by_priority {
        println!("    {:<20} {}", priority, count);
    }
    println!();
    println!(
        "  Department balance score: {:.2}% (100% = perfectly balanced)",
        summary.balance_score()
    );
}

pub fn train(config: &EngineConfig, force: bool) -> Result<()> {
    let cache = ModelCache::from_config(config);

    if !force {
        match cache.load() {
            Ok(Some(classifier)) => {
                println!(
                    "Cached model is valid ({} classes, {} features); use --force to retrain",
                    classifier.classes().len(),
                    classifier.vectorizer().dimension()
                );
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "model cache unreadable, retraining"),
        }
    }

    // the existing cache stays in place until a new model is ready;
    // store() renames over it
    let classifier = ForestClassifier::train_from_dataset(config).with_context(|| {
        format!(
            "training failed; generate a dataset at {} first",
            config.dataset_path().display()
        )
    })?;
    cache
        .store(&classifier)
        .context("model trained but could not be written to the cache")?;

    println!("Model trained and cached");
    println!("  Classes:  {}", classifier.classes().join(", "));
    println!("  Features: {}", classifier.vectorizer().dimension());
    println!("  Trees:    {}", classifier.model().forest.trees().len());
    println!("  Samples:  {}", classifier.vectorizer().n_documents());
    Ok(())
}

pub fn predict(config: &EngineConfig, text: &str, threshold: Option<f32>) -> Result<()> {
    let threshold = threshold.unwrap_or(config.confidence_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold must be within [0, 1], got {}", threshold);
    }

    let router = ComplaintRouter::load_or_train(config)?;
    let prediction = router.predict_with_threshold(text, threshold);
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

pub fn run_evaluation(config: &EngineConfig, json: bool) -> Result<()> {
    let metrics = PredictionMetrics::new();
    let router = ComplaintRouter::load_or_train(config)?.with_metrics(metrics.clone());
    let report = evaluate(&router, &SCENARIOS);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !router.has_model() {
        println!("No trained model available; routing with keyword rules only");
    }

    for (i, result) in report.results.iter().enumerate() {
        let status = match result.outcome {
            Outcome::Pass => "PASS",
            Outcome::Partial => "PARTIAL",
            Outcome::Fail => "FAIL",
        };
        println!();
        println!("Test #{}: {}", i + 1, status);
        println!("  Input:     {}", result.scenario.text);
        println!(
            "  Predicted: {} / {} (confidence: {}, {:?})",
            result.prediction.department,
            result.prediction.priority,
            result.prediction.confidence,
            result.prediction.source
        );
        println!(
            "  Expected:  {} / {}",
            result.scenario.department, result.scenario.priority
        );
    }

    let snapshot = metrics.snapshot();
    println!();
    println!(
        "Results: {}/{} passed, {} partial, {} failed ({:.0}%)",
        report.passed(),
        report.results.len(),
        report.partial(),
        report.failed(),
        report.pass_rate() * 100.0
    );
    println!(
        "Departments from model: {:.0}%, average latency {}us",
        snapshot.model_rate() * 100.0,
        snapshot.avg_latency_us()
    );
    Ok(())
}
