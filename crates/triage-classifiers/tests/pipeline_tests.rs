//! End-to-end tests: generate a corpus, train, cache, reload and route

use std::path::Path;
use triage_classifiers::{
    evaluate, ComplaintRouter, CorpusBuilder, EngineConfig, ForestClassifier, ModelCache,
    RouterHandle, SCENARIOS,
};
use triage_core::{Department, DepartmentSource, Priority};

const PROBES: &[&str] = &[
    "building on fire, people trapped inside",
    "water pipe leaking on main street",
    "stolen two wheeler reported in the area",
    "garbage piling up for days causing smell",
    "street light not working for 2 weeks",
    "pothole on road needs filling",
    "",
    "completely unrelated words",
];

fn small_config(data_dir: &Path) -> EngineConfig {
    let yaml = format!(
        r#"
paths:
  data_dir: {}
forest:
  n_trees: 20
corpus:
  samples_per_category: 40
"#,
        data_dir.display()
    );
    EngineConfig::from_yaml(&yaml).unwrap()
}

fn write_corpus(config: &EngineConfig) {
    CorpusBuilder::new(&config.corpus)
        .write_to(config.dataset_path())
        .unwrap();
}

#[test]
fn test_train_store_and_reload_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    write_corpus(&config);

    let trained = ComplaintRouter::load_or_train(&config).unwrap();
    assert!(trained.has_model());
    assert!(ModelCache::from_config(&config).exists());

    let reloaded = ComplaintRouter::load_or_train(&config).unwrap();
    assert!(reloaded.has_model());

    for probe in PROBES {
        assert_eq!(trained.predict(probe), reloaded.predict(probe), "probe {:?}", probe);
    }
}

#[test]
fn test_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    write_corpus(&config);

    let a = ForestClassifier::train_from_dataset(&config).unwrap();
    let b = ForestClassifier::train_from_dataset(&config).unwrap();
    assert_eq!(a.model(), b.model());
    assert_eq!(a.vectorizer().dimension(), b.vectorizer().dimension());
}

#[test]
fn test_trained_router_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    write_corpus(&config);
    let router = ComplaintRouter::load_or_train(&config).unwrap();

    let fire = router.predict("building on fire, people trapped inside");
    assert_eq!(fire.department, Department::Fire);
    assert_eq!(fire.priority, Priority::High);

    let water = router.predict("Broken water tap wasting precious water resource");
    assert_eq!(water.department, Department::Water);
    assert_eq!(water.priority, Priority::Medium);

    // "leaking" is not a priority keyword
    let leak = router.predict("water pipe leaking on main street");
    assert_eq!(leak.priority, Priority::Low);

    let police = router.predict("stolen two wheeler reported in the area");
    assert_eq!(police.department, Department::Police);

    let light = router.predict("street light not working for 2 weeks");
    assert_eq!(light.priority, Priority::Low);

    assert_eq!(router.predict("").as_tuple(), ("Municipal", "Low", 0.0));

    let report = evaluate(&router, &SCENARIOS);
    assert_eq!(report.results.len(), SCENARIOS.len());
    assert_eq!(report.results[7].prediction.department, Department::Fire);
}

#[test]
fn test_model_confidence_is_a_probability() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    write_corpus(&config);
    let router = ComplaintRouter::load_or_train(&config).unwrap();

    for probe in PROBES {
        let prediction = router.predict(probe);
        match prediction.source {
            DepartmentSource::Model => {
                assert!(prediction.confidence >= 0.3 && prediction.confidence <= 1.0)
            }
            DepartmentSource::Keyword => assert_eq!(prediction.confidence, 0.5),
            DepartmentSource::Default => assert_eq!(prediction.confidence, 0.0),
        }
    }
}

#[test]
fn test_corrupt_cache_triggers_retraining() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    write_corpus(&config);

    ComplaintRouter::load_or_train(&config).unwrap();
    std::fs::write(config.vectorizer_path(), b"garbage bytes").unwrap();

    let router = ComplaintRouter::load_or_train(&config).unwrap();
    assert!(router.has_model());
    // the retrained artifacts were written back
    assert!(ModelCache::from_config(&config).load().unwrap().is_some());
}

#[test]
fn test_missing_dataset_degrades_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let router = ComplaintRouter::load_or_train(&config).unwrap();
    assert!(!router.has_model());
    assert!(!ModelCache::from_config(&config).exists());

    let prediction = router.predict("tap leaking");
    assert_eq!(prediction.department, Department::Water);
    assert_eq!(prediction.confidence, 0.5);
}

#[test]
fn test_handle_retrain_swaps_in_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let handle = RouterHandle::new(ComplaintRouter::load_or_train(&config).unwrap());
    assert!(!handle.current().has_model());
    assert!(handle.retrain(&config).is_err());

    write_corpus(&config);
    handle.retrain(&config).unwrap();
    assert!(handle.current().has_model());
}
