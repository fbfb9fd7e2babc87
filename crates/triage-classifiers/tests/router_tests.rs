//! Router decision protocol tests using mock classifiers

mod mock_classifiers;

use mock_classifiers::{FailingClassifier, MockClassifier};
use std::sync::Arc;
use triage_classifiers::{ComplaintRouter, RouterHandle};
use triage_core::{Department, DepartmentSource, Priority};
use triage_telemetry::PredictionMetrics;

fn router_with(classifier: impl triage_classifiers::Classifier + 'static) -> ComplaintRouter {
    ComplaintRouter::new()
        .unwrap()
        .with_classifier(Arc::new(classifier))
}

#[test]
fn test_empty_input_defaults() {
    let router = router_with(MockClassifier::new("zero").with_score(0.0));
    assert_eq!(router.predict("").as_tuple(), ("Municipal", "Low", 0.0));

    let rules_only = ComplaintRouter::new().unwrap();
    assert_eq!(rules_only.predict("").as_tuple(), ("Municipal", "Low", 0.0));
    assert_eq!(rules_only.predict("   ").as_tuple(), ("Municipal", "Low", 0.0));
}

#[test]
fn test_high_keyword_forces_high_priority() {
    let router = router_with(MockClassifier::new("pwd").with_label("PWD").with_score(0.9));
    let prediction = router.predict("small pothole but gas leak nearby");
    assert_eq!(prediction.priority, Priority::High);
    assert_eq!(prediction.department, Department::Pwd);
}

#[test]
fn test_threshold_is_inclusive() {
    let router = router_with(MockClassifier::new("edge").with_label("Fire").with_score(0.3));
    let prediction = router.predict("tap leaking");
    assert_eq!(prediction.department, Department::Fire);
    assert_eq!(prediction.confidence, 0.3);
    assert_eq!(prediction.source, DepartmentSource::Model);

    let below = router_with(
        MockClassifier::new("edge").with_label("Fire").with_score(0.299),
    );
    let prediction = below.predict("tap leaking");
    assert_eq!(prediction.department, Department::Water);
    assert_eq!(prediction.source, DepartmentSource::Keyword);
}

#[test]
fn test_zero_confidence_falls_back_to_keywords() {
    let router = router_with(MockClassifier::new("zero").with_label("Fire").with_score(0.0));
    let prediction = router.predict("tap leaking");
    assert_eq!(prediction.department, Department::Water);
    assert_eq!(prediction.confidence, 0.5);
    assert_eq!(prediction.source, DepartmentSource::Keyword);
}

#[test]
fn test_zero_score_never_accepted() {
    let router = router_with(MockClassifier::new("zero").with_label("Fire").with_score(0.0));
    let prediction = router.predict_with_threshold("hello there", 0.0);
    assert_eq!(prediction.source, DepartmentSource::Default);
    assert_eq!(prediction.department, Department::Municipal);
}

#[test]
fn test_training_labels_are_renamed() {
    let police = router_with(
        MockClassifier::new("police").with_label("Police/Traffic").with_score(0.8),
    );
    let prediction = police.predict("someone took my bike");
    assert_eq!(prediction.department, Department::Police);
    assert_eq!(prediction.as_tuple().0, "Police");

    let municipal = router_with(
        MockClassifier::new("muni").with_label("Municipality").with_score(0.8),
    );
    assert_eq!(municipal.predict("bins").as_tuple().0, "Municipal");

    let health = router_with(
        MockClassifier::new("health").with_label("Health Department").with_score(0.8),
    );
    assert_eq!(health.predict("dogs").department, Department::Health);
}

#[test]
fn test_unknown_model_label_routes_to_municipal() {
    let router = router_with(MockClassifier::new("odd").with_label("Sanitation").with_score(0.9));
    let prediction = router.predict("tap leaking");
    assert_eq!(prediction.department, Department::Municipal);
    assert_eq!(prediction.source, DepartmentSource::Model);
}

#[test]
fn test_confidence_is_rounded() {
    let router = router_with(MockClassifier::new("r").with_label("Water").with_score(0.456789));
    assert_eq!(router.predict("tap").confidence, 0.457);
}

#[test]
fn test_inference_failure_is_absorbed() {
    let metrics = PredictionMetrics::new();
    let router = ComplaintRouter::new()
        .unwrap()
        .with_classifier(Arc::new(FailingClassifier::new("broken")))
        .with_metrics(metrics.clone());

    let prediction = router.predict("building on fire, people trapped inside");
    assert_eq!(prediction.department, Department::Fire);
    assert_eq!(prediction.priority, Priority::High);
    assert_eq!(prediction.confidence, 0.5);

    let prediction = router.predict("nothing relevant here");
    assert_eq!(prediction.as_tuple(), ("Municipal", "Low", 0.0));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.inference_failures, 2);
    assert_eq!(snapshot.keyword_resolved, 1);
    assert_eq!(snapshot.defaulted, 1);
}

#[test]
fn test_threshold_override() {
    let router = router_with(MockClassifier::new("m").with_label("Water").with_score(0.4))
        .with_threshold(0.5);
    assert_eq!(router.threshold(), 0.5);
    assert_eq!(router.predict("garbage").department, Department::Municipal);
    assert_eq!(router.predict("garbage").source, DepartmentSource::Keyword);
    assert_eq!(
        router.predict_with_threshold("garbage", 0.3).department,
        Department::Water
    );
}

#[test]
fn test_prediction_is_deterministic() {
    let router = router_with(MockClassifier::new("m").with_label("Water").with_score(0.7));
    let first = router.predict("water pipe leaking on main street");
    for _ in 0..10 {
        assert_eq!(router.predict("water pipe leaking on main street"), first);
    }
}

#[test]
fn test_model_consulted_once_per_prediction() {
    let classifier = Arc::new(MockClassifier::new("m").with_score(0.9));
    let router = ComplaintRouter::new().unwrap().with_classifier(classifier.clone());
    router.predict("a");
    router.predict("b");
    assert_eq!(classifier.call_count(), 2);
}

#[test]
fn test_handle_swaps_router() {
    let handle = RouterHandle::new(ComplaintRouter::new().unwrap());
    assert_eq!(handle.predict("tap leaking").source, DepartmentSource::Keyword);

    let in_flight = handle.current();
    let previous = handle.replace(router_with(
        MockClassifier::new("m").with_label("Fire").with_score(0.9),
    ));
    assert!(!previous.has_model());
    assert!(handle.current().has_model());
    assert_eq!(handle.predict("tap leaking").department, Department::Fire);

    // a router taken before the swap keeps its own state
    assert_eq!(in_flight.predict("tap leaking").department, Department::Water);
}

#[test]
fn test_handle_shared_across_threads() {
    let handle = RouterHandle::new(router_with(
        MockClassifier::new("m").with_label("Water").with_score(0.6),
    ));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.predict("pipe burst").department)
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), Department::Water);
    }
}
