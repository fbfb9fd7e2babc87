//! Acceptance scenarios for a trained router

use serde::Serialize;
use triage_core::{Department, Prediction, Priority};

use crate::router::ComplaintRouter;

/// A complaint with its expected routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub text: &'static str,
    pub department: Department,
    pub priority: Priority,
}

/// Canonical complaints covering every department.
///
/// The street light and pothole expectations come from product
/// acceptance notes; with rule-only priorities they resolve to Low and
/// Medium respectively, so both report as partial.
pub const SCENARIOS: [Scenario; 8] = [
    Scenario {
        text: "live wire hanging near children causing electric shock hazard",
        department: Department::Electricity,
        priority: Priority::High,
    },
    Scenario {
        text: "street light not working for 2 weeks",
        department: Department::Electricity,
        priority: Priority::Medium,
    },
    Scenario {
        text: "water pipe leaking on main street",
        department: Department::Water,
        priority: Priority::Medium,
    },
    Scenario {
        text: "garbage piling up for days causing smell",
        department: Department::Municipal,
        priority: Priority::Medium,
    },
    Scenario {
        text: "pothole on road needs filling",
        department: Department::Pwd,
        priority: Priority::Low,
    },
    Scenario {
        text: "traffic signal broken at intersection",
        department: Department::Police,
        priority: Priority::Medium,
    },
    Scenario {
        text: "stray dogs causing nuisance, dengue mosquitoes",
        department: Department::Health,
        priority: Priority::Medium,
    },
    Scenario {
        text: "building on fire, people trapped inside",
        department: Department::Fire,
        priority: Priority::High,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Department and priority both match
    Pass,
    /// Exactly one of them matches
    Partial,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub prediction: Prediction,
    pub outcome: Outcome,
}

impl ScenarioResult {
    pub fn department_matches(&self) -> bool {
        self.prediction.department == self.scenario.department
    }

    pub fn priority_matches(&self) -> bool {
        self.prediction.priority == self.scenario.priority
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub results: Vec<ScenarioResult>,
}

impl EvaluationReport {
    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Pass)
    }

    pub fn partial(&self) -> usize {
        self.count(Outcome::Partial)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Fail)
    }

    /// Share of fully passing scenarios
    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.passed() as f64 / self.results.len() as f64
        }
    }
}

/// Run `scenarios` through the router
pub fn evaluate(router: &ComplaintRouter, scenarios: &[Scenario]) -> EvaluationReport {
    let results = scenarios
        .iter()
        .map(|scenario| {
            let prediction = router.predict(scenario.text);
            let department = prediction.department == scenario.department;
            let priority = prediction.priority == scenario.priority;
            let outcome = match (department, priority) {
                (true, true) => Outcome::Pass,
                (false, false) => Outcome::Fail,
                _ => Outcome::Partial,
            };
            tracing::debug!(text = scenario.text, ?outcome, "evaluated scenario");
            ScenarioResult {
                scenario: *scenario,
                prediction,
                outcome,
            }
        })
        .collect();

    EvaluationReport { results }
}
