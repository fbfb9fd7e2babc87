//! Synthetic training corpus.
//!
//! Every (department, priority) cell has a handful of hand-written seed
//! complaints. The builder cycles through a cell's seeds, emitting each
//! seed followed by its mechanical paraphrases, until the cell holds
//! `samples_per_category` rows. The full corpus is then shuffled with a
//! fixed seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use triage_core::{Department, Priority, Result, TrainingSample};

use crate::config::CorpusConfig;
use crate::dataset::write_dataset;

type Cell = (Department, Priority, &'static [&'static str]);

const SEEDS: &[Cell] = &[
    (
        Department::Electricity,
        Priority::High,
        &[
            "live wire hanging near the main road causing electric shock hazard",
            "sparking from transformer in residential area near children",
            "electric pole fallen and live wires on ground floor",
            "short circuit in street light causing fire risk",
            "power outage in hospital during emergency situation",
            "critical live wire exposure threatening public safety",
            "emergency electrical hazard causing immediate danger",
            "dangerous high voltage transformer sparking dangerously",
        ],
    ),
    (
        Department::Electricity,
        Priority::Medium,
        &[
            "street light not working on main road for 3 weeks",
            "frequent power tripping affecting daily operations",
            "voltage fluctuations damaging household appliances",
            "broken electric meter near market area",
            "dangling wires on telephone poles creating hazard",
            "electricity meter not recording consumption properly",
            "loose connection at transformer causing sparks intermittently",
            "power supply irregular and unstable in area",
            "electrical wire partially damaged needs immediate repair",
            "damaged transformer needs urgent maintenance and fixing",
        ],
    ),
    (
        Department::Electricity,
        Priority::Low,
        &[
            "street light needs new bulb replacement",
            "light pole slightly tilted, needs straightening",
            "paint fading on electrical pole",
            "minor crack in transformer box",
            "dusty light fixtures need cleaning",
            "minor electrical maintenance required",
            "routine light repair and maintenance needed",
        ],
    ),
    (
        Department::Water,
        Priority::High,
        &[
            "water leakage from main pipeline affecting entire neighborhood",
            "sewage overflow in residential area causing disease outbreak",
            "water supply stopped for more than 48 hours",
            "contaminated water supply causing health issues",
            "major water tank rupture flooding the area",
            "critical water scarcity affecting hospital and homes",
            "emergency sewage overflow creating hazardous condition",
        ],
    ),
    (
        Department::Water,
        Priority::Medium,
        &[
            "water pipe leakage on street resulting in water waste",
            "water supply irregular, only few hours daily",
            "broken water tap wasting precious water resource",
            "water tank maintenance not done for months",
            "slight discoloration in drinking water",
            "water pressure very low in residential area",
            "drainage pipe choked causing water accumulation",
            "water pipe partially damaged causing wastage",
            "water supply intermittent requiring urgent action",
            "stagnant water accumulating due to pipe blockage",
        ],
    ),
    (
        Department::Water,
        Priority::Low,
        &[
            "water meter needs servicing and calibration",
            "minor water pipe repair needed at street corner",
            "water tank needs paint refreshing",
            "old water line needs replacement soon",
            "water tap handle broken needs fixing",
            "routine water maintenance scheduled",
        ],
    ),
    (
        Department::Police,
        Priority::High,
        &[
            "vehicle theft reported, urgent investigation needed",
            "robbery incident on main street, criminal still at large",
            "accident with multiple injuries and vehicles involved",
            "assault case reported, victim in critical condition",
            "molestation incident reported by female citizen",
            "traffic accident with fatality near school",
            "reckless drunk driver causing accidents on highway",
            "critical crime incident requiring immediate response",
            "dangerous accident with severe injuries and casualties",
            "emergency traffic situation with multiple vehicle collision",
        ],
    ),
    (
        Department::Police,
        Priority::Medium,
        &[
            "traffic signal malfunctioning at busy intersection causing congestion",
            "vehicles parked illegally blocking emergency access",
            "rash driving near school affecting student safety",
            "traffic noise pollution from horn usage",
            "stolen two wheeler reported in the area",
            "pickpocketing incidents in crowded market",
            "traffic violation with vehicles breaking red light",
            "accident scene without proper barricading setup",
            "vehicle collision on road needing intervention",
            "traffic congestion due to signal malfunction urgently needs fix",
        ],
    ),
    (
        Department::Police,
        Priority::Low,
        &[
            "traffic signal light needs cleaning from dust",
            "road marking faded, lines need repainting",
            "traffic sign damaged needs replacement",
            "helmet not used by riders, awareness campaign needed",
            "parking space marking needs clarification",
            "routine traffic sign maintenance required",
        ],
    ),
    (
        Department::Pwd,
        Priority::High,
        &[
            "major pothole on main road causing accidents and vehicle damage",
            "road completely damaged affecting vehicle movement",
            "bridge foundation showing cracks, structural integrity at risk",
            "manhole cover missing creating dangerous pit",
            "severe subsidence on road near government building",
            "critical road damage causing traffic accident risk",
            "emergency road collapse threatening public safety",
            "severe pothole hazard causing vehicle damage and accidents",
        ],
    ),
    (
        Department::Pwd,
        Priority::Medium,
        &[
            "multiple potholes on street requiring immediate repair",
            "sidewalk broken making it difficult for elderly and disabled",
            "road surface deteriorated with multiple cracks",
            "street divider damaged after vehicle collision",
            "footpath uneven causing frequent falls and injuries",
            "concrete pavement crumbling near market",
            "road surface uneven near school area",
            "damaged road surface needing urgent patching and repair",
            "broken sidewalk creating walking hazard for citizens",
            "pothole appearing on main street needs quick attention",
        ],
    ),
    (
        Department::Pwd,
        Priority::Low,
        &[
            "road needs repainting of lane markings",
            "minor pothole needs filling in residential street",
            "street sign faded needs repainting",
            "road needs regular maintenance and sweeping",
            "asphalt patch needed on side street",
            "routine road marking and sign maintenance",
        ],
    ),
    (
        Department::Health,
        Priority::High,
        &[
            "food poisoning outbreak in locality causing hospitalizations",
            "stray dogs attacking people in area, urgent animal control needed",
            "dead bird spreading disease, immediate disposal required",
            "dengue outbreak suspected, vector surveillance urgently needed",
            "unhygienic food preparation in restaurant causing health risk",
            "critical disease outbreak requiring emergency response",
            "emergency health hazard affecting multiple people",
            "severe food contamination causing widespread illness urgently",
        ],
    ),
    (
        Department::Health,
        Priority::Medium,
        &[
            "mosquito breeding in stagnant water, dengue prevention needed",
            "stray dogs roaming creating nuisance and safety hazard",
            "food stall operating without proper hygiene license",
            "pharmacy selling expired medicines illegally",
            "malaria cases reported in residential area",
            "pest control needed for rat infestation urgently",
            "pest infestation near food storage area",
            "vector-borne disease indication requiring intervention and control",
            "mosquito breeding requiring immediate pest control action",
            "health hazard due to animals and insects present nearby",
        ],
    ),
    (
        Department::Health,
        Priority::Low,
        &[
            "health center needs routine inspection and maintenance",
            "clinic needs equipment calibration",
            "health awareness poster placement needed",
            "sanitation training program for food vendors",
            "health checkup camp scheduling needed",
            "routine health facility maintenance required",
        ],
    ),
    (
        Department::Fire,
        Priority::High,
        &[
            "building on fire with people trapped inside",
            "gas cylinder blast in residential building",
            "chemical fire in warehouse area",
            "explosion near petrol pump causing severe damage",
            "fire in dense residential area threatening multiple buildings",
            "critical fire emergency requiring immediate response",
            "emergency fire situation with potential casualties",
            "severe explosion hazard threatening surrounding buildings",
        ],
    ),
    (
        Department::Fire,
        Priority::Medium,
        &[
            "smoke coming from basement of office building",
            "fire extinguisher not available in government building",
            "fire alarm system not working in hospital",
            "electrical burning smell in residential complex",
            "fire safety audit failing in commercial area",
            "potential fire risk due to electrical issue detected",
            "fire hazard condition needing urgent attention and inspection",
            "burning smell indicating possible fire risk in building",
        ],
    ),
    (
        Department::Fire,
        Priority::Low,
        &[
            "fire safety signage needs replacement in mall",
            "fire exit door needs repair in office",
            "fire equipment maintenance and inspection due",
            "fire safety training needed for staff",
            "emergency light needs battery replacement",
            "routine fire safety equipment maintenance needed",
        ],
    ),
    (
        Department::Municipal,
        Priority::High,
        &[
            "open dumping of waste creating health hazard in residential area",
            "encroachment blocking main road affecting public access",
            "garbage accumulation causing disease outbreak",
            "illegal construction on public land",
            "sewage treatment plant overflow causing environmental damage",
            "critical waste management crisis threatening public health",
            "emergency encroachment blocking essential services and access",
            "severe garbage accumulation causing environmental and health emergency",
        ],
    ),
    (
        Department::Municipal,
        Priority::Medium,
        &[
            "garbage not collected for several days, piling up",
            "overflowing dustbin on street creating smell",
            "tree branches hanging dangerously near road",
            "park encroachment by unauthorized vendors",
            "street cleaning not done for weeks",
            "illegal billboard obstruction on public path",
            "public toilet not functioning for community",
            "waste accumulation needing urgent collection and disposal",
            "garbage piling requiring immediate cleanup action",
            "encroachment issue needing removal and enforcement action",
            "dustbin overflow creating nuisance and smell in area",
        ],
    ),
    (
        Department::Municipal,
        Priority::Low,
        &[
            "park bench needs repainting and repair",
            "tree branches need pruning for maintenance",
            "park grass needs regular cutting and maintenance",
            "dustbin needs replacement in area",
            "public area beautification needed",
            "street sign installation for park entrance",
            "park fence needs minor repair and maintenance",
            "routine park maintenance and beautification required",
        ],
    ),
];

/// Whole-word substitution groups, applied one group per paraphrase
const SUBSTITUTIONS: &[&[(&str, &str)]] = &[
    &[("needs", "requires"), ("the", "this")],
    &[("area", "locality"), ("urgent", "immediate")],
    &[("and", "&")],
];

fn substitution_patterns() -> &'static Vec<Vec<(Regex, &'static str)>> {
    static PATTERNS: OnceLock<Vec<Vec<(Regex, &'static str)>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SUBSTITUTIONS
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|(from, to)| {
                        let pattern = format!(r"\b{}\b", regex::escape(from));
                        (
                            Regex::new(&pattern).expect("substitution pattern is a valid regex"),
                            *to,
                        )
                    })
                    .collect()
            })
            .collect()
    })
}

fn substitute(text: &str, group: &[(Regex, &str)]) -> String {
    group.iter().fold(text.to_string(), |acc, (pattern, to)| {
        pattern.replace_all(&acc, *to).into_owned()
    })
}

/// Mechanical paraphrases of a seed complaint, in emission order
pub fn paraphrases(seed: &str) -> Vec<String> {
    let patterns = substitution_patterns();
    let punctuated = if seed.contains('.') {
        seed.replace('.', ", action required.")
    } else {
        format!("{}, action required.", seed)
    };

    vec![
        substitute(seed, &patterns[0]),
        substitute(seed, &patterns[1]),
        format!("Reported: {}", seed),
        format!("{} Please take action", seed),
        punctuated,
        substitute(seed, &patterns[2]),
        format!("Issue: {}", seed),
        format!("{} urgent", seed),
        format!("{} reported", seed),
    ]
}

/// Builds the labeled training corpus
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    samples_per_category: usize,
    seed: u64,
}

impl CorpusBuilder {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            samples_per_category: config.samples_per_category,
            seed: config.seed,
        }
    }

    /// Generate and shuffle all rows
    pub fn build(&self) -> Vec<TrainingSample> {
        let mut samples = Vec::with_capacity(SEEDS.len() * self.samples_per_category);
        for (department, priority, seeds) in SEEDS {
            samples.extend(self.build_cell(*department, *priority, seeds));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        samples.shuffle(&mut rng);

        tracing::debug!(
            rows = samples.len(),
            cells = SEEDS.len(),
            "generated training corpus"
        );
        samples
    }

    /// Generate the corpus and write it as CSV
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<Vec<TrainingSample>> {
        let samples = self.build();
        write_dataset(path, &samples)?;
        Ok(samples)
    }

    fn build_cell(
        &self,
        department: Department,
        priority: Priority,
        seeds: &[&str],
    ) -> Vec<TrainingSample> {
        let label = department.training_label();
        let target = self.samples_per_category;

        seeds
            .iter()
            .cycle()
            .flat_map(|seed| std::iter::once(seed.to_string()).chain(paraphrases(seed)))
            .take(target)
            .map(|text| TrainingSample::new(text, label, priority))
            .collect()
    }

    /// Number of (department, priority) cells
    pub fn cell_count() -> usize {
        SEEDS.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetSummary;

    fn builder(samples_per_category: usize) -> CorpusBuilder {
        CorpusBuilder::new(&CorpusConfig {
            samples_per_category,
            seed: 42,
        })
    }

    #[test]
    fn test_every_cell_is_covered() {
        assert_eq!(CorpusBuilder::cell_count(), 21);
        let samples = builder(30).build();
        assert_eq!(samples.len(), 21 * 30);

        let summary = DatasetSummary::from_samples(&samples);
        assert_eq!(summary.by_label.len(), 7);
        assert!(summary.by_label.values().all(|&n| n == 90));
        assert_eq!(summary.by_priority[&Priority::High], 7 * 30);
        assert!((summary.balance_score() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_uses_training_labels() {
        let samples = builder(10).build();
        assert!(samples.iter().any(|s| s.label == "Police/Traffic"));
        assert!(samples.iter().any(|s| s.label == "Municipality"));
        assert!(samples.iter().all(|s| s.label != "Municipal"));
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        assert_eq!(builder(20).build(), builder(20).build());
    }

    #[test]
    fn test_substitutions_respect_word_boundaries() {
        let variants = paraphrases("the theatre area needs care and handling");
        assert_eq!(variants[0], "this theatre area requires care and handling");
        assert_eq!(variants[1], "the theatre locality needs care and handling");
        assert_eq!(variants[5], "the theatre area needs care & handling");
        assert_eq!(variants[2], "Reported: the theatre area needs care and handling");
    }

    #[test]
    fn test_punctuation_variant() {
        let variants = paraphrases("pipe burst");
        assert_eq!(variants[4], "pipe burst, action required.");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        let written = builder(5).write_to(&path).unwrap();
        let loaded = crate::dataset::load_dataset(&path).unwrap();
        assert_eq!(written, loaded);
    }
}
