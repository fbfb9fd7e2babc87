//! Keyword rule tables for priority and department fallback.
//!
//! Matching is whole-word and case-insensitive. Each table is an ordered
//! list of categories; when keywords of several categories occur in the
//! text, the category listed first wins, regardless of where in the text
//! the keywords appear.

use aho_corasick::{AhoCorasick, MatchKind};
use triage_core::{Department, Error, Priority, Result};

const HIGH_PRIORITY: &[&str] = &[
    "fire", "blast", "explosion", "spark", "sparking", "live wire", "electric shock",
    "current", "death", "casualty", "blood", "murder", "robbery", "assault", "attack",
    "gas leak", "poison", "poisoning", "drowning", "snatching", "rape", "molestation",
    "collapse", "building collapse", "dam break", "flood", "landslide",
    "power outage", "water shortage", "sewage overflow", "emergency", "urgent",
];

const MEDIUM_PRIORITY: &[&str] = &[
    "garbage", "waste", "smell", "stench", "odor", "leak", "leakage", "sewage", "stagnant",
    "mosquito", "dengue", "malaria", "disease", "infection", "unhygienic", "hygiene",
    "jam", "jammed", "broken", "damage", "damaged", "dirty", "choked", "blockage", "blocked",
    "pothole", "worn", "deterioration", "crack",
    "traffic", "congestion", "vehicle", "collision", "stolen", "theft", "theft suspect",
    "water supply", "power supply", "electricity", "power",
];

const LOW_PRIORITY: &[&str] = &[
    "park", "bench", "grass", "paint", "painting", "faded", "poster", "banner",
    "banner posting", "cleaning", "clean", "leaves", "parking", "space", "tree", "trees",
    "beautification", "light pole", "street sign", "road sign", "marking", "line marking",
    "minor", "small", "maintenance",
];

const DEPARTMENT_KEYWORDS: &[(Department, &[&str])] = &[
    (
        Department::Electricity,
        &[
            "light", "pole", "wire", "current", "power", "meter", "voltage", "transformer",
            "electric", "electricity", "electrical", "bulb", "lamp", "light bulb",
            "street light", "street lighting", "connection", "electricity meter",
            "electric pole", "live wire", "short circuit", "tripping",
        ],
    ),
    (
        Department::Water,
        &[
            "water", "pipe", "tap", "leakage", "supply", "tank", "drain", "drainage", "sewer",
            "sewage", "water supply", "water line", "water tank", "leakage point", "water meter",
        ],
    ),
    (
        Department::Police,
        &[
            "theft", "robbery", "fight", "crime", "traffic", "signal", "noise", "stolen",
            "police", "accident", "law", "order", "security", "unsafe", "molestation", "rape",
            "assault", "helmet", "seatbelt", "traffic rule", "drunk", "speeding",
            "rash driving",
        ],
    ),
    (
        Department::Pwd,
        &[
            "road", "pothole", "bridge", "street", "divider", "repair", "pavement", "concrete",
            "asphalt", "sidewalk", "footpath", "ramp", "slope", "road condition", "road repair",
            "manhole", "street repair", "road marking",
        ],
    ),
    (
        Department::Health,
        &[
            "mosquito", "dengue", "malaria", "food", "hospital", "dog", "stray", "animal",
            "medicine", "health", "clinic", "medical", "disease", "hygiene", "sanitation",
            "pest", "rats", "expired", "pharmacy", "license", "food safety", "food poisoning",
        ],
    ),
    (
        Department::Fire,
        &[
            "fire", "smoke", "blast", "cylinder", "gas", "lpg", "explosion", "burning", "burn",
            "fire station", "emergency", "rescue",
        ],
    ),
    (
        Department::Municipal,
        &[
            "garbage", "dustbin", "cleaning", "tree", "park", "encroachment", "toilet",
            "municipal", "waste", "waste management", "sweeping", "collection", "public",
            "community", "park maintenance", "green space", "open dump", "open dumping",
            "encroachment removal",
        ],
    ),
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Ordered keyword table mapping whole-word matches to a category
#[derive(Debug, Clone)]
pub struct KeywordTable<C> {
    matcher: AhoCorasick,
    /// Category rank of each pattern
    pattern_rank: Vec<usize>,
    categories: Vec<C>,
    keywords: Vec<String>,
}

/// A category resolved by a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a, C> {
    pub category: C,
    pub keyword: &'a str,
}

impl<C: Copy> KeywordTable<C> {
    /// Build a table from categories in precedence order
    pub fn new<S: AsRef<str>>(entries: &[(C, &[S])]) -> Result<Self> {
        let mut keywords = Vec::new();
        let mut pattern_rank = Vec::new();
        let mut categories = Vec::with_capacity(entries.len());

        for (rank, (category, words)) in entries.iter().enumerate() {
            categories.push(*category);
            for word in words.iter() {
                let word = word.as_ref().trim().to_lowercase();
                if word.is_empty() {
                    return Err(Error::config("keyword tables must not contain empty keywords"));
                }
                keywords.push(word);
                pattern_rank.push(rank);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&keywords)
            .map_err(|e| Error::config(format!("Failed to build keyword matcher: {}", e)))?;

        Ok(Self {
            matcher,
            pattern_rank,
            categories,
            keywords,
        })
    }

    /// Highest-precedence category with a whole-word keyword in `text`
    pub fn first_match(&self, text: &str) -> Option<KeywordMatch<'_, C>> {
        let lowered = text.to_lowercase();
        let mut best: Option<usize> = None;

        for m in self.matcher.find_overlapping_iter(&lowered) {
            if !is_whole_word(&lowered, m.start(), m.end()) {
                continue;
            }
            let pattern = m.pattern().as_usize();
            let better = best.map_or(true, |b| self.pattern_rank[pattern] < self.pattern_rank[b]);
            if better {
                best = Some(pattern);
                if self.pattern_rank[pattern] == 0 {
                    break;
                }
            }
        }

        best.map(|pattern| KeywordMatch {
            category: self.categories[self.pattern_rank[pattern]],
            keyword: &self.keywords[pattern],
        })
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Priority and department keyword tables
#[derive(Debug, Clone)]
pub struct RuleTables {
    priority: KeywordTable<Priority>,
    department: KeywordTable<Department>,
}

impl RuleTables {
    /// The built-in civic complaint tables
    pub fn standard() -> Result<Self> {
        let priority = KeywordTable::new(&[
            (Priority::High, HIGH_PRIORITY),
            (Priority::Medium, MEDIUM_PRIORITY),
            (Priority::Low, LOW_PRIORITY),
        ])?;
        let department = KeywordTable::new(DEPARTMENT_KEYWORDS)?;
        Ok(Self {
            priority,
            department,
        })
    }

    /// Build from custom tables
    pub fn from_tables(
        priority: KeywordTable<Priority>,
        department: KeywordTable<Department>,
    ) -> Self {
        Self {
            priority,
            department,
        }
    }

    /// High beats Medium; anything else, including a Low keyword, is Low
    pub fn match_priority(&self, text: &str) -> Priority {
        self.priority
            .first_match(text)
            .map(|m| m.category)
            .unwrap_or_default()
    }

    /// First department in table order with any keyword in `text`
    pub fn match_department(&self, text: &str) -> Option<Department> {
        self.match_department_keyword(text).map(|m| m.category)
    }

    /// Like [`match_department`](Self::match_department), also naming the
    /// keyword that decided it
    pub fn match_department_keyword(&self, text: &str) -> Option<KeywordMatch<'_, Department>> {
        self.department.first_match(text)
    }
}
