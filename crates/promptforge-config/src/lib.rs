//! Configuration system for PromptForge.
//!
//! Load the technique catalog, selection rules, and complexity-estimation
//! weights from TOML or YAML files so that new techniques and rule changes
//! require only new config rows, not recompilation.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use promptforge_config::EnhancerConfig;
//!
//! let config = EnhancerConfig::from_toml_str(r#"
//!     [selection]
//!     max_techniques = 2
//!     min_confidence = 0.4
//!
//!     [[techniques]]
//!     id = "chain_of_thought"
//!     name = "Chain of Thought"
//!     priority = 10
//!     template = "Let's work through this step by step.\n\n{text}"
//!     [techniques.conditions]
//!     intents = ["problem_solving"]
//!     complexity_threshold = 0.5
//! "#).unwrap();
//!
//! assert_eq!(config.selection.max_techniques, 2);
//! assert_eq!(config.techniques.len(), 1);
//! ```
//!
//! Configuration is validated at load time; malformed catalogs are fatal
//! and must prevent startup (`EnhancerConfig::load` runs `validate`).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use promptforge_core::Technique;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration: catalog, selection rules, estimator weights.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EnhancerConfig {
    /// The technique catalog.
    #[serde(default)]
    pub techniques: Vec<Technique>,

    /// Selection rules for the scoring engine and selector.
    #[serde(default)]
    pub selection: SelectionRules,

    /// Complexity-estimation weight tables.
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

impl EnhancerConfig {
    /// Creates a new default configuration (empty catalog).
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML or YAML file,
    /// dispatching on the file extension (`.yaml`/`.yml` parse as YAML,
    /// anything else as TOML).
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, fails to parse, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Adds a technique to the catalog.
    pub fn with_technique(mut self, technique: Technique) -> Self {
        self.techniques.push(technique);
        self
    }

    /// Replaces the selection rules.
    pub fn with_selection(mut self, selection: SelectionRules) -> Self {
        self.selection = selection;
        self
    }

    /// Checks catalog and rule consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for empty or duplicate technique
    /// ids, out-of-range thresholds or confidence bounds, and
    /// incompatibility pairs naming unknown techniques.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = BTreeSet::new();
        for t in &self.techniques {
            if t.id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "technique '{}' has an empty id",
                    t.name
                )));
            }
            if !ids.insert(t.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate technique id '{}'",
                    t.id
                )));
            }
            for threshold in [
                t.conditions.complexity_threshold,
                t.conditions.complexity_threshold_max,
            ]
            .into_iter()
            .flatten()
            {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::Invalid(format!(
                        "technique '{}': complexity threshold {} outside [0, 1]",
                        t.id, threshold
                    )));
                }
            }
        }

        let rules = &self.selection;
        if !(0.0..=1.0).contains(&rules.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence {} outside [0, 1]",
                rules.min_confidence
            )));
        }
        if rules.max_techniques == 0 {
            return Err(ConfigError::Invalid(
                "max_techniques must be at least 1".to_string(),
            ));
        }
        for pair in &rules.incompatible {
            for id in pair {
                if !ids.contains(id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "incompatibility pair references unknown technique '{id}'"
                    )));
                }
            }
        }
        if !rules.compatible.is_empty() {
            // Allow-list entries are accepted for forward compatibility but
            // carry no semantics; only the deny-list is enforced.
            tracing::warn!(
                pairs = rules.compatible.len(),
                "compatible_combinations present in config; entries are advisory and ignored"
            );
        }

        self.estimator.validate()?;
        Ok(())
    }

    /// Builds the immutable incompatibility lookup table from the rules.
    pub fn incompatibility_table(&self) -> IncompatibilityTable {
        IncompatibilityTable::new(&self.selection.incompatible)
    }
}

/// Rules governing filtering, ranking, and combination of techniques.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionRules {
    /// Default cap on selected techniques (request may override).
    #[serde(default = "default_max_techniques")]
    pub max_techniques: usize,

    /// Minimum confidence a technique must reach to survive filtering.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// intent -> technique id -> boost. Each boost is multiplied by 10 and
    /// added to the technique's score when the request carries that intent.
    #[serde(default)]
    pub intent_boosts: BTreeMap<String, BTreeMap<String, f64>>,

    /// Unordered pairs of technique ids that must never co-occur.
    #[serde(default)]
    pub incompatible: Vec<[String; 2]>,

    /// Advisory allow-list; parsed but not enforced.
    #[serde(default, rename = "compatible_combinations")]
    pub compatible: Vec<[String; 2]>,

    /// Per-technique transform timeout in milliseconds; unset disables the
    /// timeout.
    #[serde(default)]
    pub technique_timeout_ms: Option<u64>,

    /// Abort the chain run on the first technique failure instead of
    /// continuing (default: continue).
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_max_techniques() -> usize {
    3
}

fn default_min_confidence() -> f64 {
    0.3
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            max_techniques: default_max_techniques(),
            min_confidence: default_min_confidence(),
            intent_boosts: BTreeMap::new(),
            incompatible: Vec::new(),
            compatible: Vec::new(),
            technique_timeout_ms: None,
            fail_fast: false,
        }
    }
}

impl SelectionRules {
    /// Boost for (intent, technique id), default 0.
    pub fn boost(&self, intent: &str, technique_id: &str) -> f64 {
        self.intent_boosts
            .get(intent)
            .and_then(|m| m.get(technique_id))
            .copied()
            .unwrap_or(0.0)
    }

    /// Per-technique timeout as a [`Duration`], if configured.
    pub fn technique_timeout(&self) -> Option<Duration> {
        self.technique_timeout_ms.map(Duration::from_millis)
    }
}

/// Immutable symmetric lookup over configured incompatibility pairs.
///
/// Constructed once at startup and injected into the selector; safe for
/// unsynchronized concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct IncompatibilityTable {
    pairs: BTreeSet<(String, String)>,
}

impl IncompatibilityTable {
    /// Builds the table from unordered id pairs.
    pub fn new(pairs: &[[String; 2]]) -> Self {
        let pairs = pairs
            .iter()
            .map(|[a, b]| {
                if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                }
            })
            .collect();
        Self { pairs }
    }

    /// Whether `a` and `b` are configured as mutually exclusive, in either
    /// order.
    pub fn incompatible(&self, a: &str, b: &str) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pairs
            .contains(&(key.0.to_string(), key.1.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Word-count bucket for the complexity estimator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WordBucket {
    /// Upper bound (inclusive) on word count; unset means unbounded.
    #[serde(default)]
    pub max_words: Option<usize>,
    /// Score added when the word count falls in this bucket.
    pub score: f64,
}

/// Weight tables for the complexity estimator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EstimatorConfig {
    /// Word-count buckets, checked in order; the first bucket whose
    /// `max_words` is not exceeded contributes its score.
    #[serde(default = "default_word_buckets")]
    pub word_buckets: Vec<WordBucket>,

    /// Added once when the text contains more than one `?` or the literal
    /// `" and "`.
    #[serde(default = "default_multi_part_bonus")]
    pub multi_part_bonus: f64,

    /// Technical vocabulary; matches raise complexity.
    #[serde(default = "default_technical_terms")]
    pub technical_terms: Vec<String>,

    /// Total weight of the technical list, divided evenly across terms.
    #[serde(default = "default_technical_weight")]
    pub technical_weight: f64,

    /// Abstract-concept vocabulary; matches raise complexity.
    #[serde(default = "default_abstract_terms")]
    pub abstract_terms: Vec<String>,

    /// Total weight of the abstract list, divided evenly across terms.
    #[serde(default = "default_abstract_weight")]
    pub abstract_weight: f64,
}

fn default_word_buckets() -> Vec<WordBucket> {
    vec![
        WordBucket {
            max_words: Some(10),
            score: 0.1,
        },
        WordBucket {
            max_words: Some(50),
            score: 0.3,
        },
        WordBucket {
            max_words: None,
            score: 0.5,
        },
    ]
}

fn default_multi_part_bonus() -> f64 {
    0.2
}

fn default_technical_weight() -> f64 {
    0.3
}

fn default_abstract_weight() -> f64 {
    0.2
}

fn default_technical_terms() -> Vec<String> {
    [
        "algorithm",
        "architecture",
        "api",
        "concurrency",
        "database",
        "debug",
        "implement",
        "optimize",
        "performance",
        "refactor",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_abstract_terms() -> Vec<String> {
    [
        "approach",
        "concept",
        "design",
        "pattern",
        "principle",
        "scalability",
        "strategy",
        "trade-off",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            word_buckets: default_word_buckets(),
            multi_part_bonus: default_multi_part_bonus(),
            technical_terms: default_technical_terms(),
            technical_weight: default_technical_weight(),
            abstract_terms: default_abstract_terms(),
            abstract_weight: default_abstract_weight(),
        }
    }
}

impl EstimatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.word_buckets.is_empty() {
            return Err(ConfigError::Invalid(
                "estimator must declare at least one word bucket".to_string(),
            ));
        }
        for weight in [self.multi_part_bonus, self.technical_weight, self.abstract_weight] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::Invalid(format!(
                    "estimator weight {weight} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}
