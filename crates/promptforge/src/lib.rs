//! PromptForge - a configuration-driven prompt-enhancement engine.
//!
//! Zero-wiring API: load a catalog and call [`Enhancer::enhance`].
//!
//! ```
//! use promptforge::{Enhancer, EnhancerConfig, SelectionRequest};
//!
//! let config = EnhancerConfig::from_toml_str(r#"
//!     [[techniques]]
//!     id = "chain_of_thought"
//!     name = "Chain of Thought"
//!     priority = 35
//!     template = "Let's work through this step by step.\n\n{text}"
//! "#).unwrap();
//! let enhancer = Enhancer::with_config(config).unwrap();
//!
//! let request = SelectionRequest::new("How do I debug this?").with_complexity(0.5);
//! let outcome = enhancer.enhance(&request).unwrap();
//! assert!(outcome.enhanced_text.starts_with("Let's work through"));
//! ```

pub use promptforge_chain::{
    ChainExecutor, ChainOutcome, TechniqueRegistry, TechniqueTransform, TemplateTransform,
    TransformOutput,
};
pub use promptforge_config::{
    ConfigError, EnhancerConfig, EstimatorConfig, IncompatibilityTable, SelectionRules,
};
pub use promptforge_core::{
    ChainContext, ChainError, ChainSummary, Conditions, ContextMap, ContextValue,
    PromptForgeError, Result, ScoredTechnique, SelectionMetadata, SelectionRequest,
    SelectionResponse, Technique,
};
pub use promptforge_scoring::{ComplexityEstimator, ScoringEngine, Selector, TechniqueSelector};

mod enhancer;
pub use enhancer::{EnhanceOutcome, Enhancer};
