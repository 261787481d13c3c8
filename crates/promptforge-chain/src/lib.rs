//! Sequential technique chain execution for PromptForge.
//!
//! This crate provides the enhancement half of the pipeline:
//! - [`TechniqueTransform`]: the capability interface one technique
//!   implements
//! - [`TechniqueRegistry`]: id -> transform lookup for custom transforms
//! - [`TemplateTransform`]: the built-in template-filling transform
//! - [`ChainExecutor`]: applies an ordered technique list to a text,
//!   threading accumulated context and recovering from per-technique
//!   failures

pub mod executor;
pub mod techniques;
pub mod transform;

pub use executor::{ChainExecutor, ChainOutcome};
pub use techniques::TemplateTransform;
pub use transform::{TechniqueRegistry, TechniqueTransform, TransformOutput};
