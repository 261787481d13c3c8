//! PromptForge Core - Core types for prompt enhancement
//!
//! This crate provides the fundamental types shared by the PromptForge
//! crates:
//! - Technique catalog entries and their applicability conditions
//! - Selection request/response types for the scoring pipeline
//! - The typed context-value container threaded through chain runs
//! - The per-run chain context and execution summary
//! - Error types

pub mod context;
pub mod error;
pub mod request;
pub mod technique;

pub use context::{ChainContext, ChainError, ChainSummary, ContextMap, ContextValue};
pub use error::{PromptForgeError, Result};
pub use request::{SelectionMetadata, SelectionRequest, SelectionResponse};
pub use technique::{Conditions, ScoredTechnique, Technique};
