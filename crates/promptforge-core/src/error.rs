//! Error types for PromptForge

use thiserror::Error;

/// Main error type for PromptForge operations
#[derive(Debug, Error)]
pub enum PromptForgeError {
    /// Request failed validation before scoring
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A technique id was not found in the catalog or registry
    #[error("Unknown technique: {0}")]
    UnknownTechnique(String),

    /// A single technique transform failed during a chain run
    #[error("Technique '{id}' failed: {message}")]
    TechniqueFailed { id: String, message: String },

    /// A technique transform exceeded the configured timeout
    #[error("Technique '{0}' timed out")]
    TechniqueTimeout(String),

    /// Chain run aborted under the fail-fast policy
    #[error("Chain run failed at technique '{0}'")]
    ChainFailed(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for PromptForge operations
pub type Result<T> = std::result::Result<T, PromptForgeError>;
