//! Error types for the card pipeline

use thiserror::Error;

use crate::Role;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the card pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// A required participant name was empty at generation time
    #[error("Missing name for {0}")]
    MissingName(Role),

    /// Failed to initialize a pipeline component
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// The card template could not be used
    #[error("Template error: {0}")]
    TemplateError(String),

    /// The rasterizer backend failed to capture the card
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Network error while fetching an asset
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Failed to save the rendered artifact
    #[error("Save failed: {0}")]
    SaveError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
