//! Unified error types for conan-sbom.
//!
//! This module provides the error hierarchy for the library, with context
//! chaining so that a failure deep in graph loading still reports which
//! command or file it came from.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conan-sbom operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// The dependency graph could not be read or is structurally broken
    #[error("Invalid dependency graph: {context}")]
    Graph {
        context: String,
        #[source]
        source: GraphErrorKind,
    },

    /// Running the Conan executable failed
    #[error("Conan invocation failed: {context}")]
    Conan {
        context: String,
        #[source]
        source: ConanErrorKind,
    },

    /// Building or serializing the BOM failed
    #[error("BOM generation failed: {context}")]
    Bom {
        context: String,
        #[source]
        source: BomErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or argument errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific graph error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GraphErrorKind {
    #[error("Invalid graph JSON: {0}")]
    InvalidJson(String),

    #[error("Root node '{0}' is not part of the graph")]
    MissingRoot(String),

    #[error("Node '{from}' depends on unknown node '{to}'")]
    UnknownNode { from: String, to: String },

    #[error("Conan could not resolve the graph: {0}")]
    Unresolved(String),
}

/// Specific Conan invocation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConanErrorKind {
    #[error("Conan executable not found: {0}")]
    NotFound(String),

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Unexpected output from `{command}`: {message}")]
    InvalidOutput { command: String, message: String },
}

/// Specific BOM error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BomErrorKind {
    #[error("Cannot build PURL for '{name}': {reason}")]
    InvalidPurl { name: String, reason: String },

    #[error("JSON serialization failed: {0}")]
    Serialization(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for conan-sbom operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a graph error with context
    pub fn graph(context: impl Into<String>, source: GraphErrorKind) -> Self {
        Self::Graph {
            context: context.into(),
            source,
        }
    }

    /// Create a Conan invocation error with context
    pub fn conan(context: impl Into<String>, source: ConanErrorKind) -> Self {
        Self::Conan {
            context: context.into(),
            source,
        }
    }

    /// Create a BOM error with context
    pub fn bom(context: impl Into<String>, source: BomErrorKind) -> Self {
        Self::Bom {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomError {
    fn from(err: serde_json::Error) -> Self {
        Self::graph(
            "JSON deserialization",
            GraphErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are prepended to the error's existing context, so a
/// failure reads as a path through the code:
///
/// ```ignore
/// use conan_sbom::error::ErrorContext;
///
/// let graph = ConanGraph::from_json_str(&content)
///     .with_context(|| format!("reading graph from {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomError, new_ctx: &str) -> SbomError {
    match err {
        SbomError::Graph {
            context: existing,
            source,
        } => SbomError::Graph {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Conan {
            context: existing,
            source,
        } => SbomError::Conan {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Bom {
            context: existing,
            source,
        } => SbomError::Bom {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Io {
            path,
            message,
            source,
        } => SbomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomError::Config(msg) => SbomError::Config(chain_context(new_ctx, &msg)),
        SbomError::Validation(msg) => SbomError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
