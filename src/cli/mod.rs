//! CLI command handlers.
//!
//! Handlers hold the command logic so it can be tested without going
//! through argument parsing in main.rs.

mod create_sbom;

pub use create_sbom::{build_sbom, run_create_sbom};

// Re-export config types used by handlers
pub use crate::config::{CreateSbomConfig, GraphSource};
