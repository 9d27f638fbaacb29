//! **CycloneDX SBOMs from Conan dependency graphs.**
//!
//! `conan-sbom` takes the dependency graph Conan resolved for a recipe or a set
//! of references and turns it into a CycloneDX 1.4 JSON document. Resolution,
//! version solving and lockfile handling stay with Conan; this crate only
//! consumes the resolved graph.
//!
//! ## Core Concepts & Modules
//!
//! - **[`graph`]**: The resolved graph as Conan prints it ([`ConanGraph`]), the
//!   [`GraphLoader`] seam with its Conan-process and JSON-file implementations,
//!   and the graph-selection arguments forwarded to `conan graph info`.
//! - **[`convert`]**: The single pass that maps every node to a component and
//!   every direct edge to a dependency entry ([`graph_to_bom`]).
//! - **[`cyclonedx`]**: The CycloneDX 1.4 object model and [`validate_bom`].
//! - **[`pipeline`]**: Loading with context, remote URL resolution and output.
//! - **[`config`]**: YAML config file discovery, merging and validation.
//!
//! ## Getting Started
//!
//! ```no_run
//! use conan_sbom::{graph_to_bom, ConanGraph, ConvertOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("graph.json")?;
//!     let graph = ConanGraph::from_json_str(&json)?;
//!
//!     let bom = graph_to_bom(&graph, &ConvertOptions::default())?;
//!     println!("{}", bom.to_json(true)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `conan-sbom create-sbom` command wraps the above: it runs
//! `conan graph info --format=json` (or reads `--graph-json`), converts the
//! graph and writes the SBOM to stdout or `--output-file`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod cyclonedx;
pub mod error;
pub mod graph;
pub mod pipeline;

// Re-export main types for convenience
pub use config::{AppConfig, ConanConfig, ConfigError, OutputConfig, Validatable};
pub use convert::{
    create_component, graph_to_bom, licenses, package_type_to_component_type, package_url,
    ConvertOptions,
};
pub use cyclonedx::{validate_bom, Bom, Classification, Component, ValidationReport};
pub use error::{ErrorContext, Result, SbomError};
pub use graph::{ConanCli, ConanGraph, GraphArgs, GraphFile, GraphLoader, GraphNode, RemoteIndex};
