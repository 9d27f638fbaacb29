//! Conan dependency graph input.
//!
//! - [`args`]: graph-selection arguments forwarded to `conan graph info`
//! - [`model`]: the resolved graph as Conan prints it
//! - [`loader`]: where the graph comes from (Conan process or JSON file)

pub mod args;
pub mod loader;
pub mod model;

pub use args::GraphArgs;
pub use loader::{ConanCli, GraphFile, GraphLoader, RemoteIndex};
pub use model::{ConanGraph, DependencyInfo, GraphNode, LicenseField, Remote};
