//! Configuration types for conan-sbom operations.

use super::defaults::DEFAULT_CONAN_EXECUTABLE;
use crate::convert::ConvertOptions;
use crate::error::{Result, SbomError};
use crate::graph::GraphArgs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Settings that can come from a config file, with CLI flags layered on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// How to run Conan
    pub conan: ConanConfig,
    /// Where and how to write the SBOM
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Settings given on the command line.
///
/// `None` leaves the file value alone. `Some` always wins, even when it
/// equals the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub executable: Option<String>,
    pub resolve_remote_urls: Option<bool>,
    pub output_file: Option<PathBuf>,
    pub pretty: Option<bool>,
    pub serial_number: Option<bool>,
    pub timestamp: Option<bool>,
}

/// Conan invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ConanConfig {
    /// Name or path of the Conan executable
    pub executable: String,
    /// Run `conan remote list` to add `repository_url` to package URLs
    pub resolve_remote_urls: bool,
}

impl Default for ConanConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_CONAN_EXECUTABLE.to_string(),
            resolve_remote_urls: true,
        }
    }
}

/// SBOM output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path (stdout if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Indent the JSON
    pub pretty: bool,
    /// Emit a random `serialNumber`
    pub serial_number: bool,
    /// Emit `metadata.timestamp`
    pub timestamp: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            pretty: true,
            serial_number: true,
            timestamp: true,
        }
    }
}

// ============================================================================
// Command Configuration
// ============================================================================

/// Where the resolved graph comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    /// Run `conan graph info` with these arguments
    Conan(GraphArgs),
    /// Read an existing graph JSON file (`-` for stdin)
    File(PathBuf),
}

impl GraphSource {
    /// Pick the graph source from the command line.
    ///
    /// A graph file excludes every graph-selection flag.
    pub fn from_args(graph_json: Option<PathBuf>, args: GraphArgs) -> Result<Self> {
        match graph_json {
            Some(path) if args.is_empty() => Ok(Self::File(path)),
            Some(_) => Err(SbomError::config(
                "--graph-json cannot be combined with graph selection arguments",
            )),
            None => {
                args.validate()?;
                Ok(Self::Conan(args))
            }
        }
    }
}

/// Configuration for the create-sbom command
#[derive(Debug, Clone)]
pub struct CreateSbomConfig {
    pub source: GraphSource,
    pub conan: ConanConfig,
    pub output: OutputConfig,
    /// Suppress progress logging
    pub quiet: bool,
}

impl CreateSbomConfig {
    /// Conversion options implied by the output settings
    #[must_use]
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            serial_number: self.output.serial_number,
            timestamp: self.output.timestamp,
            ..ConvertOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.conan.executable, "conan");
        assert!(config.conan.resolve_remote_urls);
        assert!(config.output.pretty);
        assert!(config.output.file.is_none());
    }

    #[test]
    fn test_graph_source_file() {
        let source =
            GraphSource::from_args(Some(PathBuf::from("graph.json")), GraphArgs::default())
                .unwrap();
        assert_eq!(source, GraphSource::File(PathBuf::from("graph.json")));
    }

    #[test]
    fn test_graph_source_file_conflicts_with_args() {
        let args = GraphArgs {
            requires: vec!["zlib/1.3".to_string()],
            ..Default::default()
        };
        assert!(GraphSource::from_args(Some(PathBuf::from("-")), args).is_err());
    }

    #[test]
    fn test_graph_source_conan_validates() {
        assert!(GraphSource::from_args(None, GraphArgs::default()).is_err());

        let args = GraphArgs {
            path: Some(PathBuf::from(".")),
            ..Default::default()
        };
        assert!(matches!(
            GraphSource::from_args(None, args),
            Ok(GraphSource::Conan(_))
        ));
    }

    #[test]
    fn test_convert_options_follow_output() {
        let config = CreateSbomConfig {
            source: GraphSource::File(PathBuf::from("-")),
            conan: ConanConfig::default(),
            output: OutputConfig {
                serial_number: false,
                ..Default::default()
            },
            quiet: true,
        };
        let options = config.convert_options();
        assert!(!options.serial_number);
        assert!(options.timestamp);
    }
}
