//! Sources a resolved dependency graph can come from.
//!
//! The converter only sees a [`ConanGraph`]; whether it came from a live
//! `conan graph info` run or from a JSON file is decided here.

use super::args::GraphArgs;
use super::model::ConanGraph;
use crate::error::{ConanErrorKind, ErrorContext, GraphErrorKind, Result, SbomError};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Something that can hand over a resolved graph
pub trait GraphLoader {
    /// Short description of the source, used in log and error messages
    fn source_name(&self) -> String;

    /// Produce the resolved graph
    fn load_graph(&self) -> Result<ConanGraph>;
}

/// Something that knows the URLs of configured Conan remotes
pub trait RemoteIndex {
    /// Map of remote name to remote URL
    fn remote_urls(&self) -> Result<HashMap<String, String>>;
}

/// Runs the Conan executable to resolve the graph
#[derive(Debug, Clone)]
pub struct ConanCli {
    executable: PathBuf,
    args: GraphArgs,
}

impl ConanCli {
    /// Create a runner for `executable` (a name looked up on `PATH`, or a path)
    pub fn new(executable: impl Into<PathBuf>, args: GraphArgs) -> Self {
        Self {
            executable: executable.into(),
            args,
        }
    }

    fn display_command(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.executable.display().to_string()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn run(&self, args: &[OsString]) -> Result<Output> {
        let command = self.display_command(args);
        tracing::debug!("Running `{}`", command);

        let mut cmd = Command::new(&self.executable);
        cmd.args(args).stdin(Stdio::null());

        cmd.output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SbomError::conan(
                    command,
                    ConanErrorKind::NotFound(self.executable.display().to_string()),
                )
            } else {
                SbomError::io(&self.executable, err)
            }
        })
    }
}

impl GraphLoader for ConanCli {
    fn source_name(&self) -> String {
        format!("{} graph info", self.executable.display())
    }

    fn load_graph(&self) -> Result<ConanGraph> {
        self.args.validate()?;

        let args = self.args.to_conan_args();
        let command = self.display_command(&args);
        let output = self.run(&args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // A failed resolution still prints the partial graph carrying the error
            if let Err(err) = ConanGraph::from_json_str(&stdout) {
                if matches!(
                    err,
                    SbomError::Graph {
                        source: GraphErrorKind::Unresolved(_),
                        ..
                    }
                ) {
                    return Err(err).context(command);
                }
            }
            return Err(SbomError::conan(
                "resolving dependency graph",
                ConanErrorKind::CommandFailed {
                    command,
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
            ));
        }

        if stdout.trim().is_empty() {
            return Err(SbomError::conan(
                "resolving dependency graph",
                ConanErrorKind::InvalidOutput {
                    command,
                    message: "no graph JSON on stdout".to_string(),
                },
            ));
        }

        ConanGraph::from_json_str(&stdout).with_context(|| format!("output of `{command}`"))
    }
}

#[derive(Deserialize)]
struct RemoteEntry {
    name: String,
    url: String,
}

impl RemoteIndex for ConanCli {
    fn remote_urls(&self) -> Result<HashMap<String, String>> {
        let args: Vec<OsString> = vec!["remote".into(), "list".into(), "--format=json".into()];
        let command = self.display_command(&args);
        let output = self.run(&args)?;

        if !output.status.success() {
            return Err(SbomError::conan(
                "listing remotes",
                ConanErrorKind::CommandFailed {
                    command,
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
            ));
        }

        let remotes: Vec<RemoteEntry> =
            serde_json::from_slice(&output.stdout).map_err(|err| {
                SbomError::conan(
                    "listing remotes",
                    ConanErrorKind::InvalidOutput {
                        command,
                        message: err.to_string(),
                    },
                )
            })?;

        Ok(remotes.into_iter().map(|r| (r.name, r.url)).collect())
    }
}

/// Reads a graph previously written by `conan graph info --format=json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphFile {
    Path(PathBuf),
    Stdin,
}

impl GraphFile {
    /// `-` selects stdin, anything else is a file path
    pub fn from_arg(arg: impl Into<PathBuf>) -> Self {
        let path = arg.into();
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::Path(path)
        }
    }
}

impl GraphLoader for GraphFile {
    fn source_name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_string(),
        }
    }

    fn load_graph(&self) -> Result<ConanGraph> {
        let content = match self {
            Self::Path(path) => {
                std::fs::read_to_string(path).map_err(|err| SbomError::io(path, err))?
            }
            Self::Stdin => {
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .context("reading graph from stdin")?;
                content
            }
        };

        ConanGraph::from_json_str(&content).with_context(|| self.source_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GRAPH: &str = r#"{"graph": {"nodes": {
        "0": {"ref": "conanfile", "label": "conanfile.txt", "dependencies": {"1": {"ref": "zlib/1.3", "direct": true}}},
        "1": {"ref": "zlib/1.3", "name": "zlib", "version": "1.3", "dependencies": {}}
    }, "root": {"0": "conanfile.txt"}}}"#;

    #[test]
    fn test_graph_file_from_arg() {
        assert_eq!(GraphFile::from_arg("-"), GraphFile::Stdin);
        assert_eq!(
            GraphFile::from_arg("graph.json"),
            GraphFile::Path(PathBuf::from("graph.json"))
        );
    }

    #[test]
    fn test_graph_file_loads() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(GRAPH.as_bytes()).unwrap();

        let loader = GraphFile::from_arg(file.path());
        let graph = loader.load_graph().unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_graph_file_missing() {
        let loader = GraphFile::from_arg("/nonexistent/graph.json");
        let err = loader.load_graph().unwrap_err();
        assert!(matches!(err, SbomError::Io { .. }));
    }

    #[test]
    fn test_graph_file_error_names_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"nodes\": []}").unwrap();

        let loader = GraphFile::from_arg(file.path());
        let err = loader.load_graph().unwrap_err();
        assert!(err.to_string().contains(&loader.source_name()));
    }

    #[test]
    fn test_missing_executable() {
        let cli = ConanCli::new(
            "/nonexistent/bin/conan",
            GraphArgs {
                requires: vec!["zlib/1.3".to_string()],
                ..Default::default()
            },
        );
        let err = cli.load_graph().unwrap_err();
        assert!(matches!(
            err,
            SbomError::Conan {
                source: ConanErrorKind::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_args_fail_before_spawning() {
        let cli = ConanCli::new("/nonexistent/bin/conan", GraphArgs::default());
        let err = cli.load_graph().unwrap_err();
        assert!(matches!(err, SbomError::Config(_)));
    }

    #[test]
    fn test_source_name() {
        let cli = ConanCli::new("conan", GraphArgs::default());
        assert_eq!(cli.source_name(), "conan graph info");
        assert_eq!(GraphFile::Stdin.source_name(), "<stdin>");
    }
}
