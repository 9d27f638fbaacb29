//! Output handling for generated BOMs.

use crate::cyclonedx::Bom;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }
}

/// Serialize a BOM, pretty-printed unless `compact` output was asked for
pub fn serialize_bom(bom: &Bom, pretty: bool) -> Result<String> {
    bom.to_json(pretty).context("Failed to serialize BOM")
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}").context("Failed to write BOM to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
            Ok(())
        }
        OutputTarget::File(path) => {
            let mut content = content.to_string();
            if !content.ends_with('\n') {
                content.push('\n');
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {:?}", path))?;
            if !quiet {
                tracing::info!("SBOM written to {:?}", path);
            }
            Ok(())
        }
    }
}
