//! Discovery, loading and merging of `.conan-sbom.yaml` files.

use super::defaults::CONFIG_DIR_NAME;
use super::types::{AppConfig, ConfigOverrides};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Recognized config file names, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".conan-sbom.yaml",
    ".conan-sbom.yml",
    "conan-sbom.yaml",
    "conan-sbom.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/conan-sbom/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    search_dirs()
        .into_iter()
        .find_map(|dir| find_config_in_dir(&dir))
}

/// Directories searched for a config file, in priority order
#[must_use]
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(git_root) = find_git_root() {
        dirs.push(git_root);
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs.push(config_dir.join(CONFIG_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        dirs.push(home);
    }
    dirs
}

/// First recognized config file name present in `dir`
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Closest ancestor of the working directory that holds `.git`
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Why a config file could not be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load the config file named with `--config`, or discover one.
///
/// A file named explicitly has to load. A discovered file that fails to load
/// is skipped with a warning.
pub fn load_config(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    match explicit_path {
        Some(path) => load_config_file(path).map(|config| (config, Some(path.to_path_buf()))),
        None => Ok(load_or_default(None)),
    }
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Layer command-line settings over this config.
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(executable) = &overrides.executable {
            self.conan.executable.clone_from(executable);
        }
        if let Some(resolve) = overrides.resolve_remote_urls {
            self.conan.resolve_remote_urls = resolve;
        }

        if let Some(file) = &overrides.output_file {
            self.output.file = Some(file.clone());
        }
        if let Some(pretty) = overrides.pretty {
            self.output.pretty = pretty;
        }
        if let Some(serial_number) = overrides.serial_number {
            self.output.serial_number = serial_number;
        }
        if let Some(timestamp) = overrides.timestamp {
            self.output.timestamp = timestamp;
        }
    }

    /// Load from file and merge with CLI overrides.
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<(Self, Option<PathBuf>), ConfigFileError> {
        let (mut config, loaded_from) = load_config(config_path)?;
        config.merge(overrides);
        Ok((config, loaded_from))
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# conan-sbom configuration file
# ==============================
#
# Place it at:
#   - .conan-sbom.yaml in your project root
#   - ~/.config/conan-sbom/conan-sbom.yaml for global config
#
# CLI arguments always override file settings.

# Conan invocation
conan:
  # Name or path of the Conan executable (CONAN_SBOM_CONAN also sets it)
  executable: conan
  # Run `conan remote list` to add repository_url qualifiers to package URLs
  resolve_remote_urls: true

# SBOM output
output:
  # Output file path (omit for stdout)
  # file: sbom.cdx.json
  # Indent the JSON
  pretty: true
  # Emit a random serialNumber (disable for reproducible output)
  serial_number: true
  # Emit metadata.timestamp (disable for reproducible output)
  timestamp: true
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
