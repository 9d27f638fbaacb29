//! Configuration module for conan-sbom.
//!
//! - YAML config file discovery and loading
//! - CLI argument merging
//! - Validation and JSON Schema generation
//!
//! # Configuration File
//!
//! Place a `.conan-sbom.yaml` file in your project root or `~/.config/conan-sbom/`:
//!
//! ```yaml
//! conan:
//!   executable: /opt/conan/bin/conan
//! output:
//!   serial_number: false
//!   timestamp: false
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{CONAN_EXECUTABLE_ENV, CONFIG_DIR_NAME, DEFAULT_CONAN_EXECUTABLE};
pub use types::{
    AppConfig, ConanConfig, ConfigOverrides, CreateSbomConfig, GraphSource, OutputConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_full_example_config, load_config, load_config_file,
    load_or_default, search_dirs, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `.conan-sbom.yaml` files.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema().unwrap();
        let value: serde_json::Value = serde_json::from_str(&schema).unwrap();
        let properties = &value["properties"];
        assert!(properties.get("conan").is_some());
        assert!(properties.get("output").is_some());
    }
}
