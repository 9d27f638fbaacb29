//! Default values shared by the config types and the CLI.

/// Conan executable looked up on `PATH` when nothing else is configured
pub const DEFAULT_CONAN_EXECUTABLE: &str = "conan";

/// Environment variable that overrides the Conan executable
pub const CONAN_EXECUTABLE_ENV: &str = "CONAN_SBOM_CONAN";

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "conan-sbom";
