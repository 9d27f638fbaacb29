//! conan-sbom: CycloneDX SBOMs from Conan dependency graphs
//!
//! Resolves a graph with `conan graph info` (or reads one that Conan already
//! wrote) and prints it as a CycloneDX 1.4 JSON document.

#![allow(
    clippy::struct_excessive_bools,
    clippy::needless_pass_by_value,
    clippy::large_enum_variant
)]

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use conan_sbom::{
    cli,
    config::{
        AppConfig, ConfigOverrides, CreateSbomConfig, GraphSource, Validatable,
        CONAN_EXECUTABLE_ENV, CONFIG_FILE_NAMES,
    },
    graph::GraphArgs,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "conan-sbom")]
#[command(version)]
#[command(about = "Generate CycloneDX SBOMs from Conan dependency graphs", long_about = None)]
#[command(after_help = "EXAMPLES:
    # SBOM of the recipe in the current directory
    conan-sbom create-sbom . --profile-host default > sbom.cdx.json

    # SBOM of a set of references, reproducible output
    conan-sbom create-sbom --requires zlib/1.3 --requires fmt/10.1.1 --no-serial-number --no-timestamp

    # Convert a graph Conan already computed
    conan graph info . --format=json > graph.json
    conan-sbom create-sbom --graph-json graph.json -O sbom.cdx.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `create-sbom` subcommand
#[derive(Parser)]
struct CreateSbomArgs {
    /// Path to a folder containing a recipe (conanfile.py or conanfile.txt) or to a recipe file
    path: Option<PathBuf>,

    /// Provide a package name if not specified in conanfile
    #[arg(long)]
    name: Option<String>,

    /// Provide a package version if not specified in conanfile
    #[arg(long)]
    version: Option<String>,

    /// Provide a user if not specified in conanfile
    #[arg(long)]
    user: Option<String>,

    /// Provide a channel if not specified in conanfile
    #[arg(long)]
    channel: Option<String>,

    /// Directly provide requires instead of a conanfile
    #[arg(long, value_name = "REF")]
    requires: Vec<String>,

    /// Directly provide tool-requires instead of a conanfile
    #[arg(long, value_name = "REF")]
    tool_requires: Vec<String>,

    /// Apply the specified profile (forwarded as --profile)
    #[arg(long)]
    profile: Vec<String>,

    /// Profile for the host context (forwarded as --profile:host)
    #[arg(long)]
    profile_host: Vec<String>,

    /// Profile for the build context (forwarded as --profile:build)
    #[arg(long)]
    profile_build: Vec<String>,

    /// Profile for both contexts (forwarded as --profile:all)
    #[arg(long)]
    profile_all: Vec<String>,

    /// Settings to build the package, overwriting the defaults, e.g. -s compiler=gcc
    #[arg(short = 's', long)]
    settings: Vec<String>,

    /// Settings for the host context
    #[arg(long)]
    settings_host: Vec<String>,

    /// Settings for the build context
    #[arg(long)]
    settings_build: Vec<String>,

    /// Options to build the package, e.g. -o pkg/*:with_qt=true
    #[arg(short = 'o', long)]
    options: Vec<String>,

    /// Options for the host context
    #[arg(long)]
    options_host: Vec<String>,

    /// Options for the build context
    #[arg(long)]
    options_build: Vec<String>,

    /// Configuration to build the package, e.g. -c tools.cmake.cmaketoolchain:generator=Xcode
    #[arg(short = 'c', long)]
    conf: Vec<String>,

    /// Configuration for the host context
    #[arg(long)]
    conf_host: Vec<String>,

    /// Configuration for the build context
    #[arg(long)]
    conf_build: Vec<String>,

    /// Path to a lockfile
    #[arg(short = 'l', long)]
    lockfile: Option<PathBuf>,

    /// Do not raise an error if some dependency is not found in the lockfile
    #[arg(long)]
    lockfile_partial: bool,

    /// Overwrite lockfile overrides
    #[arg(long)]
    lockfile_overrides: Option<String>,

    /// Look in the specified remote or remotes server
    #[arg(short = 'r', long = "remote", value_name = "NAME")]
    remotes: Vec<String>,

    /// Do not use remote, resolve exclusively in the cache
    #[arg(long)]
    no_remote: bool,

    /// Check updates exist from upstream remotes
    #[arg(short = 'u', long)]
    update: bool,

    /// Read the graph from a `conan graph info --format=json` file ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    graph_json: Option<PathBuf>,

    /// Conan executable to run
    #[arg(long, value_name = "EXE", env = CONAN_EXECUTABLE_ENV)]
    conan: Option<String>,

    /// Do not run `conan remote list` to resolve repository URLs
    #[arg(long)]
    no_resolve_remotes: bool,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Omit the random serialNumber
    #[arg(long)]
    no_serial_number: bool,

    /// Omit metadata.timestamp
    #[arg(long)]
    no_timestamp: bool,
}

impl CreateSbomArgs {
    /// Split into the graph file, the graph selection and the config overrides
    fn into_parts(self) -> (Option<PathBuf>, GraphArgs, ConfigOverrides) {
        let overrides = ConfigOverrides {
            executable: self.conan,
            resolve_remote_urls: self.no_resolve_remotes.then_some(false),
            output_file: self.output_file,
            pretty: self.compact.then_some(false),
            serial_number: self.no_serial_number.then_some(false),
            timestamp: self.no_timestamp.then_some(false),
        };

        let graph_args = GraphArgs {
            path: self.path,
            name: self.name,
            version: self.version,
            user: self.user,
            channel: self.channel,
            requires: self.requires,
            tool_requires: self.tool_requires,
            profile: self.profile,
            profile_host: self.profile_host,
            profile_build: self.profile_build,
            profile_all: self.profile_all,
            settings: self.settings,
            settings_host: self.settings_host,
            settings_build: self.settings_build,
            options: self.options,
            options_host: self.options_host,
            options_build: self.options_build,
            conf: self.conf,
            conf_host: self.conf_host,
            conf_build: self.conf_build,
            lockfile: self.lockfile,
            lockfile_partial: self.lockfile_partial,
            lockfile_overrides: self.lockfile_overrides,
            remotes: self.remotes,
            no_remote: self.no_remote,
            update: self.update,
        };

        (self.graph_json, graph_args, overrides)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a CycloneDX 1.4 SBOM of a Conan dependency graph
    #[command(alias = "create_sbom")]
    CreateSbom(CreateSbomArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print JSON Schema for the configuration file format
    ConfigSchema {
        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, locate or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where config files are searched for
    Path,
    /// Write a commented example config to the current directory
    Init,
}

fn init_logging(verbose: bool, quiet: bool) {
    let log_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    match cli.command {
        Commands::CreateSbom(args) => {
            run_create_sbom_command(args, cli.config.as_deref(), cli.quiet)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "conan-sbom", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = conan_sbom::config::generate_json_schema()
                .context("failed to serialize config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = conan_sbom::config::load_config(cli.config.as_deref())
                    .with_context(|| match &cli.config {
                        Some(path) => format!("failed to load config file {}", path.display()),
                        None => "failed to load config file".to_string(),
                    })?;
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for dir in conan_sbom::config::search_dirs() {
                    eprintln!("  {}", dir.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match conan_sbom::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(CONFIG_FILE_NAMES[0]);
                if target.exists() {
                    bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = conan_sbom::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}

fn run_create_sbom_command(
    args: CreateSbomArgs,
    config_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let (graph_json, graph_args, overrides) = args.into_parts();

    let (app_config, loaded_from) = AppConfig::from_file_with_overrides(config_path, &overrides)
        .with_context(|| match config_path {
            Some(path) => format!("failed to load config file {}", path.display()),
            None => "failed to load config file".to_string(),
        })?;
    if let Some(path) = &loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }

    let errors = app_config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }

    let source = GraphSource::from_args(graph_json, graph_args)?;

    cli::run_create_sbom(CreateSbomConfig {
        source,
        conan: app_config.conan,
        output: app_config.output,
        quiet,
    })
}
