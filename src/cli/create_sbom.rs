//! Create-sbom command handler.
//!
//! Implements the `create-sbom` subcommand: resolve (or read) the Conan
//! dependency graph and write it out as a CycloneDX 1.4 SBOM.

use crate::config::{CreateSbomConfig, GraphSource};
use crate::convert::graph_to_bom;
use crate::cyclonedx::Bom;
use crate::graph::{ConanCli, GraphArgs, GraphFile, GraphLoader};
use crate::pipeline::{
    load_graph_with_context, resolve_remote_urls, serialize_bom, write_output, OutputTarget,
};
use anyhow::{Context, Result};

/// Run the create-sbom command
pub fn run_create_sbom(config: CreateSbomConfig) -> Result<()> {
    let bom = build_sbom(&config)?;

    let json = serialize_bom(&bom, config.output.pretty)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&json, &target, config.quiet)
}

/// Resolve the graph and convert it, without writing anything
pub fn build_sbom(config: &CreateSbomConfig) -> Result<Bom> {
    let conan = match &config.source {
        GraphSource::Conan(args) => ConanCli::new(&config.conan.executable, args.clone()),
        GraphSource::File(_) => ConanCli::new(&config.conan.executable, GraphArgs::default()),
    };
    let loader: Box<dyn GraphLoader> = match &config.source {
        GraphSource::Conan(_) => Box::new(conan.clone()),
        GraphSource::File(path) => Box::new(GraphFile::from_arg(path)),
    };

    let mut graph = load_graph_with_context(loader.as_ref(), config.quiet)?;

    if config.conan.resolve_remote_urls {
        resolve_remote_urls(&mut graph, &conan);
    }

    let bom = graph_to_bom(&graph, &config.convert_options())
        .context("Failed to convert dependency graph to CycloneDX")?;

    if !config.quiet {
        tracing::info!(
            "Generated CycloneDX {} SBOM with {} components",
            bom.spec_version,
            bom.components.len() + 1
        );
    }
    Ok(bom)
}
