//! Conversion of a resolved Conan graph into a CycloneDX BOM.
//!
//! The graph is walked once. Every node becomes one component (the root goes
//! into `metadata.component`), and every node's direct edges become one entry
//! of the `dependencies` array.

mod license;
mod purl;

pub use license::{license_choice, licenses};
pub use purl::package_url;

use crate::cyclonedx::validation::is_uri_reference;
use crate::cyclonedx::{
    validate_bom, Bom, Classification, Component, Dependency, ExternalReference,
    ExternalReferenceType, Metadata, Property, Tool,
};
use crate::error::{ErrorContext, Result, SbomError};
use crate::graph::{ConanGraph, GraphNode};
use chrono::{SecondsFormat, Utc};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Property set on components resolved in the build context
pub const CONTEXT_PROPERTY: &str = "conan:context";

/// Knobs for [`graph_to_bom`]
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Emit `serialNumber`. A random serial number makes the output
    /// non-reproducible, so it can be turned off.
    pub serial_number: bool,
    /// Emit `metadata.timestamp`
    pub timestamp: bool,
    /// Entry written to `metadata.tools`
    pub tool: Tool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            serial_number: true,
            timestamp: true,
            tool: Tool {
                vendor: None,
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
        }
    }
}

impl ConvertOptions {
    /// Options for byte-for-byte reproducible output
    #[must_use]
    pub fn reproducible() -> Self {
        Self {
            serial_number: false,
            timestamp: false,
            ..Self::default()
        }
    }
}

/// Only the `application` package type maps to an application component.
#[must_use]
pub fn package_type_to_component_type(package_type: Option<&str>) -> Classification {
    match package_type {
        Some("application") => Classification::Application,
        _ => Classification::Library,
    }
}

/// Build the component for one graph node.
pub fn create_component(node: &GraphNode) -> Result<Component> {
    let purl = package_url(node)?;
    let mut component = Component::new(
        package_type_to_component_type(node.package_type.as_deref()),
        single_line(node.display_name()),
        purl.clone(),
    );

    component.author = non_blank(node.author.as_deref());
    component.version = non_blank(node.version.as_deref());
    component.description = non_blank(node.description.as_deref());
    component.licenses = licenses(node.license.as_ref());
    component.purl = Some(purl);

    if let Some(url) = non_blank(node.homepage.as_deref()).and_then(|h| website_url(&h)) {
        component.external_references.push(ExternalReference {
            reference_type: ExternalReferenceType::Website,
            url,
            comment: None,
        });
    }

    if node.is_build_context() {
        component
            .properties
            .push(Property::new(CONTEXT_PROPERTY, "build"));
    }

    Ok(component)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(single_line)
}

/// Fold line breaks and tabs into spaces.
///
/// CycloneDX names, versions and descriptions are normalized strings.
pub(crate) fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n', '\t'], " ")
}

/// The recipe homepage as the URL of a `website` reference.
///
/// Absolute URLs are kept, percent-encoded where needed. Anything that does
/// not parse as a URL is dropped.
fn website_url(homepage: &str) -> Option<String> {
    match Url::parse(homepage) {
        Ok(_) if is_uri_reference(homepage) => Some(homepage.to_string()),
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            tracing::warn!("Ignoring homepage '{}': {}", homepage, err);
            None
        }
    }
}

/// Hands out unique `bom-ref`s, remembering which node got which
#[derive(Default)]
struct BomRefs<'g> {
    by_node: HashMap<&'g str, String>,
    taken: HashSet<String>,
}

impl<'g> BomRefs<'g> {
    fn assign(&mut self, node: &'g GraphNode, mut component: Component) -> Component {
        if self.taken.contains(&component.bom_ref) {
            component.bom_ref = format!("{}#node-{}", component.bom_ref, node.id);
        }
        self.taken.insert(component.bom_ref.clone());
        self.by_node
            .insert(node.id.as_str(), component.bom_ref.clone());
        component
    }

    fn get(&self, node_id: &str) -> Option<&String> {
        self.by_node.get(node_id)
    }
}

/// Convert a resolved graph into a validated CycloneDX BOM.
pub fn graph_to_bom(graph: &ConanGraph, options: &ConvertOptions) -> Result<Bom> {
    let mut refs = BomRefs::default();

    let root_node = graph.root();
    let root = create_component(root_node).context("converting root node")?;
    let root = refs.assign(root_node, root);

    let components = graph
        .non_root_nodes()
        .map(|node| {
            let component = create_component(node)
                .with_context(|| format!("converting node {}", node.id))?;
            Ok(refs.assign(node, component))
        })
        .collect::<Result<Vec<_>>>()?;

    let dependencies = graph
        .nodes()
        .filter_map(|node| {
            let dependency_ref = refs.get(&node.id)?.clone();
            let depends_on: IndexSet<String> = graph
                .direct_dependencies(node)
                .filter_map(|dep| refs.get(&dep.id).cloned())
                .collect();
            Some(Dependency {
                dependency_ref,
                depends_on: depends_on.into_iter().collect(),
            })
        })
        .collect();

    let bom = Bom {
        serial_number: options
            .serial_number
            .then(|| format!("urn:uuid:{}", uuid::Uuid::new_v4())),
        metadata: Some(Metadata {
            timestamp: options
                .timestamp
                .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            tools: vec![options.tool.clone()],
            component: Some(root),
        }),
        components,
        dependencies,
        ..Bom::default()
    };

    tracing::debug!(
        "Converted {} nodes into {} components and {} dependency entries",
        graph.len(),
        bom.components.len() + 1,
        bom.dependencies.len()
    );

    let report = validate_bom(&bom);
    if !report.passed() {
        return Err(SbomError::validation(format!(
            "generated BOM is invalid: {report}"
        )));
    }

    Ok(bom)
}
