//! Conan dependency graph data structures.
//!
//! Mirrors the JSON that `conan graph info --format=json` (and
//! `conan create --format=json`) prints. Only the fields the SBOM needs are
//! modelled; everything else in a node is ignored during deserialization.

use crate::error::{ErrorContext, GraphErrorKind, Result, SbomError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// A resolved Conan dependency graph.
///
/// Nodes keep the order Conan emitted them in, which puts the root first.
#[derive(Debug, Clone)]
pub struct ConanGraph {
    nodes: IndexMap<String, GraphNode>,
    root_id: String,
}

impl ConanGraph {
    /// Build a graph from already-deserialized nodes.
    ///
    /// Fails if the root is missing or if any dependency points at a node
    /// that is not part of the graph.
    pub fn new(nodes: IndexMap<String, GraphNode>, root_id: impl Into<String>) -> Result<Self> {
        let root_id = root_id.into();
        if !nodes.contains_key(&root_id) {
            return Err(SbomError::graph(
                "locating root node",
                GraphErrorKind::MissingRoot(root_id),
            ));
        }

        for (id, node) in &nodes {
            for dep_id in node.dependencies.keys() {
                if !nodes.contains_key(dep_id) {
                    return Err(SbomError::graph(
                        "checking dependency edges",
                        GraphErrorKind::UnknownNode {
                            from: id.clone(),
                            to: dep_id.clone(),
                        },
                    ));
                }
            }
        }

        Ok(Self { nodes, root_id })
    }

    /// Parse the JSON printed by `conan graph info --format=json`.
    ///
    /// Accepts both the `{"graph": {...}}` document and the bare graph object.
    /// A graph that Conan marked with a resolution error is rejected.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut document: serde_json::Value = serde_json::from_str(content)?;
        let raw = match document.get_mut("graph").map(serde_json::Value::take) {
            Some(graph) => graph,
            None => document,
        };
        let raw: RawGraph = serde_json::from_value(raw).context("decoding graph nodes")?;

        if let Some(error) = raw.error.as_ref().and_then(describe_error) {
            return Err(SbomError::graph(
                "graph reported by Conan",
                GraphErrorKind::Unresolved(error),
            ));
        }

        let root_id = raw
            .root
            .keys()
            .next()
            .cloned()
            .or_else(|| raw.nodes.keys().next().cloned())
            .unwrap_or_else(|| "0".to_string());

        let nodes = raw
            .nodes
            .into_iter()
            .map(|(id, mut node)| {
                node.id.clone_from(&id);
                (id, node)
            })
            .collect();

        Self::new(nodes, root_id)
    }

    /// The root node (the consumer conanfile or the virtual `cli` node)
    #[must_use]
    pub fn root(&self) -> &GraphNode {
        // presence is checked in `new`
        &self.nodes[&self.root_id]
    }

    /// Id of the root node
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Look up a node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// All nodes in graph order, root included
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All nodes except the root, in graph order
    pub fn non_root_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values().filter(move |n| n.id != self.root_id)
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always has its root, so this is only true for hand-built graphs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that `node` declares as direct dependencies.
    ///
    /// Conan lists the whole transitive closure under `dependencies`; the
    /// `direct` flag tells declared edges apart from inherited ones.
    pub fn direct_dependencies<'a>(
        &'a self,
        node: &'a GraphNode,
    ) -> impl Iterator<Item = &'a GraphNode> + 'a {
        node.dependencies
            .iter()
            .filter(|(_, info)| info.is_direct())
            .filter_map(move |(id, _)| self.nodes.get(id))
    }

    /// Total number of direct edges in the graph
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes
            .values()
            .map(|n| n.dependencies.values().filter(|d| d.is_direct()).count())
            .sum()
    }

    /// Names of remotes referenced by nodes that carry no URL yet
    #[must_use]
    pub fn remote_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .nodes
            .values()
            .filter_map(|n| n.remote.as_ref())
            .filter(|r| r.url.is_none())
            .map(|r| r.name.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Fill in remote URLs from a name → URL map.
    ///
    /// Returns the number of nodes that were updated.
    pub fn apply_remote_urls(&mut self, urls: &HashMap<String, String>) -> usize {
        let mut updated = 0;
        for node in self.nodes.values_mut() {
            if let Some(remote) = node.remote.as_mut() {
                if remote.url.is_none() {
                    if let Some(url) = urls.get(&remote.name) {
                        remote.url = Some(url.clone());
                        updated += 1;
                    }
                }
            }
        }
        updated
    }
}

/// Turn Conan's `error` field into a message, treating null/empty as "no error"
fn describe_error(error: &serde_json::Value) -> Option<String> {
    match error {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    nodes: IndexMap<String, GraphNode>,
    #[serde(default)]
    root: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// One resolved package in the graph
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphNode {
    /// Node id, taken from the key of the `nodes` map
    #[serde(skip)]
    pub id: String,
    /// Full reference, e.g. `zlib/1.3#<rrev>`; `conanfile` or `cli` for the root
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub user: Option<String>,
    pub channel: Option<String>,
    pub license: Option<LicenseField>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub author: Option<String>,
    pub package_type: Option<String>,
    /// Recipe revision
    pub rrev: Option<String>,
    /// Package revision
    pub prev: Option<String>,
    pub remote: Option<Remote>,
    /// `host` or `build`
    pub context: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencyInfo>,
}

impl GraphNode {
    /// Name used for the SBOM component.
    ///
    /// Consumer conanfiles and the virtual `cli` root often have no name, so
    /// fall back to the label Conan shows for them.
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.label.as_deref()))
            .or_else(|| non_blank(self.reference.as_deref()))
            .unwrap_or("conanfile")
    }

    /// Whether the node was resolved in the build context (tool requires)
    #[must_use]
    pub fn is_build_context(&self) -> bool {
        self.context.as_deref() == Some("build")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The `license` attribute of a recipe: a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    Single(String),
    Multiple(Vec<String>),
}

impl LicenseField {
    /// All declared license strings, in declaration order
    #[must_use]
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Remote a package was resolved from.
///
/// Conan 2 only prints the remote name; the URL is filled in later from
/// `conan remote list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRemote")]
pub struct Remote {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRemote {
    Name(String),
    Detailed { name: String, url: Option<String> },
}

impl From<RawRemote> for Remote {
    fn from(raw: RawRemote) -> Self {
        match raw {
            RawRemote::Name(name) => Self { name, url: None },
            RawRemote::Detailed { name, url } => Self { name, url },
        }
    }
}

/// Requirement traits attached to an edge.
///
/// Only `direct` matters for the SBOM. Conan versions disagree on how trait
/// flags are printed (JSON booleans or Python-style `"True"`/`"False"`
/// strings), so the flag is read leniently and anything unrecognised counts
/// as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyInfo {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub direct: Option<bool>,
}

impl DependencyInfo {
    /// Entries without a `direct` flag are treated as declared edges
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.direct.unwrap_or(true)
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(flag) => Some(flag),
        serde_json::Value::String(text) => match text.trim() {
            "True" | "true" => Some(true),
            "False" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
