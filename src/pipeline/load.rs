//! Graph loading with context for error messages.

use crate::graph::{ConanGraph, GraphLoader, RemoteIndex};
use anyhow::{Context, Result};

/// Load the resolved graph from `loader`, logging what was found
pub fn load_graph_with_context(loader: &dyn GraphLoader, quiet: bool) -> Result<ConanGraph> {
    let source = loader.source_name();
    if !quiet {
        tracing::info!("Loading dependency graph from {}", source);
    }

    let graph = loader
        .load_graph()
        .with_context(|| format!("Failed to load dependency graph from {source}"))?;

    if !quiet {
        tracing::info!(
            "Loaded graph with {} nodes and {} direct edges",
            graph.len(),
            graph.edge_count()
        );
    }
    Ok(graph)
}

/// Fill in remote URLs for nodes that only name their remote.
///
/// Failing to list remotes is not fatal: the affected PURLs simply go
/// without a `repository_url` qualifier.
pub fn resolve_remote_urls(graph: &mut ConanGraph, index: &dyn RemoteIndex) -> usize {
    let wanted = graph.remote_names();
    if wanted.is_empty() {
        return 0;
    }

    match index.remote_urls() {
        Ok(urls) => {
            for name in wanted.iter().filter(|n| !urls.contains_key(*n)) {
                tracing::warn!("Remote '{}' is not configured; no repository_url for its packages", name);
            }
            let updated = graph.apply_remote_urls(&urls);
            tracing::debug!("Resolved remote URLs for {} nodes", updated);
            updated
        }
        Err(err) => {
            tracing::warn!("Could not list Conan remotes, skipping repository_url: {}", err);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConanErrorKind, SbomError};
    use std::collections::HashMap;

    const GRAPH: &str = r#"{"graph": {"nodes": {
        "0": {"ref": "conanfile", "dependencies": {"1": {"ref": "zlib/1.3", "direct": true}}},
        "1": {"ref": "zlib/1.3", "name": "zlib", "version": "1.3", "remote": "conancenter"}
    }}}"#;

    struct StaticLoader;

    impl GraphLoader for StaticLoader {
        fn source_name(&self) -> String {
            "static".to_string()
        }

        fn load_graph(&self) -> crate::Result<ConanGraph> {
            ConanGraph::from_json_str(GRAPH)
        }
    }

    struct FailingLoader;

    impl GraphLoader for FailingLoader {
        fn source_name(&self) -> String {
            "broken".to_string()
        }

        fn load_graph(&self) -> crate::Result<ConanGraph> {
            ConanGraph::from_json_str("{")
        }
    }

    struct Remotes(Option<HashMap<String, String>>);

    impl RemoteIndex for Remotes {
        fn remote_urls(&self) -> crate::Result<HashMap<String, String>> {
            self.0.clone().ok_or_else(|| {
                SbomError::conan(
                    "listing remotes",
                    ConanErrorKind::NotFound("conan".to_string()),
                )
            })
        }
    }

    #[test]
    fn test_load_graph_with_context() {
        let graph = load_graph_with_context(&StaticLoader, true).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_load_failure_names_source() {
        let err = load_graph_with_context(&FailingLoader, true).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_resolve_remote_urls() {
        let mut graph = StaticLoader.load_graph().unwrap();
        let mut urls = HashMap::new();
        urls.insert(
            "conancenter".to_string(),
            "https://center2.conan.io".to_string(),
        );

        assert_eq!(resolve_remote_urls(&mut graph, &Remotes(Some(urls))), 1);
        assert!(graph.remote_names().is_empty());
    }

    #[test]
    fn test_remote_listing_failure_is_not_fatal() {
        let mut graph = StaticLoader.load_graph().unwrap();
        assert_eq!(resolve_remote_urls(&mut graph, &Remotes(None)), 0);
        assert_eq!(graph.remote_names(), vec!["conancenter".to_string()]);
    }
}
