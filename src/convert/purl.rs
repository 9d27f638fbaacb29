//! Package URLs for Conan packages (`pkg:conan/...`).

use crate::error::{BomErrorKind, Result, SbomError};
use crate::graph::GraphNode;
use packageurl::PackageUrl;

const PURL_TYPE: &str = "conan";

/// Build the PURL of a graph node.
///
/// Qualifiers are only added when they carry a value; Conan's `_`
/// placeholder for user and channel counts as no value.
pub fn package_url(node: &GraphNode) -> Result<String> {
    let name = node.display_name();
    let invalid = |err: packageurl::Error| {
        SbomError::bom(
            "building package URL",
            BomErrorKind::InvalidPurl {
                name: name.to_string(),
                reason: err.to_string(),
            },
        )
    };

    let mut purl = PackageUrl::new(PURL_TYPE, name).map_err(invalid)?;
    if let Some(version) = present(node.version.as_deref()) {
        purl.with_version(version);
    }

    let repository_url = node.remote.as_ref().and_then(|r| r.url.as_deref());
    let qualifiers = [
        ("channel", conan_placeholder(node.channel.as_deref())),
        ("prev", present(node.prev.as_deref())),
        ("repository_url", present(repository_url)),
        ("rref", present(node.rrev.as_deref())),
        ("user", conan_placeholder(node.user.as_deref())),
    ];
    for (key, value) in qualifiers {
        if let Some(value) = value {
            purl.add_qualifier(key, value).map_err(invalid)?;
        }
    }

    Ok(purl.to_string())
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn conan_placeholder(value: Option<&str>) -> Option<&str> {
    present(value).filter(|v| *v != "_")
}
