//! Checks run on a BOM before it is written out.
//!
//! [`validate_bom`] first applies the structural rules consumers rely on
//! (unique `bom-ref`s, resolvable dependency refs, well-formed PURLs and
//! URLs). A structurally sound document is then read back with the
//! `cyclonedx-bom` 1.4 reader and run through its 1.4 validators.

use super::model::{Bom, Component, LicenseChoice, BOM_FORMAT, SPEC_VERSION};
use cyclonedx_bom::models::bom::{Bom as CycloneDxBom, SpecVersion};
use cyclonedx_bom::validation::Validate;
use packageurl::PackageUrl;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A single problem found in a BOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON-pointer-like location, e.g. `components[3].purl`
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of [`validate_bom`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Check a BOM against the structural rules and the CycloneDX 1.4 schema.
#[must_use]
pub fn validate_bom(bom: &Bom) -> ValidationReport {
    let mut report = ValidationReport::default();

    if bom.bom_format != BOM_FORMAT {
        report.push(
            "bomFormat",
            format!("expected '{BOM_FORMAT}', found '{}'", bom.bom_format),
        );
    }
    if bom.spec_version != SPEC_VERSION {
        report.push(
            "specVersion",
            format!("expected '{SPEC_VERSION}', found '{}'", bom.spec_version),
        );
    }

    let mut refs: HashSet<&str> = HashSet::new();

    match bom.main_component() {
        Some(component) => check_component(component, "metadata.component", &mut refs, &mut report),
        None => report.push("metadata.component", "missing"),
    }
    for (i, component) in bom.components.iter().enumerate() {
        check_component(component, &format!("components[{i}]"), &mut refs, &mut report);
    }

    for (i, dependency) in bom.dependencies.iter().enumerate() {
        if !refs.contains(dependency.dependency_ref.as_str()) {
            report.push(
                format!("dependencies[{i}].ref"),
                format!("unknown bom-ref '{}'", dependency.dependency_ref),
            );
        }
        for (j, target) in dependency.depends_on.iter().enumerate() {
            if !refs.contains(target.as_str()) {
                report.push(
                    format!("dependencies[{i}].dependsOn[{j}]"),
                    format!("unknown bom-ref '{target}'"),
                );
            }
        }
    }

    if report.passed() {
        report.issues.extend(validate_schema(bom).issues);
    }
    report
}

/// Read the serialized BOM back with the `cyclonedx-bom` 1.4 reader and run
/// its 1.4 validators over it.
#[must_use]
pub fn validate_schema(bom: &Bom) -> ValidationReport {
    let mut report = ValidationReport::default();

    let document = match schema_document(bom) {
        Ok(document) => document,
        Err(err) => {
            report.push("$", format!("cannot serialize BOM: {err}"));
            return report;
        }
    };

    match CycloneDxBom::parse_from_json_v1_4(document.as_slice()) {
        Ok(parsed) => {
            let result = parsed.validate_version(SpecVersion::V1_4);
            if !result.passed() {
                report.push("$", format!("CycloneDX 1.4 validation failed: {result:?}"));
            }
        }
        Err(err) => report.push("$", format!("not a CycloneDX 1.4 document: {err}")),
    }

    report
}

/// JSON handed to the 1.4 reader.
///
/// `$schema` is not part of the reader's model, and it expects `dependsOn`
/// on every dependency entry.
fn schema_document(bom: &Bom) -> serde_json::Result<Vec<u8>> {
    let mut value = serde_json::to_value(bom)?;
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        if let Some(dependencies) = object
            .get_mut("dependencies")
            .and_then(Value::as_array_mut)
        {
            for entry in dependencies.iter_mut().filter_map(Value::as_object_mut) {
                entry
                    .entry("dependsOn")
                    .or_insert_with(|| Value::Array(Vec::new()));
            }
        }
    }
    serde_json::to_vec(&value)
}

/// Whether `text` is an RFC 3986 URI reference.
///
/// Only unreserved and reserved characters are allowed, plus complete
/// percent-encoded octets. Whitespace, angle brackets and non-ASCII text
/// must be percent-encoded first.
#[must_use]
pub fn is_uri_reference(text: &str) -> bool {
    const ALLOWED: &str = "-._~:/?#[]@!$&'()*+,;=";

    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let octet = chars.next().zip(chars.next());
            if !matches!(octet, Some((hi, lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
            {
                return false;
            }
        } else if !(c.is_ascii_alphanumeric() || ALLOWED.contains(c)) {
            return false;
        }
    }
    !text.is_empty()
}

fn check_component<'a>(
    component: &'a Component,
    path: &str,
    refs: &mut HashSet<&'a str>,
    report: &mut ValidationReport,
) {
    if component.bom_ref.trim().is_empty() {
        report.push(format!("{path}.bom-ref"), "empty");
    } else if !refs.insert(component.bom_ref.as_str()) {
        report.push(
            format!("{path}.bom-ref"),
            format!("duplicate bom-ref '{}'", component.bom_ref),
        );
    }

    if component.name.trim().is_empty() {
        report.push(format!("{path}.name"), "empty");
    }

    for (i, choice) in component.licenses.iter().enumerate() {
        let valid = match choice {
            LicenseChoice::License(license) => license.id.is_some() != license.name.is_some(),
            LicenseChoice::Expression(expr) => !expr.trim().is_empty(),
        };
        if !valid {
            report.push(
                format!("{path}.licenses[{i}]"),
                "must carry exactly one of id, name or expression",
            );
        }
    }

    if let Some(purl) = &component.purl {
        if let Err(err) = PackageUrl::from_str(purl) {
            report.push(format!("{path}.purl"), format!("invalid package URL: {err}"));
        }
    }

    for (i, reference) in component.external_references.iter().enumerate() {
        if !is_uri_reference(&reference.url) {
            report.push(
                format!("{path}.externalReferences[{i}].url"),
                format!("not a URI reference: '{}'", reference.url),
            );
        }
    }
}
