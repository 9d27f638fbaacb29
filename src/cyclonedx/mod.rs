//! CycloneDX 1.4 output model and its validation.
//!
//! Documents are authored with the serde model in [`model`]. Schema-level
//! checks are delegated to the `cyclonedx-bom` crate's 1.4 validators.

pub mod model;
pub mod validation;

pub use model::{
    Bom, Classification, Component, Dependency, ExternalReference, ExternalReferenceType,
    License, LicenseChoice, Metadata, Property, Tool, SCHEMA_URL, SPEC_VERSION,
};
pub use validation::{validate_bom, validate_schema, ValidationIssue, ValidationReport};
