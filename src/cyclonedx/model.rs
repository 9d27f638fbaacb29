//! CycloneDX 1.4 JSON object model.
//!
//! Field order follows the 1.4 JSON schema so generated documents read the
//! same way as those of other CycloneDX producers.

use crate::error::{BomErrorKind, Result, SbomError};
use serde::{Deserialize, Serialize};

/// Spec version written to every BOM
pub const SPEC_VERSION: &str = "1.4";

/// JSON schema the BOM conforms to
pub const SCHEMA_URL: &str = "http://cyclonedx.org/schema/bom-1.4.schema.json";

/// Value of `bomFormat`
pub const BOM_FORMAT: &str = "CycloneDX";

/// A CycloneDX bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Always "CycloneDX"
    pub bom_format: String,

    pub spec_version: String,

    /// `urn:uuid:<v4>`; omitted for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    /// Revision of this BOM, starting at 1
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Default for Bom {
    fn default() -> Self {
        Self {
            schema: Some(SCHEMA_URL.to_string()),
            bom_format: BOM_FORMAT.to_string(),
            spec_version: SPEC_VERSION.to_string(),
            serial_number: None,
            version: 1,
            metadata: None,
            components: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

impl Bom {
    /// Serialize to JSON, indented when `pretty` is set
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|err| {
            SbomError::bom("serializing BOM", BomErrorKind::Serialization(err.to_string()))
        })
    }

    /// The component describing what the BOM is about
    #[must_use]
    pub fn main_component(&self) -> Option<&Component> {
        self.metadata.as_ref().and_then(|m| m.component.as_ref())
    }

    /// The metadata component followed by every listed component
    pub fn all_components(&self) -> impl Iterator<Item = &Component> {
        self.main_component().into_iter().chain(self.components.iter())
    }

    /// Find a component by `bom-ref`, including the metadata component
    #[must_use]
    pub fn find_component(&self, bom_ref: &str) -> Option<&Component> {
        self.all_components().find(|c| c.bom_ref == bom_ref)
    }

    /// `dependsOn` list registered for `bom_ref`
    #[must_use]
    pub fn dependencies_of(&self, bom_ref: &str) -> Option<&[String]> {
        self.dependencies
            .iter()
            .find(|d| d.dependency_ref == bom_ref)
            .map(|d| d.depends_on.as_slice())
    }
}

/// BOM metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// RFC 3339 creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
}

/// Tool that produced the BOM (1.4 array form)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A software component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: Classification,

    #[serde(rename = "bom-ref")]
    pub bom_ref: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<LicenseChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Component {
    /// A bare component of the given type; optional fields start empty
    pub fn new(
        component_type: Classification,
        name: impl Into<String>,
        bom_ref: impl Into<String>,
    ) -> Self {
        Self {
            component_type,
            bom_ref: bom_ref.into(),
            author: None,
            name: name.into(),
            version: None,
            description: None,
            licenses: Vec::new(),
            purl: None,
            external_references: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Value of the first property named `name`
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Component classification (1.4 set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Application,
    Framework,
    Library,
    Container,
    OperatingSystem,
    Device,
    Firmware,
    File,
}

/// Either a single license or an SPDX expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LicenseChoice {
    License(License),
    Expression(String),
}

impl LicenseChoice {
    /// License by SPDX identifier
    pub fn id(id: impl Into<String>) -> Self {
        Self::License(License {
            id: Some(id.into()),
            name: None,
            url: None,
        })
    }

    /// License by free-form name
    pub fn name(name: impl Into<String>) -> Self {
        Self::License(License {
            id: None,
            name: Some(name.into()),
            url: None,
        })
    }
}

/// A license, identified by SPDX id or by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Link to a resource related to the component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    #[serde(rename = "type")]
    pub reference_type: ExternalReferenceType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// External reference types (1.4 set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalReferenceType {
    Vcs,
    IssueTracker,
    Website,
    Advisories,
    Bom,
    MailingList,
    Social,
    Chat,
    Documentation,
    Support,
    Distribution,
    License,
    BuildMeta,
    BuildSystem,
    ReleaseNotes,
    Other,
}

/// Name/value pair for data CycloneDX has no field for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Direct dependencies of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "ref")]
    pub dependency_ref: String,
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}
