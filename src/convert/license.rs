//! Recipe `license` attribute to CycloneDX license choices.

use crate::cyclonedx::LicenseChoice;
use crate::graph::LicenseField;

/// Map a recipe's declared licenses.
///
/// A missing attribute yields no licenses; blank entries are dropped.
#[must_use]
pub fn licenses(license: Option<&LicenseField>) -> Vec<LicenseChoice> {
    license
        .map(|field| {
            field
                .entries()
                .into_iter()
                .filter_map(license_choice)
                .collect()
        })
        .unwrap_or_default()
}

/// Classify one license string.
///
/// Known SPDX ids become `license.id`, valid SPDX expressions become
/// `expression`, anything else is kept verbatim as `license.name`.
#[must_use]
pub fn license_choice(entry: &str) -> Option<LicenseChoice> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    if let Some(id) = spdx::license_id(entry) {
        return Some(LicenseChoice::id(id.name));
    }

    if spdx::Expression::parse_mode(entry, spdx::ParseMode::STRICT).is_ok() {
        return Some(LicenseChoice::Expression(entry.to_string()));
    }

    Some(LicenseChoice::name(super::single_line(entry)))
}
