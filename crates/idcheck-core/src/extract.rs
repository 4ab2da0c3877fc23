//! Per-field extraction from detailed vault items
//!
//! Each rule tolerates schema drift on its own. Problems are reported as
//! [`Warning`]s through a [`Diagnostics`] sink and never abort the run.

use std::fmt;
use tracing::debug;

use crate::config::{CheckerConfig, OWNER_TAG};
use crate::models::{FieldValue, RawRecord, RecordSummary};

/// Section title fragment marking the expiry section (case-insensitive)
const EXPIRY_SECTION: &str = "expiry";

/// Field label fragment marking the expiry date (case-insensitive)
const EXPIRY_FIELD: &str = "expiry date";

/// Section title fragment marking the owner section (case-sensitive)
const OWNER_SECTION: &str = "OWNER";

/// What went wrong with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// No section with "expiry" in its title and at least one field
    MissingExpirySection,
    /// Expiry date field present but not an integer epoch
    MalformedExpiry,
    /// Owner tag present but no "OWNER" section
    MissingOwnerSection,
}

/// Non-fatal schema problem found while extracting a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub title: String,
    pub kind: WarningKind,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WARNING: this record does not match the expected format - '{}'",
            self.title
        )
    }
}

/// Receiver for extraction warnings
pub trait Diagnostics {
    fn warn(&mut self, warning: Warning);
}

impl Diagnostics for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

fn raise(diagnostics: &mut dyn Diagnostics, record: &RawRecord, kind: WarningKind) {
    debug!("{:?} in record '{}'", kind, record.title());
    diagnostics.warn(Warning {
        title: record.title().to_string(),
        kind,
    });
}

pub fn extract_title(record: &RawRecord) -> String {
    record.title().to_string()
}

/// Expiry value of `record`.
///
/// Returns `None` with a warning when the expiry section is missing, and
/// `None` silently when the section has no expiry date field. A value that
/// is not an integer is returned as-is with a warning.
pub fn extract_expiration(
    record: &RawRecord,
    diagnostics: &mut dyn Diagnostics,
) -> Option<FieldValue> {
    let Some(section) = record.find_section(|s| {
        s.title.to_lowercase().contains(EXPIRY_SECTION) && s.has_fields()
    }) else {
        raise(diagnostics, record, WarningKind::MissingExpirySection);
        return None;
    };

    let field = section.find_field(|f| f.label.to_lowercase().contains(EXPIRY_FIELD))?;

    let value = field.value.clone();
    if value.as_ref().and_then(FieldValue::as_integer).is_none() {
        raise(diagnostics, record, WarningKind::MalformedExpiry);
    }
    value
}

/// Revalidation owner of `record`.
///
/// Items without the owner tag get the configured default owner. Tagged
/// items must have an "OWNER" section; its first field is rendered as
/// `"<label> (<value>)"`, with an empty value when the field has none.
pub fn extract_owner(
    record: &RawRecord,
    config: &CheckerConfig,
    diagnostics: &mut dyn Diagnostics,
) -> Option<String> {
    if !record.has_tag(OWNER_TAG) {
        return Some(config.default_owner.clone());
    }

    let Some(section) = record.find_section(|s| s.title.contains(OWNER_SECTION)) else {
        raise(diagnostics, record, WarningKind::MissingOwnerSection);
        return None;
    };

    let field = section.fields().first()?;
    let value = field
        .value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    Some(format!("{} ({})", field.label, value))
}

pub fn extract_notes(record: &RawRecord) -> Option<String> {
    record.details.notes_plain.clone()
}

/// Build the summary of one detailed item
pub fn extract_summary(
    record: &RawRecord,
    config: &CheckerConfig,
    include_notes: bool,
    diagnostics: &mut dyn Diagnostics,
) -> RecordSummary {
    RecordSummary {
        title: extract_title(record),
        expiration: extract_expiration(record, diagnostics),
        owner: extract_owner(record, config, diagnostics),
        notes: if include_notes {
            extract_notes(record)
        } else {
            None
        },
    }
}
