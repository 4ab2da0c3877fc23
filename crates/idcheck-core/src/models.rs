//! Data models for vault items and report rows

use serde::{Deserialize, Serialize};
use std::fmt;

/// One item as returned by `op list items` or `op get item`.
///
/// Every level defaults when absent: item schemas drift between vault
/// templates and CLI versions, and a missing key must not reject the item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawRecord {
    /// Vault item identifier
    pub uuid: String,

    /// Summary block (present in both list and detail output)
    pub overview: Overview,

    /// Detail block (only populated by `op get item`)
    pub details: Details,
}

impl RawRecord {
    /// Item title, empty when the vault omitted it
    pub fn title(&self) -> &str {
        &self.overview.title
    }

    /// Check whether the item carries `tag` (exact match)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.overview.tags.iter().any(|t| t == tag)
    }

    /// First section whose title satisfies `predicate`
    pub fn find_section<P>(&self, predicate: P) -> Option<&Section>
    where
        P: Fn(&Section) -> bool,
    {
        self.details.sections.iter().find(|s| predicate(s))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Overview {
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Details {
    pub sections: Vec<Section>,

    #[serde(rename = "notesPlain")]
    pub notes_plain: Option<String>,
}

/// A named group of fields inside an item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Section {
    pub title: String,
    pub fields: Option<Vec<Field>>,
}

impl Section {
    /// Fields of the section, empty when the key is absent
    pub fn fields(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or_default()
    }

    /// True when the section has at least one field
    pub fn has_fields(&self) -> bool {
        !self.fields().is_empty()
    }

    /// First field whose label satisfies `predicate`
    pub fn find_field<P>(&self, predicate: P) -> Option<&Field>
    where
        P: Fn(&Field) -> bool,
    {
        self.fields().iter().find(|f| predicate(f))
    }
}

/// A single labelled value. `op` uses the short keys `t` and `v`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Field {
    #[serde(rename = "t")]
    pub label: String,

    #[serde(rename = "v")]
    pub value: Option<FieldValue>,
}

/// Loosely typed field value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Normalised fields extracted from one item, before ordering
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub title: String,

    /// Raw expiry value; anything but an integer epoch marks the record broken
    pub expiration: Option<FieldValue>,

    /// Revalidation owner; `None` means the owner section was missing or empty
    pub owner: Option<String>,

    /// Plain-text notes, only filled when notes were requested
    pub notes: Option<String>,
}

/// Expiry cell of a finished report row
#[derive(Debug, Clone, PartialEq)]
pub enum Expiry {
    /// `YYYY/MM/DD` in UTC
    Date(String),
    /// Missing or malformed value, passed through untouched
    Broken(Option<FieldValue>),
}

impl Expiry {
    pub fn is_broken(&self) -> bool {
        matches!(self, Expiry::Broken(_))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Date(date) => f.write_str(date),
            Expiry::Broken(Some(value)) => write!(f, "{}", value),
            Expiry::Broken(None) => Ok(()),
        }
    }
}

/// One ordered report row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub title: String,
    pub expire: Expiry,
    pub owner: Option<String>,
    pub notes: Option<String>,
}

/// Column names, in output order
pub const TITLE_COLUMN: &str = "title";
pub const EXPIRE_COLUMN: &str = "expire";
pub const OWNER_COLUMN: &str = "ID revalidation owner";
pub const NOTES_COLUMN: &str = "notes";

/// Finished report: broken rows first, then rows by ascending expiry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub entries: Vec<ReportEntry>,

    /// Whether the `notes` column is part of the report
    pub include_notes: bool,

    /// Schema warnings raised while extracting records
    pub warnings: Vec<crate::extract::Warning>,
}

impl Report {
    /// Column names for this report
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![TITLE_COLUMN, EXPIRE_COLUMN, OWNER_COLUMN];
        if self.include_notes {
            columns.push(NOTES_COLUMN);
        }
        columns
    }

    /// Cell values of `entry`, aligned with [`Report::columns`]
    pub fn row(&self, entry: &ReportEntry) -> Vec<String> {
        let mut row = vec![
            entry.title.clone(),
            entry.expire.to_string(),
            entry.owner.clone().unwrap_or_default(),
        ];
        if self.include_notes {
            row.push(entry.notes.clone().unwrap_or_default());
        }
        row
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
