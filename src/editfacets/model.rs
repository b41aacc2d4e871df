//! # Domain Model
//!
//! Records come from a live list the engine does not own. Each one is read as a
//! [`RawRecord`]: three loosely structured text fields that may still be empty
//! while the host is rendering them. Every pass turns the raw text into an
//! [`EditRecord`] with typed facets.
//!
//! Nothing here is persisted across passes. A record that was loading in one pass
//! can be fully populated in the next, so facets are always derived fresh.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque handle to one entry of the record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of an edit.
///
/// Declaration order is the display order of status controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Accepted,
    Pending,
    NotAccepted,
    Incorrect,
    Unknown,
}

impl Status {
    pub const KNOWN: [Status; 4] = [
        Status::Accepted,
        Status::Pending,
        Status::NotAccepted,
        Status::Incorrect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Accepted => "Accepted",
            Status::Pending => "Pending",
            Status::NotAccepted => "Not Accepted",
            Status::Incorrect => "Incorrect",
            Status::Unknown => "Unknown",
        }
    }

    /// Button colour used by the original edits panel.
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Status::Accepted => Some("green"),
            Status::Pending => Some("yellow"),
            Status::NotAccepted => Some("red"),
            Status::Incorrect => Some("orange"),
            Status::Unknown => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "accepted" => Ok(Status::Accepted),
            "pending" => Ok(Status::Pending),
            "notaccepted" => Ok(Status::NotAccepted),
            "incorrect" => Ok(Status::Incorrect),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// A classification dimension that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Facet {
    Status,
    Type,
    Date,
}

/// One selectable value of a countable facet.
///
/// Status values sort before type values, which keeps the control order stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetValue {
    Status(Status),
    Type(String),
}

impl FacetValue {
    pub fn facet(&self) -> Facet {
        match self {
            FacetValue::Status(_) => Facet::Status,
            FacetValue::Type(_) => Facet::Type,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FacetValue::Status(status) => status.label(),
            FacetValue::Type(label) => label,
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time text of one record, as read from the source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub types: Option<String>,
}

impl RawRecord {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        types: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            title: Some(title.into()),
            date: Some(date.into()),
            types: Some(types.into()),
        }
    }

    /// A record whose text has not been rendered yet.
    pub fn pending_render() -> Self {
        Self {
            id: RecordId::new(),
            ..Default::default()
        }
    }
}

/// Facets derived from a [`RawRecord`] for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub id: RecordId,
    pub status: Status,
    pub types: BTreeSet<String>,
    pub date: Option<NaiveDate>,
    pub loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("accepted".parse::<Status>(), Ok(Status::Accepted));
        assert_eq!("Not Accepted".parse::<Status>(), Ok(Status::NotAccepted));
        assert_eq!("not-accepted".parse::<Status>(), Ok(Status::NotAccepted));
        assert_eq!("PENDING".parse::<Status>(), Ok(Status::Pending));
        assert!("unknown".parse::<Status>().is_err());
        assert!("".parse::<Status>().is_err());
    }

    #[test]
    fn status_values_sort_before_types() {
        let status = FacetValue::Status(Status::Incorrect);
        let kind = FacetValue::Type("Address".into());
        assert!(status < kind);
        assert_eq!(status.facet(), Facet::Status);
        assert_eq!(kind.facet(), Facet::Type);
    }

    #[test]
    fn raw_record_deserializes_with_missing_fields() {
        let raw: RawRecord = serde_json::from_str(r#"{"title": "Pending"}"#).unwrap();
        assert_eq!(raw.title.as_deref(), Some("Pending"));
        assert!(raw.date.is_none());
        assert!(raw.types.is_none());
    }
}
