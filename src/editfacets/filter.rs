//! # Filtering
//!
//! [`FilterState`] holds at most one active value per facet. Visibility is the
//! conjunction of the predicates it yields ([`FilterState::predicates`]), with two
//! permissive exceptions that take priority over every predicate:
//!
//! - A **loading** record is always visible. Its text is not there yet, so any
//!   decision about it would be a guess.
//! - A record **without a date** is never hidden by a date filter.
//!
//! Under-filtering is always preferred to hiding something the user cannot see is
//! hidden.

use crate::dates::parse_record_date;
use crate::model::{EditRecord, Facet, FacetValue, Status};
use chrono::{NaiveDate, NaiveDateTime};

/// Inclusive calendar range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range; a missing end means a single day. Reversed bounds are swapped.
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        let end = end.unwrap_or(start);
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Builds a range from user-typed bounds, using the same parser as record dates.
    ///
    /// Returns `None` when the start bound is not understood. An unreadable end
    /// bound falls back to a single-day range.
    pub fn from_text(start: &str, end: Option<&str>, now: NaiveDateTime) -> Option<Self> {
        let start = parse_record_date(start, now)?;
        let end = end.and_then(|text| parse_record_date(text, now));
        Some(Self::new(start, end))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A single filter condition on one facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetPredicate<'a> {
    Status(Status),
    Type(&'a str),
    Date(DateRange),
}

impl FacetPredicate<'_> {
    pub fn matches(&self, record: &EditRecord) -> bool {
        match self {
            FacetPredicate::Status(status) => record.status == *status,
            FacetPredicate::Type(label) => record.types.contains(*label),
            FacetPredicate::Date(range) => record.date.map_or(true, |d| range.contains(d)),
        }
    }
}

/// Currently active filters, one value per facet at most.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: Option<Status>,
    pub kind: Option<String>,
    pub date: Option<DateRange>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.kind.is_none() && self.date.is_none()
    }

    pub fn is_active(&self, value: &FacetValue) -> bool {
        match value {
            FacetValue::Status(status) => self.status == Some(*status),
            FacetValue::Type(label) => self.kind.as_deref() == Some(label.as_str()),
        }
    }

    /// Selects `value` for its facet, or clears the facet if `value` is already selected.
    ///
    /// Returns whether the value is active afterwards.
    pub fn toggle(&mut self, value: &FacetValue) -> bool {
        if self.is_active(value) {
            self.clear(value.facet());
            return false;
        }
        match value {
            FacetValue::Status(status) => self.status = Some(*status),
            FacetValue::Type(label) => self.kind = Some(label.clone()),
        }
        true
    }

    pub fn clear(&mut self, facet: Facet) {
        match facet {
            Facet::Status => self.status = None,
            Facet::Type => self.kind = None,
            Facet::Date => self.date = None,
        }
    }

    pub fn set_date(&mut self, range: Option<DateRange>) {
        self.date = range;
    }

    pub fn predicates(&self) -> impl Iterator<Item = FacetPredicate<'_>> {
        let status = self.status.map(FacetPredicate::Status);
        let kind = self.kind.as_deref().map(FacetPredicate::Type);
        let date = self.date.map(FacetPredicate::Date);
        status.into_iter().chain(kind).chain(date)
    }
}

/// Decides whether `record` is shown under `filter`.
pub fn is_visible(record: &EditRecord, filter: &FilterState) -> bool {
    record.loading || filter.predicates().all(|p| p.matches(record))
}
