//! Record classification.
//!
//! Turns the text of a [`RawRecord`] into the facets filters work with. Every
//! function here is pure and total: unrecognized text degrades to
//! [`Status::Unknown`], an empty type set, or no date.

use crate::dates::parse_record_date;
use crate::model::{EditRecord, RawRecord, Status};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Title prefixes and the status they mark, tested in order.
///
/// `Not` is listed first so "Not accepted" is never read as something else.
pub const STATUS_MARKERS: &[(&str, Status)] = &[
    ("Not", Status::NotAccepted),
    ("Acc", Status::Accepted),
    ("Pen", Status::Pending),
    ("Inc", Status::Incorrect),
];

/// Text the host shows before a record has been filled in.
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["...", "Loading"];

/// True when any required text field is missing, blank, or a placeholder.
pub fn is_loading<S: AsRef<str>>(record: &RawRecord, placeholders: &[S]) -> bool {
    [&record.date, &record.title, &record.types]
        .into_iter()
        .any(|field| match field.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(text) => placeholders.iter().any(|p| p.as_ref() == text),
        })
}

pub fn extract_status(record: &RawRecord) -> Status {
    let Some(title) = record.title.as_deref().map(str::trim) else {
        return Status::Unknown;
    };
    STATUS_MARKERS
        .iter()
        .find(|(marker, _)| title.starts_with(marker))
        .map(|(_, status)| *status)
        .unwrap_or(Status::Unknown)
}

pub fn extract_types(record: &RawRecord) -> BTreeSet<String> {
    record
        .types
        .as_deref()
        .map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn extract_date(record: &RawRecord, now: NaiveDateTime) -> Option<chrono::NaiveDate> {
    record
        .date
        .as_deref()
        .and_then(|text| parse_record_date(text, now))
}

/// Derives all facets of one record for the current pass.
pub fn classify<S: AsRef<str>>(
    record: &RawRecord,
    now: NaiveDateTime,
    placeholders: &[S],
) -> EditRecord {
    EditRecord {
        id: record.id,
        status: extract_status(record),
        types: extract_types(record),
        date: extract_date(record, now),
        loading: is_loading(record, placeholders),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn loading_when_any_field_missing_or_placeholder() {
        let full = RawRecord::new("Accepted", "2 days ago", "Road");
        assert!(!is_loading(&full, DEFAULT_PLACEHOLDERS));

        let mut missing = full.clone();
        missing.types = None;
        assert!(is_loading(&missing, DEFAULT_PLACEHOLDERS));

        let mut blank = full.clone();
        blank.title = Some("   ".into());
        assert!(is_loading(&blank, DEFAULT_PLACEHOLDERS));

        let mut placeholder = full.clone();
        placeholder.date = Some(" Loading ".into());
        assert!(is_loading(&placeholder, DEFAULT_PLACEHOLDERS));

        let mut dots = full;
        dots.types = Some("...".into());
        assert!(is_loading(&dots, DEFAULT_PLACEHOLDERS));
    }

    #[test]
    fn custom_placeholders_replace_defaults() {
        let record = RawRecord::new("Accepted", "Chargement", "Road");
        assert!(is_loading(&record, &["Chargement"]));
        assert!(!is_loading(&record, DEFAULT_PLACEHOLDERS));
    }

    #[test]
    fn status_markers_first_match_wins() {
        let status = |title: &str| extract_status(&RawRecord::new(title, "today", "Road"));
        assert_eq!(status("Accepted"), Status::Accepted);
        assert_eq!(status("  Pending review"), Status::Pending);
        assert_eq!(status("Not accepted"), Status::NotAccepted);
        assert_eq!(status("Incorrect"), Status::Incorrect);
        assert_eq!(status("accepted"), Status::Unknown);
        assert_eq!(status("Published"), Status::Unknown);
        assert_eq!(extract_status(&RawRecord::pending_render()), Status::Unknown);
    }

    #[test]
    fn types_are_split_trimmed_and_deduplicated() {
        let record = RawRecord::new("Accepted", "today", " Road, Address,,Road ,road");
        let types: Vec<_> = extract_types(&record).into_iter().collect();
        assert_eq!(types, vec!["Address", "Road", "road"]);
    }

    #[test]
    fn classify_combines_facets() {
        let record = RawRecord::new("Pending", "Submitted May 1", "Road, Hours");
        let classified = classify(&record, now(), DEFAULT_PLACEHOLDERS);
        assert_eq!(classified.id, record.id);
        assert_eq!(classified.status, Status::Pending);
        assert!(classified.types.contains("Hours"));
        assert_eq!(classified.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(!classified.loading);
    }

    #[test]
    fn unparseable_date_is_none_not_loading() {
        let record = RawRecord::new("Pending", "at some point", "Road");
        let classified = classify(&record, now(), DEFAULT_PLACEHOLDERS);
        assert_eq!(classified.date, None);
        assert!(!classified.loading);
    }
}
