//! # Free-Text Date Parsing
//!
//! The edits list never prints a full date. Depending on age an entry reads
//! `Submitted Aug 7`, `3 weeks ago`, `yesterday`, or occasionally a plain calendar
//! string. [`parse_record_date`] turns any of these into a local calendar date.
//!
//! Parsing is table-driven: [`RULES`] is tried in order and the first rule that
//! produces a date wins. A miss is not an error; the record simply has no date and
//! date filters will never hide it.
//!
//! ## The Missing Year
//!
//! `Submitted <Month> <Day>` carries no year. Submissions are always in the past,
//! so the current year is assumed and, if that lands after today, one year is
//! subtracted. A leap day that does not exist in the current year resolves to
//! the most recent Feb 29 on or before today. At exactly the one-year boundary
//! the text is ambiguous and the more recent reading wins.

use chrono::{Datelike, DateTime, Days, Local, Months, NaiveDate, NaiveDateTime, TimeDelta};

type Rule = fn(&str, &[String], NaiveDateTime) -> Option<NaiveDate>;

/// Parsing rules in priority order.
pub const RULES: &[(&str, Rule)] = &[
    ("submitted", submitted_month_day),
    ("relative", relative_ago),
    ("literal", literal_day),
    ("calendar", calendar_string),
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const CALENDAR_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"];

/// Years `Submitted <Month> <Day>` may reach back; enough to find any Feb 29.
const MAX_YEARS_BACK: i32 = 4;

/// Parses the date text of a record relative to `now` (local wall-clock time).
///
/// Returns `None` when no rule recognizes the text.
pub fn parse_record_date(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let tokens = tokenize(text);
    RULES.iter().find_map(|(_, rule)| rule(text, &tokens, now))
}

/// Resolves a month token by full name or by its first three letters.
pub fn month_from_token(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    let prefix = token.get(..3)?;
    MONTHS
        .iter()
        .position(|name| *name == token || name.get(..3) == Some(prefix))
        .map(|idx| idx as u32 + 1)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn submitted_month_day(_text: &str, tokens: &[String], now: NaiveDateTime) -> Option<NaiveDate> {
    let at = tokens.iter().position(|t| t == "submitted")?;
    let month = month_from_token(tokens.get(at + 1)?)?;
    let day = parse_day(tokens.get(at + 2)?)?;

    // An explicit year, when printed, is taken as-is.
    if let Some(year) = tokens
        .get(at + 3)
        .filter(|t| t.len() == 4)
        .and_then(|t| t.parse::<i32>().ok())
    {
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // Walk back from the current year to the latest year where the date exists
    // and is not after today. Feb 29 may need up to four years.
    let today = now.date();
    (0..=MAX_YEARS_BACK)
        .filter_map(|back| NaiveDate::from_ymd_opt(today.year() - back, month, day))
        .find(|date| *date <= today)
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let day = digits.parse::<u32>().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn relative_ago(_text: &str, tokens: &[String], now: NaiveDateTime) -> Option<NaiveDate> {
    tokens.windows(3).find_map(|window| {
        if window[2] != "ago" {
            return None;
        }
        let amount = match window[0].as_str() {
            "a" | "an" => 1,
            n => n.parse::<u32>().ok()?,
        };
        let unit = window[1].strip_suffix('s').unwrap_or(window[1].as_str());
        subtract_units(now, amount, unit)
    })
}

fn subtract_units(now: NaiveDateTime, amount: u32, unit: &str) -> Option<NaiveDate> {
    let today = now.date();
    match unit {
        "day" => today.checked_sub_days(Days::new(amount.into())),
        "week" => today.checked_sub_days(Days::new(u64::from(amount) * 7)),
        "month" => today.checked_sub_months(Months::new(amount)),
        "year" => today.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        "hour" => now
            .checked_sub_signed(TimeDelta::try_hours(amount.into())?)
            .map(|t| t.date()),
        "minute" | "min" => now
            .checked_sub_signed(TimeDelta::try_minutes(amount.into())?)
            .map(|t| t.date()),
        "second" | "sec" => now
            .checked_sub_signed(TimeDelta::try_seconds(amount.into())?)
            .map(|t| t.date()),
        _ => None,
    }
}

fn literal_day(_text: &str, tokens: &[String], now: NaiveDateTime) -> Option<NaiveDate> {
    if tokens.iter().any(|t| t == "today") {
        return Some(now.date());
    }
    if tokens.iter().any(|t| t == "yesterday") {
        return now.date().pred_opt();
    }
    None
}

fn calendar_string(text: &str, _tokens: &[String], _now: NaiveDateTime) -> Option<NaiveDate> {
    CALENDAR_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Local).date_naive())
        })
}
