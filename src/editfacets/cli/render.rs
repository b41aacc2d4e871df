//! # List Rendering
//!
//! Prints the state a pass left on the in-memory surface: the facet controls
//! grouped by facet, then every visible record with its ordinal.
//!
//! Layout math (width, truncation, padding) is done here on plain strings; styles
//! are applied last so widths are never measured on escape codes.

use super::styles;
use chrono::NaiveDateTime;
use console::Style;
use editfacets::classify::{extract_date, extract_status, is_loading};
use editfacets::model::{Facet, RawRecord};
use editfacets::source::memory::{RecordingSurface, RenderedControl};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const STATUS_WIDTH: usize = 14;
const ORDINAL_WIDTH: usize = 5;
const HIGHLIGHT_MARKER: &str = "▶";

/// What one list render needs.
pub struct ListView<'a> {
    pub records: &'a [RawRecord],
    pub surface: &'a RecordingSurface,
    pub placeholders: &'a [String],
    pub now: NaiveDateTime,
    pub use_color: bool,
}

pub fn render_list(view: &ListView<'_>) -> String {
    let mut output = String::new();

    let controls = view.surface.controls();
    for (facet, heading) in [
        (Facet::Status, "Filter edits by status:"),
        (Facet::Type, "Filter edits by type:"),
    ] {
        let group: Vec<&RenderedControl> = controls
            .iter()
            .map(|(_, control)| *control)
            .filter(|control| control.style.facet == facet)
            .collect();
        if group.is_empty() {
            continue;
        }
        output.push_str(&paint(&styles::HEADER, heading, view.use_color));
        output.push('\n');
        let cells: Vec<String> = group
            .iter()
            .map(|control| control_cell(control, view.use_color))
            .collect();
        output.push_str(&format!("  {}\n", cells.join("  ")));
    }

    let visible: Vec<&RawRecord> = view
        .records
        .iter()
        .filter(|record| view.surface.is_visible(record.id))
        .collect();

    if !output.is_empty() {
        output.push('\n');
    }
    if visible.is_empty() {
        output.push_str("No edits match the current filters.\n");
        return output;
    }

    for record in visible {
        output.push_str(&record_line(record, view));
        output.push('\n');
    }
    output
}

fn control_cell(control: &RenderedControl, use_color: bool) -> String {
    let text = control.label.to_string();
    let styled = paint(&styles::named_color(control.style.color), &text, use_color);
    if control.label.active {
        format!("[{}]", paint(&styles::ACTIVE_CONTROL, &styled, use_color))
    } else {
        styled
    }
}

fn record_line(record: &RawRecord, view: &ListView<'_>) -> String {
    let highlighted = view.surface.is_highlighted(record.id);
    let marker = if highlighted { HIGHLIGHT_MARKER } else { " " };

    let ordinal = match view.surface.shown_ordinal(record.id) {
        Some(n) => format!("{:>width$}", format!("{}.", n), width = ORDINAL_WIDTH - 1),
        None => " ".repeat(ORDINAL_WIDTH - 1),
    };

    if is_loading(record, view.placeholders) {
        return format!(
            "{} {} {}",
            marker,
            paint(&styles::ORDINAL, &ordinal, view.use_color),
            paint(&styles::LOADING, "Loading...", view.use_color)
        );
    }

    let status = extract_status(record);
    let status_cell = pad_to(status.label(), STATUS_WIDTH);
    let types = record.types.as_deref().unwrap_or_default().trim();

    let fixed = marker.width() + 1 + ordinal.width() + 1 + STATUS_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let types_display = truncate_to_width(types, available);
    let padding = available.saturating_sub(types_display.width());

    let time = format_date(record, view.now);

    let line = format!(
        "{} {} {}{}{}{}",
        marker,
        paint(&styles::ORDINAL, &ordinal, view.use_color),
        paint(&styles::status(status), &status_cell, view.use_color),
        types_display,
        " ".repeat(padding),
        paint(&styles::TIME, &time, view.use_color)
    );
    if highlighted {
        paint(&styles::HIGHLIGHT, &line, view.use_color)
    } else {
        line
    }
}

/// Right-aligned relative date, or the raw text when it cannot be read.
fn format_date(record: &RawRecord, now: NaiveDateTime) -> String {
    let text = match extract_date(record, now) {
        Some(date) => {
            let elapsed = now
                .signed_duration_since(date.and_time(chrono::NaiveTime::MIN))
                .to_std()
                .unwrap_or_default();
            timeago::Formatter::new().convert(elapsed)
        }
        None => record.date.as_deref().unwrap_or_default().trim().to_string(),
    };
    format!(
        "{:>width$}",
        truncate_to_width(&text, TIME_WIDTH),
        width = TIME_WIDTH
    )
}

fn paint(style: &Style, text: &str, use_color: bool) -> String {
    style
        .clone()
        .force_styling(use_color)
        .apply_to(text)
        .to_string()
}

fn pad_to(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width);
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
