use console::Style;
use editfacets::model::Status;
use once_cell::sync::Lazy;

pub static HEADER: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static ORDINAL: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static TIME: Lazy<Style> = Lazy::new(|| Style::new().color256(246).italic());
pub static LOADING: Lazy<Style> = Lazy::new(|| Style::new().dim().italic());
pub static ACTIVE_CONTROL: Lazy<Style> = Lazy::new(|| Style::new().bold().underlined());
pub static HIGHLIGHT: Lazy<Style> = Lazy::new(|| Style::new().reverse());

/// Style for a control or status cell given its colour name.
pub fn named_color(color: Option<&str>) -> Style {
    match color {
        Some("green") => Style::new().green(),
        Some("yellow") => Style::new().yellow(),
        Some("red") => Style::new().red(),
        Some("orange") => Style::new().color256(208),
        _ => Style::new(),
    }
}

pub fn status(status: Status) -> Style {
    named_color(status.color())
}
