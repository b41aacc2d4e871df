//! # External Collaborators
//!
//! The engine never reaches into its environment directly. Everything it reads or
//! drives is behind one of three traits:
//!
//! - [`RecordSource`]: the live, ordered list of records. It only announces
//!   structural changes (insertions and removals); text that fills in later is
//!   picked up by the next pass.
//! - [`SourceLocator`]: finds the record source once it exists. Hosts render the
//!   list lazily, so the engine polls the locator a bounded number of times.
//! - [`RenderSurface`]: everything visible. Facet controls, record visibility,
//!   ordinal labels, scrolling and the transient highlight.
//!
//! ## Implementations
//!
//! - [`memory::SharedSource`], [`memory::StaticLocator`] and
//!   [`memory::RecordingSurface`]: in-memory collaborators for tests and for
//!   replaying a fixed list of records.

use crate::model::{Facet, FacetValue, RawRecord, RecordId};
use std::fmt;
use uuid::Uuid;

pub mod memory;

/// Token returned by [`RecordSource::subscribe`]; hand it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Identity of a rendered facet control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(pub Uuid);

impl ControlHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a facet control displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLabel {
    pub text: String,
    pub count: usize,
    pub active: bool,
}

impl fmt::Display for ControlLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.count)
    }
}

/// Fixed presentation hints, given once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStyle {
    pub facet: Facet,
    pub color: Option<&'static str>,
}

impl ControlStyle {
    pub fn for_value(value: &FacetValue) -> Self {
        match value {
            FacetValue::Status(status) => Self {
                facet: Facet::Status,
                color: status.color(),
            },
            FacetValue::Type(_) => Self {
                facet: Facet::Type,
                color: None,
            },
        }
    }
}

/// The live record list.
pub trait RecordSource {
    /// Snapshot of every record, in source order.
    fn records(&self) -> Vec<RawRecord>;

    /// Start receiving structural-change notifications.
    fn subscribe(&mut self) -> Subscription;

    fn unsubscribe(&mut self, subscription: Subscription);

    /// Reset the list's scroll offset to the first record.
    fn scroll_to_top(&mut self);
}

/// Finds the record source, if it has been rendered yet.
pub trait SourceLocator {
    type Source: RecordSource;

    fn locate(&mut self) -> Option<Self::Source>;
}

/// Everything the engine shows.
///
/// Calls referring to records that no longer exist must be ignored.
pub trait RenderSurface {
    fn create_control(&mut self, label: &ControlLabel, style: &ControlStyle) -> ControlHandle;

    fn update_control(&mut self, handle: ControlHandle, label: &ControlLabel);

    fn remove_control(&mut self, handle: ControlHandle);

    fn set_record_visible(&mut self, id: RecordId, visible: bool);

    /// Show `ordinal` next to the record.
    fn show_ordinal(&mut self, id: RecordId, ordinal: usize);

    /// Hide the record's ordinal label without removing it.
    fn suppress_ordinal(&mut self, id: RecordId);

    /// Remove the record's ordinal label entirely.
    fn clear_ordinal(&mut self, id: RecordId);

    /// Scroll so the record is centered in view.
    fn scroll_into_view(&mut self, id: RecordId);

    fn set_highlight(&mut self, id: RecordId, on: bool);
}
