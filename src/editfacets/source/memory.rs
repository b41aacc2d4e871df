use super::{
    ControlHandle, ControlLabel, ControlStyle, RecordSource, RenderSurface, SourceLocator,
    Subscription,
};
use crate::model::{RawRecord, RecordId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Default)]
struct SourceState {
    records: Vec<RawRecord>,
    subscription: Option<Subscription>,
    next_subscription: u64,
    scroll_resets: usize,
}

/// In-memory record list.
///
/// Clones share the same list, so a test (or a host) can keep mutating records
/// after handing a clone to the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedSource {
    state: Rc<RefCell<SourceState>>,
}

impl SharedSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SourceState {
                records,
                ..Default::default()
            })),
        }
    }

    pub fn push(&self, record: RawRecord) -> RecordId {
        let id = record.id;
        self.state.borrow_mut().records.push(record);
        id
    }

    pub fn insert(&self, position: usize, record: RawRecord) -> RecordId {
        let id = record.id;
        let mut state = self.state.borrow_mut();
        let position = position.min(state.records.len());
        state.records.insert(position, record);
        id
    }

    pub fn remove(&self, id: RecordId) -> Option<RawRecord> {
        let mut state = self.state.borrow_mut();
        let position = state.records.iter().position(|r| r.id == id)?;
        Some(state.records.remove(position))
    }

    /// Mutates a record's text in place. Like the real list, this raises no notification.
    pub fn update<F: FnOnce(&mut RawRecord)>(&self, id: RecordId, f: F) -> bool {
        let mut state = self.state.borrow_mut();
        match state.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().subscription.is_some()
    }

    pub fn scroll_resets(&self) -> usize {
        self.state.borrow().scroll_resets
    }
}

impl RecordSource for SharedSource {
    fn records(&self) -> Vec<RawRecord> {
        self.state.borrow().records.clone()
    }

    fn subscribe(&mut self) -> Subscription {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let subscription = Subscription(state.next_subscription);
        state.subscription = Some(subscription);
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let mut state = self.state.borrow_mut();
        if state.subscription == Some(subscription) {
            state.subscription = None;
        }
    }

    fn scroll_to_top(&mut self) {
        self.state.borrow_mut().scroll_resets += 1;
    }
}

/// Locator that finds a fixed source after a number of misses.
#[derive(Debug, Clone)]
pub struct StaticLocator {
    source: Option<SharedSource>,
    misses: usize,
    attempts: usize,
}

impl StaticLocator {
    /// Finds `source` on the first attempt.
    pub fn found(source: SharedSource) -> Self {
        Self::after(0, source)
    }

    /// Misses `misses` times, then finds `source`.
    pub fn after(misses: usize, source: SharedSource) -> Self {
        Self {
            source: Some(source),
            misses,
            attempts: 0,
        }
    }

    pub fn never() -> Self {
        Self {
            source: None,
            misses: 0,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl SourceLocator for StaticLocator {
    type Source = SharedSource;

    fn locate(&mut self) -> Option<SharedSource> {
        self.attempts += 1;
        if self.attempts <= self.misses {
            return None;
        }
        self.source.clone()
    }
}

/// An ordinal label attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalLabel {
    pub value: Option<usize>,
    pub shown: bool,
}

#[derive(Debug, Clone)]
pub struct RenderedControl {
    pub label: ControlLabel,
    pub style: ControlStyle,
}

/// Render surface that keeps what would be on screen in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    controls: HashMap<ControlHandle, RenderedControl>,
    order: Vec<ControlHandle>,
    hidden: HashSet<RecordId>,
    ordinals: HashMap<RecordId, OrdinalLabel>,
    highlighted: HashSet<RecordId>,
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub scrolled_to: Vec<RecordId>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls in creation order.
    pub fn controls(&self) -> Vec<(ControlHandle, &RenderedControl)> {
        self.order
            .iter()
            .filter_map(|h| self.controls.get(h).map(|c| (*h, c)))
            .collect()
    }

    pub fn control(&self, handle: ControlHandle) -> Option<&RenderedControl> {
        self.controls.get(&handle)
    }

    /// Finds a control by its text.
    pub fn find_control(&self, text: &str) -> Option<(ControlHandle, &RenderedControl)> {
        self.controls().into_iter().find(|(_, c)| c.label.text == text)
    }

    pub fn is_visible(&self, id: RecordId) -> bool {
        !self.hidden.contains(&id)
    }

    pub fn ordinal(&self, id: RecordId) -> Option<OrdinalLabel> {
        self.ordinals.get(&id).copied()
    }

    /// The number displayed next to `id`, if its label is shown.
    pub fn shown_ordinal(&self, id: RecordId) -> Option<usize> {
        self.ordinal(id).filter(|o| o.shown).and_then(|o| o.value)
    }

    pub fn is_highlighted(&self, id: RecordId) -> bool {
        self.highlighted.contains(&id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }
}

impl RenderSurface for RecordingSurface {
    fn create_control(&mut self, label: &ControlLabel, style: &ControlStyle) -> ControlHandle {
        let handle = ControlHandle::new();
        self.controls.insert(
            handle,
            RenderedControl {
                label: label.clone(),
                style: *style,
            },
        );
        self.order.push(handle);
        self.created += 1;
        handle
    }

    fn update_control(&mut self, handle: ControlHandle, label: &ControlLabel) {
        if let Some(control) = self.controls.get_mut(&handle) {
            control.label = label.clone();
            self.updated += 1;
        }
    }

    fn remove_control(&mut self, handle: ControlHandle) {
        if self.controls.remove(&handle).is_some() {
            self.order.retain(|h| *h != handle);
            self.removed += 1;
        }
    }

    fn set_record_visible(&mut self, id: RecordId, visible: bool) {
        if visible {
            self.hidden.remove(&id);
        } else {
            self.hidden.insert(id);
        }
    }

    fn show_ordinal(&mut self, id: RecordId, ordinal: usize) {
        self.ordinals.insert(
            id,
            OrdinalLabel {
                value: Some(ordinal),
                shown: true,
            },
        );
    }

    fn suppress_ordinal(&mut self, id: RecordId) {
        self.ordinals
            .entry(id)
            .and_modify(|o| o.shown = false)
            .or_insert(OrdinalLabel {
                value: None,
                shown: false,
            });
    }

    fn clear_ordinal(&mut self, id: RecordId) {
        self.ordinals.remove(&id);
    }

    fn scroll_into_view(&mut self, id: RecordId) {
        self.scrolled_to.push(id);
    }

    fn set_highlight(&mut self, id: RecordId, on: bool) {
        if on {
            self.highlighted.insert(id);
        } else {
            self.highlighted.remove(&id);
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// The three-record list used across engine tests: an accepted road edit,
    /// a pending road+address edit and one still rendering.
    pub fn sample_records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("Accepted", "2 days ago", "Road"),
            RawRecord::new("Pending", "Submitted Jan 3", "Road, Address"),
            RawRecord::pending_render(),
        ]
    }

    pub fn sample_source() -> SharedSource {
        SharedSource::new(sample_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_records() {
        let source = SharedSource::default();
        let handle = source.clone();
        handle.push(RawRecord::new("Accepted", "today", "Road"));
        assert_eq!(source.len(), 1);
        assert_eq!(source.records()[0].title.as_deref(), Some("Accepted"));
    }

    #[test]
    fn stale_unsubscribe_is_ignored() {
        let mut source = SharedSource::default();
        let first = source.subscribe();
        let second = source.subscribe();
        source.unsubscribe(first);
        assert!(source.is_subscribed());
        source.unsubscribe(second);
        assert!(!source.is_subscribed());
    }

    #[test]
    fn locator_misses_then_finds() {
        let mut locator = StaticLocator::after(2, SharedSource::default());
        assert!(locator.locate().is_none());
        assert!(locator.locate().is_none());
        assert!(locator.locate().is_some());
        assert_eq!(locator.attempts(), 3);
        assert!(StaticLocator::never().locate().is_none());
    }

    #[test]
    fn suppressed_ordinal_keeps_its_value() {
        let mut surface = RecordingSurface::new();
        let id = RecordId::new();
        surface.show_ordinal(id, 4);
        surface.suppress_ordinal(id);
        assert_eq!(
            surface.ordinal(id),
            Some(OrdinalLabel {
                value: Some(4),
                shown: false
            })
        );
        assert_eq!(surface.shown_ordinal(id), None);
        surface.clear_ordinal(id);
        assert_eq!(surface.ordinal(id), None);
    }
}
