//! # Facet Reconciliation
//!
//! Facet controls show a count for every status and type present among the
//! visible records. The list changes constantly while it streams in, so controls
//! are never rebuilt. Each pass diffs the new [`Histogram`] against the tracked
//! controls:
//!
//! | Histogram | Tracked | Action |
//! |-----------|---------|--------|
//! | count > 0 | no      | create the control |
//! | count > 0 | yes     | update in place, only if count or active flag changed |
//! | absent    | yes     | remove the control |
//!
//! A control's [`ControlHandle`] never changes while it exists, so anything the
//! surface attached to it (hover state, focus) survives count updates.
//!
//! An active filter whose value has no count any more is cleared. The engine does
//! this with [`clear_vanished`] and recomputes visibility before it reconciles, so
//! controls that survive the wider view keep their handles. [`FacetReconciler::reconcile`]
//! still clears such filters itself and reports them in [`ReconcileOutcome::cleared`].

use crate::filter::FilterState;
use crate::model::{EditRecord, Facet, FacetValue, Status};
use crate::source::{ControlHandle, ControlLabel, ControlStyle, RenderSurface};
use std::collections::BTreeMap;

/// Per-value counts over the visible, loaded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: BTreeMap<FacetValue, usize>,
}

impl Histogram {
    /// Counts statuses and types of `records`.
    ///
    /// Loading records and unknown statuses are not counted.
    pub fn from_visible<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a EditRecord>,
    {
        let mut counts = BTreeMap::new();
        for record in records.into_iter().filter(|r| !r.loading) {
            if record.status != Status::Unknown {
                *counts.entry(FacetValue::Status(record.status)).or_insert(0) += 1;
            }
            for label in &record.types {
                *counts.entry(FacetValue::Type(label.clone())).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, value: &FacetValue) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FacetValue, usize)> {
        self.counts.iter().map(|(value, count)| (value, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Clears every active status or type filter whose value has no count in `histogram`.
///
/// Returns the facets that were cleared. Calling it again with the same histogram
/// clears nothing.
pub fn clear_vanished(histogram: &Histogram, filter: &mut FilterState) -> Vec<Facet> {
    let active: Vec<FacetValue> = [
        filter.status.map(FacetValue::Status),
        filter.kind.clone().map(FacetValue::Type),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut cleared = Vec::new();
    for value in active {
        if histogram.count(&value) == 0 {
            filter.clear(value.facet());
            cleared.push(value.facet());
        }
    }
    cleared
}

/// A facet value rendered as a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetControl {
    pub handle: ControlHandle,
    pub value: FacetValue,
    pub count: usize,
    pub active: bool,
}

impl FacetControl {
    pub fn label(&self) -> ControlLabel {
        ControlLabel {
            text: self.value.label().to_string(),
            count: self.count,
            active: self.active,
        }
    }
}

/// What a single reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Facets whose active filter was cleared because its value disappeared.
    pub cleared: Vec<Facet>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0 && self.cleared.is_empty()
    }
}

/// Tracks the live facet controls.
#[derive(Debug, Default)]
pub struct FacetReconciler {
    controls: BTreeMap<FacetValue, FacetControl>,
}

impl FacetReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the rendered controls in line with `histogram`.
    ///
    /// Any active status or type filter whose value has no count is cleared, whether
    /// or not it had a control.
    pub fn reconcile<R: RenderSurface>(
        &mut self,
        histogram: &Histogram,
        filter: &mut FilterState,
        surface: &mut R,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        let stale: Vec<FacetValue> = self
            .controls
            .keys()
            .filter(|value| histogram.count(value) == 0)
            .cloned()
            .collect();
        for value in stale {
            if let Some(control) = self.controls.remove(&value) {
                surface.remove_control(control.handle);
                outcome.removed += 1;
            }
        }

        outcome.cleared = clear_vanished(histogram, filter);

        for (value, count) in histogram.iter() {
            let active = filter.is_active(value);
            match self.controls.get_mut(value) {
                Some(control) => {
                    if control.count != count || control.active != active {
                        control.count = count;
                        control.active = active;
                        surface.update_control(control.handle, &control.label());
                        outcome.updated += 1;
                    }
                }
                None => {
                    let mut control = FacetControl {
                        handle: ControlHandle::default(),
                        value: value.clone(),
                        count,
                        active,
                    };
                    control.handle =
                        surface.create_control(&control.label(), &ControlStyle::for_value(value));
                    self.controls.insert(value.clone(), control);
                    outcome.created += 1;
                }
            }
        }

        outcome
    }

    /// The toggle value bound to `handle`.
    pub fn value_of(&self, handle: ControlHandle) -> Option<FacetValue> {
        self.controls
            .values()
            .find(|c| c.handle == handle)
            .map(|c| c.value.clone())
    }

    pub fn get(&self, value: &FacetValue) -> Option<&FacetControl> {
        self.controls.get(value)
    }

    /// Controls ordered by facet, then value.
    pub fn controls(&self) -> impl Iterator<Item = &FacetControl> {
        self.controls.values()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Removes every control from the surface.
    pub fn clear<R: RenderSurface>(&mut self, surface: &mut R) {
        for control in std::mem::take(&mut self.controls).into_values() {
            surface.remove_control(control.handle);
        }
    }
}
