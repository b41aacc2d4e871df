//! # Numbering
//!
//! Visible records get ordinals `1..=N` in source order. Hidden records keep their
//! label element but it is suppressed, so a record that becomes visible again only
//! needs its number rewritten.
//!
//! The ordinal list is rebuilt from scratch every pass. It never depends on how the
//! current filter was reached, only on which records are visible now.
//!
//! When numbering is disabled the engine still calls [`Numbering::track`], so
//! [`Numbering::go_to`] works against the current visible set either way.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::model::RecordId;
use crate::source::RenderSurface;

#[derive(Debug, Default)]
pub struct Numbering {
    visible: Vec<RecordId>,
    labelled: Vec<RecordId>,
}

impl Numbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels `entries` (record id, visible) on the surface and remembers the visible ones.
    pub fn renumber<R: RenderSurface>(&mut self, entries: &[(RecordId, bool)], surface: &mut R) {
        // Records that left the source lose their label
        let present: HashSet<RecordId> = entries.iter().map(|(id, _)| *id).collect();
        for stale in self.labelled.iter().filter(|id| !present.contains(*id)) {
            surface.clear_ordinal(*stale);
        }

        let mut ordinal = 0;
        for (id, visible) in entries {
            if *visible {
                ordinal += 1;
                surface.show_ordinal(*id, ordinal);
            } else {
                surface.suppress_ordinal(*id);
            }
        }
        self.labelled = entries.iter().map(|(id, _)| *id).collect();
        self.track(entries);
    }

    /// Remembers the visible records without touching any label.
    pub fn track(&mut self, entries: &[(RecordId, bool)]) {
        self.visible = entries
            .iter()
            .filter(|(_, visible)| *visible)
            .map(|(id, _)| *id)
            .collect();
    }

    /// Removes every label from the surface.
    pub fn clear<R: RenderSurface>(&mut self, surface: &mut R) {
        for id in self.labelled.drain(..) {
            surface.clear_ordinal(id);
        }
    }

    pub fn visible(&self) -> &[RecordId] {
        &self.visible
    }

    pub fn is_labelled(&self) -> bool {
        !self.labelled.is_empty()
    }

    /// Resolves a 1-based ordinal to its record.
    pub fn go_to(&self, ordinal: usize) -> Result<RecordId> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.visible.get(index))
            .copied()
            .ok_or(EngineError::OutOfRange {
                requested: ordinal,
                visible: self.visible.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::RecordingSurface;

    fn ids(n: usize) -> Vec<RecordId> {
        (0..n).map(|_| RecordId::new()).collect()
    }

    #[test]
    fn visible_records_are_numbered_in_order() {
        let ids = ids(4);
        let entries = vec![
            (ids[0], true),
            (ids[1], false),
            (ids[2], true),
            (ids[3], true),
        ];
        let mut numbering = Numbering::new();
        let mut surface = RecordingSurface::new();

        numbering.renumber(&entries, &mut surface);

        assert_eq!(surface.shown_ordinal(ids[0]), Some(1));
        assert_eq!(surface.shown_ordinal(ids[1]), None);
        assert!(surface.ordinal(ids[1]).is_some());
        assert_eq!(surface.shown_ordinal(ids[2]), Some(2));
        assert_eq!(surface.shown_ordinal(ids[3]), Some(3));
        assert_eq!(numbering.visible(), &[ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn ordinals_depend_only_on_current_visibility() {
        let ids = ids(3);
        let mut numbering = Numbering::new();
        let mut surface = RecordingSurface::new();

        numbering.renumber(&[(ids[0], false), (ids[1], true), (ids[2], false)], &mut surface);
        numbering.renumber(&[(ids[0], true), (ids[1], false), (ids[2], true)], &mut surface);

        assert_eq!(surface.shown_ordinal(ids[0]), Some(1));
        assert_eq!(surface.shown_ordinal(ids[1]), None);
        assert_eq!(surface.shown_ordinal(ids[2]), Some(2));
    }

    #[test]
    fn removed_records_lose_their_label() {
        let ids = ids(2);
        let mut numbering = Numbering::new();
        let mut surface = RecordingSurface::new();

        numbering.renumber(&[(ids[0], true), (ids[1], true)], &mut surface);
        numbering.renumber(&[(ids[1], true)], &mut surface);

        assert_eq!(surface.ordinal(ids[0]), None);
        assert_eq!(surface.shown_ordinal(ids[1]), Some(1));
    }

    #[test]
    fn large_list_clears_only_departed_labels() {
        let ids = ids(500);
        let mut numbering = Numbering::new();
        let mut surface = RecordingSurface::new();
        let all: Vec<_> = ids.iter().map(|id| (*id, true)).collect();
        numbering.renumber(&all, &mut surface);

        let kept: Vec<_> = ids.iter().step_by(2).map(|id| (*id, true)).collect();
        numbering.renumber(&kept, &mut surface);

        for (index, id) in ids.iter().enumerate() {
            if index % 2 == 0 {
                assert_eq!(surface.shown_ordinal(*id), Some(index / 2 + 1));
            } else {
                assert_eq!(surface.ordinal(*id), None);
            }
        }
        assert_eq!(numbering.visible().len(), 250);
    }

    #[test]
    fn clear_removes_all_labels() {
        let ids = ids(2);
        let mut numbering = Numbering::new();
        let mut surface = RecordingSurface::new();
        numbering.renumber(&[(ids[0], true), (ids[1], false)], &mut surface);

        numbering.clear(&mut surface);

        assert!(!numbering.is_labelled());
        assert_eq!(surface.ordinal(ids[0]), None);
        assert_eq!(surface.ordinal(ids[1]), None);
    }

    #[test]
    fn go_to_is_bounds_checked() {
        let ids = ids(3);
        let mut numbering = Numbering::new();
        numbering.track(&[(ids[0], true), (ids[1], false), (ids[2], true)]);

        assert_eq!(numbering.go_to(1).unwrap(), ids[0]);
        assert_eq!(numbering.go_to(2).unwrap(), ids[2]);

        let err = numbering.go_to(3).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OutOfRange {
                requested: 3,
                visible: 2
            }
        ));
        assert!(numbering.go_to(0).is_err());
        assert_eq!(numbering.visible().len(), 2);
    }
}
