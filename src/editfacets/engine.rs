//! # Change Coordinator
//!
//! [`Engine`] owns everything that lives while a monitored view is open and runs
//! the pass pipeline over it.
//!
//! ## Lifecycle
//!
//! ```text
//!            navigate(true)                 source found
//! TornDown ─────────────────▶ Searching ───────────────────▶ Active
//!    ▲                          │   ▲                          │
//!    │                  budget  │   │ navigate(true)           │
//!    │                exhausted ▼   │                          │
//!    │                          Idle                           │
//!    └──────────────────────── navigate(false) ◀───────────────┘
//! ```
//!
//! `navigate(false)` tears down from any state. Teardown unsubscribes, cancels every
//! timer, removes all controls and labels, and drops the filters with the rest of
//! the session. Coming back starts over from an empty filter.
//!
//! ## Passes
//!
//! One pass is: snapshot the source, classify every record, compute visibility,
//! reconcile the facet controls, apply visibility, then number. An active filter
//! whose value disappeared is cleared first and visibility and the histogram are
//! recomputed, all before the controls are diffed. Clearing only widens the
//! visible set, so this settles after one extra round; it is still capped.
//!
//! Structural-change notifications are coalesced: each one pushes the pending pass
//! back by `coalesce_ms`, and only the trailing one runs. User actions on filters
//! run a pass immediately and drop any pass still pending.

use crate::classify::classify;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::facets::{clear_vanished, FacetControl, FacetReconciler, Histogram};
use crate::filter::{is_visible, DateRange, FilterState};
use crate::model::{EditRecord, FacetValue, RecordId};
use crate::numbering::Numbering;
use crate::schedule::{after_ms, Clock, Scheduler, TimerKey};
use crate::source::{ControlHandle, RecordSource, RenderSurface, SourceLocator, Subscription};
use crate::store::PreferenceStore;
use chrono::NaiveDateTime;
use log::{debug, info, warn};

/// Upper bound on recompute rounds caused by filters cleared during one pass.
const MAX_CASCADES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for the record source; `attempts` lookups have failed so far.
    Searching { attempts: u32 },
    Active,
    /// The retry budget ran out. Only a new navigation restarts the search.
    Idle,
    TornDown,
}

/// State that only exists while the source is being monitored.
struct Session<S> {
    source: S,
    subscription: Subscription,
    filter: FilterState,
    reconciler: FacetReconciler,
    numbering: Numbering,
    highlighted: Option<RecordId>,
}

pub struct Engine<L: SourceLocator, R, P, C> {
    locator: L,
    surface: R,
    prefs: P,
    clock: C,
    config: EngineConfig,
    scheduler: Scheduler,
    state: EngineState,
    session: Option<Session<L::Source>>,
    numbering_enabled: bool,
    passes: usize,
}

impl<L, R, P, C> Engine<L, R, P, C>
where
    L: SourceLocator,
    R: RenderSurface,
    P: PreferenceStore,
    C: Clock,
{
    /// Builds an engine in the `TornDown` state. The numbering preference is read here, once.
    pub fn new(locator: L, surface: R, prefs: P, clock: C, config: EngineConfig) -> Self {
        let numbering_enabled = match prefs.numbering_enabled() {
            Ok(Some(enabled)) => enabled,
            Ok(None) => config.numbering_default,
            Err(e) => {
                warn!("Could not read numbering preference, using default: {}", e);
                config.numbering_default
            }
        };

        Self {
            locator,
            surface,
            prefs,
            clock,
            config,
            scheduler: Scheduler::new(),
            state: EngineState::TornDown,
            session: None,
            numbering_enabled,
            passes: 0,
        }
    }

    /// Reacts to the host moving between views.
    ///
    /// Entering a monitored view starts the search unless one is already running or
    /// the engine is active. Leaving it tears everything down.
    pub fn navigate(&mut self, monitored: bool) {
        if !monitored {
            self.teardown();
            return;
        }
        match self.state {
            EngineState::Active | EngineState::Searching { .. } => {
                debug!("Navigation ignored, engine is {:?}", self.state);
            }
            EngineState::Idle | EngineState::TornDown => {
                info!("Searching for the record source");
                self.state = EngineState::Searching { attempts: 0 };
                self.search();
            }
        }
    }

    /// Signals that records were inserted into or removed from the source.
    pub fn notify_structural_change(&mut self) {
        if self.state != EngineState::Active {
            return;
        }
        let deadline = after_ms(self.clock.now(), self.config.coalesce_ms);
        debug!("Structural change, pass deferred to {}", deadline);
        self.scheduler.schedule(TimerKey::Pass, deadline);
    }

    /// Runs every timer that is due. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let due = self.scheduler.take_due(self.clock.now());
        for key in &due {
            debug!("Timer fired: {:?}", key);
            match key {
                TimerKey::Pass => self.run_pass(),
                TimerKey::SearchRetry => self.search(),
                TimerKey::HighlightExpiry => self.clear_highlight(),
            }
        }
        due.len()
    }

    /// When the next timer is due, if any.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.scheduler.next_deadline()
    }

    /// Toggles the filter value bound to a rendered control.
    ///
    /// Returns `false` when the handle belongs to no live control.
    pub fn activate(&mut self, handle: ControlHandle) -> bool {
        let value = self
            .session
            .as_ref()
            .and_then(|session| session.reconciler.value_of(handle));
        match value {
            Some(value) => {
                self.select(&value);
                true
            }
            None => {
                debug!("No control for handle {}", handle);
                false
            }
        }
    }

    /// Toggles `value` in the filter and runs a pass.
    pub fn select(&mut self, value: &FacetValue) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let active = session.filter.toggle(value);
        info!(
            "{} filter {}",
            value,
            if active { "selected" } else { "cleared" }
        );
        self.filters_changed();
    }

    pub fn set_date_filter(&mut self, range: Option<DateRange>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.filter.set_date(range);
        match range {
            Some(range) => info!("Date filter set to {}..={}", range.start(), range.end()),
            None => info!("Date filter cleared"),
        }
        self.filters_changed();
    }

    /// Sets the date filter from user-typed bounds.
    ///
    /// A start bound that cannot be read clears the date filter. Returns the range applied.
    pub fn set_date_filter_text(&mut self, start: &str, end: Option<&str>) -> Option<DateRange> {
        let range = DateRange::from_text(start, end, self.clock.now());
        if range.is_none() && !start.trim().is_empty() {
            warn!("Could not read date {:?}, date filter cleared", start);
        }
        self.set_date_filter(range);
        range
    }

    pub fn clear_filters(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.filter = FilterState::new();
        info!("All filters cleared");
        self.filters_changed();
    }

    /// Turns numbering on or off and stores the choice.
    pub fn set_numbering(&mut self, enabled: bool) -> Result<()> {
        self.prefs.set_numbering_enabled(enabled)?;
        self.numbering_enabled = enabled;
        info!("Numbering {}", if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.run_pass();
        } else if let Some(session) = self.session.as_mut() {
            session.numbering.clear(&mut self.surface);
        }
        Ok(())
    }

    /// Scrolls to the `ordinal`-th visible record and highlights it briefly.
    pub fn go_to(&mut self, ordinal: usize) -> Result<RecordId> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::OutOfRange {
                requested: ordinal,
                visible: 0,
            });
        };
        let id = session.numbering.go_to(ordinal)?;

        self.surface.scroll_into_view(id);
        match session.highlighted.replace(id) {
            Some(previous) if previous == id => {}
            Some(previous) => {
                self.surface.set_highlight(previous, false);
                self.surface.set_highlight(id, true);
            }
            None => self.surface.set_highlight(id, true),
        }
        let expiry = after_ms(self.clock.now(), self.config.highlight_ms);
        self.scheduler.schedule(TimerKey::HighlightExpiry, expiry);
        debug!("Went to #{} ({})", ordinal, id);
        Ok(id)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The active filters, while a source is monitored.
    pub fn filters(&self) -> Option<&FilterState> {
        self.session.as_ref().map(|session| &session.filter)
    }

    pub fn controls(&self) -> impl Iterator<Item = &FacetControl> {
        self.session
            .iter()
            .flat_map(|session| session.reconciler.controls())
    }

    /// Visible records as of the last pass, in source order.
    pub fn visible_ids(&self) -> &[RecordId] {
        self.session
            .as_ref()
            .map(|session| session.numbering.visible())
            .unwrap_or(&[])
    }

    pub fn highlighted(&self) -> Option<RecordId> {
        self.session.as_ref().and_then(|session| session.highlighted)
    }

    pub fn numbering_enabled(&self) -> bool {
        self.numbering_enabled
    }

    /// Passes run since the engine was built.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn search(&mut self) {
        let EngineState::Searching { attempts } = self.state else {
            return;
        };
        let attempts = attempts + 1;

        match self.locator.locate() {
            Some(source) => self.start_session(source),
            None if attempts >= self.config.search_retry_limit => {
                warn!(
                    "Record source not found after {} attempts, giving up",
                    attempts
                );
                self.state = EngineState::Idle;
            }
            None => {
                debug!("Record source not found (attempt {})", attempts);
                self.state = EngineState::Searching { attempts };
                let retry = after_ms(self.clock.now(), self.config.search_retry_delay_ms);
                self.scheduler.schedule(TimerKey::SearchRetry, retry);
            }
        }
    }

    fn start_session(&mut self, mut source: L::Source) {
        let subscription = source.subscribe();
        self.session = Some(Session {
            source,
            subscription,
            filter: FilterState::new(),
            reconciler: FacetReconciler::new(),
            numbering: Numbering::new(),
            highlighted: None,
        });
        self.state = EngineState::Active;
        info!("Record source found, monitoring");
        self.run_pass();
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if let Some(mut session) = self.session.take() {
            session.source.unsubscribe(session.subscription);
            session.reconciler.clear(&mut self.surface);
            session.numbering.clear(&mut self.surface);
            if let Some(id) = session.highlighted.take() {
                self.surface.set_highlight(id, false);
            }
            for record in session.source.records() {
                self.surface.set_record_visible(record.id, true);
            }
        }
        if self.state != EngineState::TornDown {
            info!("Left monitored view, engine torn down");
        }
        self.state = EngineState::TornDown;
    }

    fn filters_changed(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.source.scroll_to_top();
        }
        self.scheduler.cancel(TimerKey::Pass);
        self.run_pass();
    }

    fn clear_highlight(&mut self) {
        if let Some(id) = self
            .session
            .as_mut()
            .and_then(|session| session.highlighted.take())
        {
            self.surface.set_highlight(id, false);
        }
    }

    fn run_pass(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let records: Vec<EditRecord> = session
            .source
            .records()
            .iter()
            .map(|raw| classify(raw, now, self.config.placeholders.as_slice()))
            .collect();

        // Settle the filters before any control is touched, so a control that is
        // still present once the view widens keeps its handle.
        let mut cascades = 0;
        let (visibility, histogram) = loop {
            let visibility: Vec<bool> = records
                .iter()
                .map(|record| is_visible(record, &session.filter))
                .collect();
            let histogram = Histogram::from_visible(
                records
                    .iter()
                    .zip(&visibility)
                    .filter(|(_, visible)| **visible)
                    .map(|(record, _)| record),
            );
            if cascades == MAX_CASCADES {
                break (visibility, histogram);
            }
            let cleared = clear_vanished(&histogram, &mut session.filter);
            if cleared.is_empty() {
                break (visibility, histogram);
            }
            debug!("Filters cleared during pass: {:?}", cleared);
            cascades += 1;
        };
        session
            .reconciler
            .reconcile(&histogram, &mut session.filter, &mut self.surface);

        let entries: Vec<(RecordId, bool)> = records
            .iter()
            .zip(&visibility)
            .map(|(record, visible)| (record.id, *visible))
            .collect();
        for (id, visible) in &entries {
            self.surface.set_record_visible(*id, *visible);
        }
        if self.numbering_enabled {
            session.numbering.renumber(&entries, &mut self.surface);
        } else {
            session.numbering.track(&entries);
        }

        self.passes += 1;
        debug!(
            "Pass {}: {} of {} records visible, {} loading",
            self.passes,
            session.numbering.visible().len(),
            records.len(),
            records.iter().filter(|record| record.loading).count()
        );
    }
}
