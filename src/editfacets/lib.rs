//! # Editfacets Architecture
//!
//! Editfacets filters a live, read-only list of map edits by status, type and date,
//! keeps a count control for every value present, and numbers whatever is visible.
//! The list streams in while the user works with it: records appear half-rendered,
//! fill in later, and get inserted or removed at any time.
//!
//! The library never touches a terminal, a browser or a timer of its own. The host
//! hands it three collaborators (see [`source`]) and a [`schedule::Clock`], calls
//! [`engine::Engine::tick`] when a deadline passes, and forwards user actions.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌───────────────────────┐
//! │ RecordSource │──▶│ classify   │──▶│ filter     │──▶│ facets + numbering    │──▶ RenderSurface
//! │ (snapshot)   │   │ (+ dates)  │   │ visibility │   │ (reconcile, ordinals) │
//! └──────────────┘   └────────────┘   └────────────┘   └───────────────────────┘
//! ```
//!
//! Each pass consumes only the previous stage's output. Passes are triggered by
//! structural changes (coalesced), by filter actions (immediate) and by turning
//! numbering back on.
//!
//! ## Key Rule: Never Hide What Has Not Loaded
//!
//! A record whose text is still a placeholder is visible under every filter, and a
//! record without a readable date is never removed by a date filter. Counts only
//! include records that are both visible and loaded.
//!
//! ## Module Overview
//!
//! - [`model`]: records, statuses and facet values
//! - [`dates`]: free-text date parsing shared by records and filter bounds
//! - [`classify`]: raw text to [`model::EditRecord`]
//! - [`filter`]: filter state and the visibility predicate
//! - [`facets`]: histogram and control reconciliation
//! - [`numbering`]: ordinals and go-to
//! - [`schedule`]: clocks and coalescing timers
//! - [`source`]: collaborator traits and in-memory implementations
//! - [`store`]: the numbering preference
//! - [`config`]: timings and placeholder tokens
//! - [`engine`]: lifecycle and the pass pipeline
//! - [`error`]: error types

pub mod classify;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod facets;
pub mod filter;
pub mod model;
pub mod numbering;
pub mod schedule;
pub mod source;
pub mod store;
