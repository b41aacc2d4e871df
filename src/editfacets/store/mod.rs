//! # Preference Storage
//!
//! One persisted setting: whether records are numbered. The engine reads it once
//! when it is built and writes it on every toggle.
//!
//! ## Implementations
//!
//! - [`fs::FilePreferences`]: `preferences.json` in the data directory.
//! - [`memory::InMemoryPreferences`]: no persistence, for tests and embedding.

use crate::error::Result;

pub mod fs;
pub mod memory;

pub trait PreferenceStore {
    /// The stored numbering preference, or `None` if it was never set.
    fn numbering_enabled(&self) -> Result<Option<bool>>;

    fn set_numbering_enabled(&mut self, enabled: bool) -> Result<()>;
}
