use super::PreferenceStore;
use crate::error::{EngineError, Result};

/// Preferences held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    numbering_enabled: Option<bool>,
    writes: usize,
    fail_reads: bool,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numbering(enabled: bool) -> Self {
        Self {
            numbering_enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// A store whose reads always fail.
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn numbering_enabled(&self) -> Result<Option<bool>> {
        if self.fail_reads {
            return Err(EngineError::Preference("store is unreadable".to_string()));
        }
        Ok(self.numbering_enabled)
    }

    fn set_numbering_enabled(&mut self, enabled: bool) -> Result<()> {
        self.numbering_enabled = Some(enabled);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_writes() {
        let mut prefs = InMemoryPreferences::new();
        assert_eq!(prefs.numbering_enabled().unwrap(), None);
        prefs.set_numbering_enabled(true).unwrap();
        prefs.set_numbering_enabled(false).unwrap();
        assert_eq!(prefs.numbering_enabled().unwrap(), Some(false));
        assert_eq!(prefs.writes(), 2);
    }

    #[test]
    fn unreadable_store_fails_reads() {
        assert!(InMemoryPreferences::unreadable().numbering_enabled().is_err());
    }
}
