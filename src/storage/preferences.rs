use super::LocalStore;
use crate::error::AppResult;

pub const DARK_MODE_KEY: &str = "darkMode";

/// UI preferences
#[derive(Clone, Debug)]
pub struct Preferences {
    store: LocalStore,
}

impl Preferences {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn dark_mode(&self) -> bool {
        self.store
            .get::<bool>(DARK_MODE_KEY)
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> AppResult<()> {
        self.store.set(DARK_MODE_KEY, &enabled)
    }

    /// Returns the new value
    pub fn toggle_dark_mode(&self) -> AppResult<bool> {
        let enabled = !self.dark_mode();
        self.set_dark_mode(enabled)?;
        Ok(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_mode_defaults_off_and_toggles() {
        let prefs = Preferences::new(LocalStore::in_memory());
        assert!(!prefs.dark_mode());
        assert!(prefs.toggle_dark_mode().unwrap());
        assert!(prefs.dark_mode());
        assert!(!prefs.toggle_dark_mode().unwrap());
    }
}
