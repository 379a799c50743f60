use crate::error::StoreError;
use crate::settings::Settings;
use sled::Db;
use std::path::Path;

const SETTINGS_KEY: &str = "settings";

/// Persists [`Settings`] between sessions. The graph itself is never stored.
pub struct SettingsStore {
    db: Db,
}

impl SettingsStore {
    /// Opens or creates a settings store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the settings under a fixed key and flushes to disk.
    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let bytes = bincode::serialize(settings)?;
        self.db.insert(SETTINGS_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the saved settings, clamped into their supported ranges.
    pub fn load(&self) -> Result<Option<Settings>, StoreError> {
        if let Some(bytes) = self.db.get(SETTINGS_KEY)? {
            let settings: Settings = bincode::deserialize(&bytes)?;
            Ok(Some(settings.sanitized()))
        } else {
            Ok(None)
        }
    }

    /// Loads the saved settings or falls back to defaults.
    pub fn load_or_default(&self) -> Result<Settings, StoreError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Clears the stored settings.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.remove(SETTINGS_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}
