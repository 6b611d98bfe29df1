//! JSON record store
//!
//! One file per logical record in the data directory, mirroring the
//! key-per-record layout of the persisted state: `passwords.json`,
//! `history.json`, `theme.json`, `digit_preference.json`, `ssid.json`.
//! Writes go through a temp file and rename.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use megapass_core::{
    ActionLog, DigitWidth, Error, MonthlyLedger, PersistenceGateway, Preferences, Theme,
};

/// Ledger record file
pub const PASSWORDS_FILE: &str = "passwords.json";

/// Action history record file
pub const HISTORY_FILE: &str = "history.json";

/// Preference record files
const THEME_FILE: &str = "theme.json";
const DIGIT_FILE: &str = "digit_preference.json";
const SSID_FILE: &str = "ssid.json";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record {file}: {source}")]
    Malformed {
        file: &'static str,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// File-backed record store for the MegaPass state
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    /// Create a store rooted at `base_path`, creating the directory
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Default data directory under the platform data dir
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("megapass"))
    }

    /// Base path of this store
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn read_record<T: DeserializeOwned>(
        &self,
        file: &'static str,
    ) -> Result<Option<T>, StorageError> {
        let path = self.base_path.join(file);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(StorageError::Malformed { file, source }),
        }
    }

    fn write_record<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let path = self.base_path.join(file);
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Saved record {:?}", path);
        Ok(())
    }
}

impl PersistenceGateway for Storage {
    fn load_ledger(&self) -> megapass_core::Result<Option<MonthlyLedger>> {
        self.read_record(PASSWORDS_FILE)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    fn save_ledger(&self, ledger: &MonthlyLedger) -> megapass_core::Result<()> {
        self.write_record(PASSWORDS_FILE, ledger)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    fn load_log(&self) -> megapass_core::Result<Option<ActionLog>> {
        self.read_record(HISTORY_FILE)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    fn save_log(&self, log: &ActionLog) -> megapass_core::Result<()> {
        self.write_record(HISTORY_FILE, log)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    fn load_prefs(&self) -> megapass_core::Result<Option<Preferences>> {
        let theme: Option<Theme> = self
            .read_record(THEME_FILE)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        let digit_width: Option<DigitWidth> = self
            .read_record(DIGIT_FILE)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        let network_name: Option<String> = self
            .read_record(SSID_FILE)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        if theme.is_none() && digit_width.is_none() && network_name.is_none() {
            return Ok(None);
        }

        let defaults = Preferences::default();
        Ok(Some(Preferences {
            theme: theme.unwrap_or(defaults.theme),
            digit_width: digit_width.unwrap_or(defaults.digit_width),
            network_name: network_name.unwrap_or(defaults.network_name),
        }))
    }

    fn save_prefs(&self, prefs: &Preferences) -> megapass_core::Result<()> {
        self.write_record(THEME_FILE, &prefs.theme)
            .and_then(|_| self.write_record(DIGIT_FILE, &prefs.digit_width))
            .and_then(|_| self.write_record(SSID_FILE, &prefs.network_name))
            .map_err(|e| Error::Persistence(e.to_string()))
    }
}
