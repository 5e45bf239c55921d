//! Freemium settings storage
//!
//! A single JSON record under the `freemium` key. Loads degrade to the
//! defaults on any failure so session gating never blocks on a missing
//! or unreadable settings row.

use super::connect;
use super::types::FreemiumSettings;
use crate::error::{Result, SousChefError};
use anyhow::Context;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::path::PathBuf;
use tracing::warn;

const FREEMIUM_KEY: &str = "freemium";

/// SQLite-backed freemium settings store
#[derive(Debug, Clone)]
pub struct SettingsStore {
    db_path: PathBuf,
}

impl SettingsStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Load the freemium settings
    ///
    /// Missing rows, unreadable JSON, and connection failures all fall
    /// back to [`FreemiumSettings::default`]. Fields absent from the
    /// stored record take their default values.
    pub fn load(&self) -> FreemiumSettings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => FreemiumSettings::default(),
            Err(e) => {
                warn!("Failed to load freemium settings, using defaults: {}", e);
                FreemiumSettings::default()
            }
        }
    }

    /// Persist the freemium settings
    pub fn save(&self, settings: &FreemiumSettings) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let value = serde_json::to_string(settings)
            .context("Failed to serialize settings")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO settings (name, value, updated_at) VALUES (?1, ?2, ?3)",
            params![FREEMIUM_KEY, value, Utc::now().to_rfc3339()],
        )
        .context("Failed to save settings")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    fn try_load(&self) -> Result<Option<FreemiumSettings>> {
        let conn = connect(&self.db_path)?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?1",
                params![FREEMIUM_KEY],
                |r| r.get(0),
            )
            .optional()
            .context("Failed to query settings")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let settings = serde_json::from_str(&json)
                    .context("Failed to parse settings")
                    .map_err(|e| SousChefError::Storage(e.to_string()))?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let db = Database::open_at(dir.path().join("test.db")).expect("open failed");
        (db.settings(), dir)
    }

    #[test]
    fn test_load_missing_row_returns_defaults() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.load(), FreemiumSettings::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (store, _dir) = create_test_store();

        let settings = FreemiumSettings {
            session_time: 60,
            session_frequency: 3,
            ad_duration: 5,
            show_ad: false,
            pdf_export: true,
            ..FreemiumSettings::default()
        };
        store.save(&settings).expect("save");

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_load_partial_record_fills_defaults() {
        let (store, dir) = create_test_store();

        let conn = Connection::open(dir.path().join("test.db")).expect("open connection");
        conn.execute(
            "INSERT INTO settings (name, value, updated_at) VALUES ('freemium', ?1, ?2)",
            params![r#"{"session_time": 45}"#, Utc::now().to_rfc3339()],
        )
        .expect("insert");

        let loaded = store.load();
        assert_eq!(loaded.session_time, 45);
        assert_eq!(loaded.session_frequency, 7);
        assert_eq!(loaded.ad_duration, 15);
        assert!(loaded.show_ad);
    }

    #[test]
    fn test_load_corrupt_record_returns_defaults() {
        let (store, dir) = create_test_store();

        let conn = Connection::open(dir.path().join("test.db")).expect("open connection");
        conn.execute(
            "INSERT INTO settings (name, value, updated_at) VALUES ('freemium', ?1, ?2)",
            params!["not json", Utc::now().to_rfc3339()],
        )
        .expect("insert");

        assert_eq!(store.load(), FreemiumSettings::default());
    }

    #[test]
    fn test_load_unreachable_database_returns_defaults() {
        let dir = TempDir::new().expect("failed to create tempdir");
        // Pointing at a directory makes every connection attempt fail.
        let store = SettingsStore::new(dir.path().to_path_buf());
        assert_eq!(store.load(), FreemiumSettings::default());
    }
}
