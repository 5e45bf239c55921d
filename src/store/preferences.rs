//! Per-user preference storage
//!
//! One JSON record per user. Missing rows read as the defaults and
//! fields absent from a stored record take their default values, so
//! preference records written by older builds keep working.

use super::connect;
use super::types::UserPreferences;
use crate::error::{Result, SousChefError};
use anyhow::Context;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::path::PathBuf;

/// SQLite-backed preferences store
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    db_path: PathBuf,
}

impl PreferencesStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Load preferences for a user, defaulting when none are stored
    pub fn load(&self, user_id: &str) -> Result<UserPreferences> {
        let conn = connect(&self.db_path)?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM preferences WHERE user_id = ?1",
                params![user_id],
                |r| r.get(0),
            )
            .optional()
            .context("Failed to query preferences")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        match value {
            Some(json) => serde_json::from_str(&json)
                .context("Failed to parse preferences")
                .map_err(|e| SousChefError::Storage(e.to_string()).into()),
            None => Ok(UserPreferences::default()),
        }
    }

    /// Persist preferences for a user
    pub fn save(&self, user_id: &str, preferences: &UserPreferences) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let value = serde_json::to_string(preferences)
            .context("Failed to serialize preferences")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO preferences (user_id, value, updated_at) VALUES (?1, ?2, ?3)",
            params![user_id, value, Utc::now().to_rfc3339()],
        )
        .context("Failed to save preferences")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Add an item to the user's pantry
    ///
    /// Adding an item that is already present is a no-op. Returns the
    /// updated preferences.
    pub fn add_pantry_item(&self, user_id: &str, item: &str) -> Result<UserPreferences> {
        let mut preferences = self.load(user_id)?;
        if !preferences.pantry_items.iter().any(|i| i == item) {
            preferences.pantry_items.push(item.to_string());
            self.save(user_id, &preferences)?;
        }
        Ok(preferences)
    }

    /// Remove an item from the user's pantry
    ///
    /// Removing an item that is not present is a no-op. Returns the
    /// updated preferences.
    pub fn remove_pantry_item(&self, user_id: &str, item: &str) -> Result<UserPreferences> {
        let mut preferences = self.load(user_id)?;
        let before = preferences.pantry_items.len();
        preferences.pantry_items.retain(|i| i != item);
        if preferences.pantry_items.len() != before {
            self.save(user_id, &preferences)?;
        }
        Ok(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use tempfile::TempDir;

    fn create_test_store() -> (PreferencesStore, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let db = Database::open_at(dir.path().join("test.db")).expect("open failed");
        (db.preferences(), dir)
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let (store, _dir) = create_test_store();
        let prefs = store.load("user-1").expect("load");
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.cooking_time, 30);
        assert!((prefs.budget - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (store, _dir) = create_test_store();

        let prefs = UserPreferences {
            dietary_tags: vec!["Vegan".to_string()],
            pantry_items: vec!["Rice".to_string(), "Beans".to_string()],
            kitchen_tools: vec!["Instant Pot".to_string()],
            cooking_time: 45,
            budget: 40.0,
            use_weekly_specials: true,
        };
        store.save("user-1", &prefs).expect("save");

        assert_eq!(store.load("user-1").expect("load"), prefs);
        // Other users are unaffected.
        assert_eq!(
            store.load("user-2").expect("load"),
            UserPreferences::default()
        );
    }

    #[test]
    fn test_load_partial_record_fills_defaults() {
        let (store, dir) = create_test_store();

        let conn =
            rusqlite::Connection::open(dir.path().join("test.db")).expect("open connection");
        conn.execute(
            "INSERT INTO preferences (user_id, value, updated_at) VALUES ('user-1', ?1, ?2)",
            params![r#"{"dietary_tags": ["Keto"]}"#, Utc::now().to_rfc3339()],
        )
        .expect("insert");

        let prefs = store.load("user-1").expect("load");
        assert_eq!(prefs.dietary_tags, vec!["Keto".to_string()]);
        assert_eq!(prefs.cooking_time, 30);
        assert!(prefs.pantry_items.is_empty());
    }

    #[test]
    fn test_load_corrupt_record_fails() {
        let (store, dir) = create_test_store();

        let conn =
            rusqlite::Connection::open(dir.path().join("test.db")).expect("open connection");
        conn.execute(
            "INSERT INTO preferences (user_id, value, updated_at) VALUES ('user-1', ?1, ?2)",
            params!["not json", Utc::now().to_rfc3339()],
        )
        .expect("insert");

        assert!(store.load("user-1").is_err());
    }

    #[test]
    fn test_pantry_add_and_remove() {
        let (store, _dir) = create_test_store();

        let prefs = store.add_pantry_item("user-1", "Rice").expect("add");
        assert_eq!(prefs.pantry_items, vec!["Rice".to_string()]);

        store.add_pantry_item("user-1", "Beans").expect("add");
        // Adding a duplicate does not grow the list.
        let prefs = store.add_pantry_item("user-1", "Rice").expect("add");
        assert_eq!(
            prefs.pantry_items,
            vec!["Rice".to_string(), "Beans".to_string()]
        );

        let prefs = store.remove_pantry_item("user-1", "Rice").expect("remove");
        assert_eq!(prefs.pantry_items, vec!["Beans".to_string()]);

        // Removing something absent is a no-op.
        let prefs = store
            .remove_pantry_item("user-1", "Anchovies")
            .expect("remove");
        assert_eq!(prefs.pantry_items, vec!["Beans".to_string()]);
    }
}
