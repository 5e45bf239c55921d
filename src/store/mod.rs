//! Persistence layer for SousChef
//!
//! A single SQLite database file holds user accounts, login tokens,
//! recipes, the freemium settings record, and per-user preferences.
//! Each store struct owns the database path and opens a connection per
//! call; there is no long-lived connection state to share between
//! commands.

use crate::error::{Result, SousChefError};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub mod preferences;
pub mod recipes;
pub mod settings;
pub mod types;
pub mod users;

pub use preferences::PreferencesStore;
pub use recipes::{RecipeStore, SqliteRecipeStore};
pub use settings::SettingsStore;
pub use types::{
    AdminStats, Difficulty, FreemiumSettings, Ingredient, NewRecipe, NutritionFacts, PlanTier,
    RecentUser, RecipeRecord, UserAccount, UserPreferences,
};
pub use users::{SqliteUserStore, UserStore};

/// Handle to the application database
///
/// Resolves the database location, initializes the schema, and hands
/// out the per-concern store structs.
#[derive(Debug, Clone)]
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    /// Open the application database
    ///
    /// Resolution order: the `SOUSCHEF_DB` environment variable, then the
    /// configured path, then `souschef.db` in the platform data directory.
    /// The environment override makes it easy to point the binary at a
    /// test database without touching the user's application data dir.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined or the
    /// schema cannot be initialized.
    pub fn open(configured: Option<&Path>) -> Result<Self> {
        if let Ok(override_path) = std::env::var("SOUSCHEF_DB") {
            return Self::open_at(override_path);
        }

        if let Some(path) = configured {
            return Self::open_at(path.to_path_buf());
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "souschef")
            .ok_or_else(|| SousChefError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Self::open_at(data_dir.join("souschef.db"))
    }

    /// Open the database at the specified path
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temp directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use souschef::store::Database;
    ///
    /// let db = Database::open_at("/tmp/souschef-doctest.db").unwrap();
    /// assert!(db.path().ends_with("souschef-doctest.db"));
    /// ```
    pub fn open_at<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| SousChefError::Storage(e.to_string()))?;
        }

        let db = Self { db_path };
        db.init()?;
        Ok(db)
    }

    /// The resolved database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// User store over this database
    pub fn users(&self) -> SqliteUserStore {
        SqliteUserStore::new(self.db_path.clone())
    }

    /// Recipe store over this database
    pub fn recipes(&self) -> SqliteRecipeStore {
        SqliteRecipeStore::new(self.db_path.clone())
    }

    /// Freemium settings store over this database
    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.db_path.clone())
    }

    /// Preferences store over this database
    pub fn preferences(&self) -> PreferencesStore {
        PreferencesStore::new(self.db_path.clone())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_digest TEXT NOT NULL,
                plan TEXT NOT NULL DEFAULT 'free',
                disabled INTEGER NOT NULL DEFAULT 0,
                failed_attempts INTEGER NOT NULL DEFAULT 0,
                last_failed_at TEXT,
                last_session TEXT,
                session_count INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS logins (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                image TEXT NOT NULL,
                prep_time INTEGER NOT NULL,
                cook_time INTEGER NOT NULL,
                servings INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                dietary_tags JSON NOT NULL,
                ingredients JSON NOT NULL,
                instructions JSON NOT NULL,
                nutrition JSON NOT NULL,
                estimated_cost REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                value JSON NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS preferences (
                user_id TEXT PRIMARY KEY,
                value JSON NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .context("Failed to create tables")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// Open a connection with storage-flavored error mapping
pub(crate) fn connect(db_path: &Path) -> Result<Connection> {
    Connection::open(db_path)
        .context("Failed to open database")
        .map_err(|e| SousChefError::Storage(e.to_string()).into())
}
