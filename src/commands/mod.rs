/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes six top-level command modules:

- `chat`    — Interactive gated chat session
- `auth`    — Account registration and sign-in
- `recipes` — Recipe catalog browsing
- `prefs`   — Cooking preference management
- `admin`   — Seeding, freemium settings, and usage stats
- `verify`  — Provider connectivity check

These handlers are intentionally small and use the library components:
providers, the session gate, and the stores.
*/

pub mod admin;
pub mod auth;
pub mod chat;
pub mod prefs;
pub mod recipes;
pub mod verify;

use crate::config::Config;
use crate::error::Result;
use crate::store::Database;

/// Open the database honoring the configured storage path
pub(crate) fn open_database(config: &Config) -> Result<Database> {
    Database::open(config.storage.path.as_deref())
}
