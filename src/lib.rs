//! SousChef - Smart recipe assistant CLI library
//!
//! This library provides the core functionality for the SousChef recipe
//! assistant, including freemium session gating, chat provider
//! abstractions, recipe storage, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Eligibility policy, timers, and the gated session lifecycle
//! - `providers`: Chat provider abstraction and implementations (OpenAI, Ollama)
//! - `suggestions`: Reply trigger detection and recipe lookup
//! - `store`: SQLite-backed persistence for users, recipes, and settings
//! - `auth`: Registration, sign-in, and password management
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use souschef::store::Database;
//! use souschef::suggestions::TriggerDetector;
//!
//! # fn main() -> anyhow::Result<()> {
//! let db = Database::open(None)?;
//! let detector = TriggerDetector::new();
//! assert!(detector.is_triggered("Here are some recipe suggestions for you"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod store;
pub mod suggestions;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SousChefError};
pub use identity::Identity;
pub use session::{AccessDecision, GatedSession, SessionPolicy};
pub use store::Database;
