//! Command-line interface definition for SousChef
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat sessions, recipes, preferences,
//! account management, and administration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SousChef - Smart recipe assistant CLI
///
/// Chat with an AI recipe assistant, browse the recipe catalog, and
/// manage dietary preferences. Free accounts get one timed session
/// per week; premium accounts chat without limits.
#[derive(Parser, Debug, Clone)]
#[command(name = "souschef")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the provider from config (openai, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Path to the SQLite database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SousChef
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage your account
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Start an assistant chat session
    Chat {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Browse the recipe catalog
    Recipes {
        #[command(subcommand)]
        command: RecipeCommand,
    },

    /// View or update cooking preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Administrative tools
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Verify provider connectivity and credentials
    Verify,
}

/// Account management commands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Create a new account
    Register {
        /// Email address for the account
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        /// Email address for the account
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out of the current session
    Logout,

    /// Reset the password for an account
    ResetPassword {
        /// Email address for the account
        email: String,

        /// New password (prompted interactively when omitted)
        #[arg(short, long)]
        new_password: Option<String>,
    },

    /// Show the signed-in account
    Whoami,
}

/// Recipe catalog commands
#[derive(Subcommand, Debug, Clone)]
pub enum RecipeCommand {
    /// List recipes, optionally filtered by dietary tags
    List {
        /// Dietary tags to filter by (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Show a single recipe in full
    Show {
        /// Recipe id
        id: String,
    },

    /// Show the newest recipes
    Featured {
        /// Number of recipes to show
        #[arg(short, long)]
        count: Option<usize>,
    },
}

/// Preference commands
#[derive(Subcommand, Debug, Clone)]
pub enum PrefsCommand {
    /// Show the current preferences
    Show,

    /// Update preference fields
    Set {
        /// Dietary tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        dietary_tags: Option<Vec<String>>,

        /// Kitchen tools on hand (comma-separated)
        #[arg(long, value_delimiter = ',')]
        kitchen_tools: Option<Vec<String>>,

        /// Preferred cooking time in minutes
        #[arg(long)]
        cooking_time: Option<u32>,

        /// Weekly grocery budget in dollars
        #[arg(long)]
        budget: Option<f64>,

        /// Favor weekly special ingredients
        #[arg(long)]
        use_weekly_specials: Option<bool>,
    },

    /// Manage pantry items
    Pantry {
        #[command(subcommand)]
        command: PantryCommand,
    },
}

/// Pantry item commands
#[derive(Subcommand, Debug, Clone)]
pub enum PantryCommand {
    /// Add an item to the pantry
    Add {
        /// Item name
        item: String,
    },

    /// Remove an item from the pantry
    Remove {
        /// Item name
        item: String,
    },
}

/// Administrative commands
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    /// Seed the catalog with sample recipes
    Seed,

    /// View or update freemium settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Show usage statistics
    Stats,

    /// Change the plan for an account
    SetPlan {
        /// Email address for the account
        email: String,

        /// Plan tier (free, premium)
        plan: String,
    },
}

/// Freemium settings commands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,

    /// Update settings fields
    Set {
        /// Free session length in seconds
        #[arg(long)]
        session_time: Option<u64>,

        /// Days between free sessions
        #[arg(long)]
        session_frequency: Option<u32>,

        /// Sponsor message length in seconds
        #[arg(long)]
        ad_duration: Option<u64>,

        /// Require an email address at registration
        #[arg(long)]
        require_email: Option<bool>,

        /// Show the sponsor message before free sessions
        #[arg(long)]
        show_ad: Option<bool>,

        /// Enable PDF export (premium)
        #[arg(long)]
        pdf_export: Option<bool>,

        /// Enable emailed meal plans (premium)
        #[arg(long)]
        email_plan: Option<bool>,

        /// Enable photo upload (premium)
        #[arg(long)]
        photo_upload: Option<bool>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
