//! Error types for SousChef
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SousChef operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, account authentication, session gating,
/// store access, and chat-provider interactions.
///
/// Account and credential variants carry the exact user-facing message
/// as their display string, so handlers can print them directly.
#[derive(Error, Debug)]
pub enum SousChefError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registration attempted with an email that already has an account
    #[error("Email is already in use")]
    EmailInUse,

    /// Email address failed format validation
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password rejected by the minimum-length rule
    #[error("Password should be at least 6 characters")]
    WeakPassword,

    /// Sign-in failed: unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-in attempted against a disabled account
    #[error("This account has been disabled")]
    AccountDisabled,

    /// Identity provider throttled repeated failed sign-ins
    #[error("Too many failed attempts. Try again later")]
    TooManyAttempts,

    /// Password reset requested for an email with no account
    #[error("No account found with this email")]
    AccountNotFound,

    /// No login token present; the command needs `auth login` first
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    /// Missing credentials for a chat provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Chat provider rejected the configured credential (e.g. 401)
    #[error("Provider authentication failed: {0}")]
    ProviderAuth(String),

    /// Chat provider throttled the request (e.g. 429); retry manually
    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    /// Chat provider returned a server-side failure (5xx); retry manually
    #[error("Provider server error: {0}")]
    ProviderServer(String),

    /// Chat provider response did not match the expected shape
    #[error("Unexpected response format from provider: {0}")]
    MalformedResponse(String),

    /// Residual provider errors (connectivity, unknown status codes)
    #[error("Provider error: {0}")]
    Provider(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SousChefError {
    /// Whether the user should be offered a manual retry.
    ///
    /// True only for transient provider failures (rate limiting and
    /// upstream server errors); credential and account errors are not
    /// retryable without user action.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            SousChefError::RateLimited(_) | SousChefError::ProviderServer(_)
        )
    }
}

/// Result type alias for SousChef operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
