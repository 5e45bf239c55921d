//! Provider verification command handler
//!
//! Sends a minimal completion request so configuration and credential
//! problems surface before a session is spent on them.

use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;

use colored::Colorize;

/// Verify provider connectivity and credentials
pub async fn run_verify(config: &Config) -> Result<()> {
    let provider = create_provider(config)?;

    println!("Verifying {} ({})...", provider.name(), provider.model());
    provider.verify().await?;

    println!("{}", "Provider verified".green());
    Ok(())
}
