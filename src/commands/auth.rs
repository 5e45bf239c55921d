//! Account command handlers
//!
//! Registration, sign-in, and password management backed by the local
//! database. Passwords are prompted interactively when not supplied on
//! the command line.

use crate::auth::AuthService;
use crate::config::Config;
use crate::error::Result;
use crate::identity;

use colored::Colorize;
use rustyline::DefaultEditor;

use super::open_database;

/// Create a new free-tier account
pub fn register(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let db = open_database(config)?;
    let service = AuthService::new(&db);

    let password = match password {
        Some(p) => p,
        None => prompt_secret("Password: ")?,
    };

    let account = service.register(email, &password)?;

    println!("{}", format!("Account created for {}", account.email).green());
    println!("Sign in with: souschef auth login {}", account.email);
    Ok(())
}

/// Sign in and store the session token
pub fn login(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let db = open_database(config)?;
    let service = AuthService::new(&db);

    let password = match password {
        Some(p) => p,
        None => prompt_secret("Password: ")?,
    };

    let (account, token) = service.sign_in(email, &password)?;
    identity::store_token(&db, &token)?;

    println!("{}", format!("Signed in as {}", account.email).green());
    println!("Plan: {}", account.plan.to_string().cyan());
    Ok(())
}

/// Sign out of the current session
pub fn logout(config: &Config) -> Result<()> {
    let db = open_database(config)?;

    match identity::stored_token(&db) {
        Some(token) => {
            let service = AuthService::new(&db);
            service.sign_out(&token)?;
            identity::clear_token(&db)?;
            println!("Signed out");
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Reset the password for an account
pub fn reset_password(config: &Config, email: &str, new_password: Option<String>) -> Result<()> {
    let db = open_database(config)?;
    let service = AuthService::new(&db);

    let new_password = match new_password {
        Some(p) => p,
        None => prompt_secret("New password: ")?,
    };

    service.reset_password(email, &new_password)?;
    println!("{}", "Password updated".green());
    Ok(())
}

/// Show the signed-in account
pub fn whoami(config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let (who, account) = identity::current(&db)?;

    println!("Signed in as {}", who.email.cyan());
    println!("Plan:     {}", who.plan);
    println!("Sessions: {}", account.session_count);
    if let Some(last) = account.last_session {
        println!("Last session: {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

/// Prompt for a value the caller chose not to pass as an argument
fn prompt_secret(prompt: &str) -> Result<String> {
    let mut rl = DefaultEditor::new()?;
    let line = rl.readline(prompt)?;
    Ok(line.trim().to_string())
}
