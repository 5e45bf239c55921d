//! Current-user resolution
//!
//! The CLI keeps the active login token in a small file next to the
//! database. Commands that need an account resolve that token through
//! the user store; a missing or stale token surfaces as a not-signed-in
//! error with a hint about what to run.

use crate::error::{Result, SousChefError};
use crate::store::{Database, PlanTier, UserAccount};
use anyhow::Context;
use std::path::PathBuf;

/// The signed-in user as seen by gated commands
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub plan: PlanTier,
}

impl Identity {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            user_id: account.id.clone(),
            email: account.email.clone(),
            plan: account.plan,
        }
    }
}

/// Where the active login token lives for this database
pub fn session_token_path(db: &Database) -> PathBuf {
    db.path().with_extension("session")
}

/// Persist the active login token
pub fn store_token(db: &Database, token: &str) -> Result<()> {
    std::fs::write(session_token_path(db), token).context("Failed to write session token")?;
    Ok(())
}

/// Forget the active login token
///
/// Clearing when no token is stored is not an error.
pub fn clear_token(db: &Database) -> Result<()> {
    match std::fs::remove_file(session_token_path(db)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove session token"),
    }
}

/// The stored login token, if any
pub fn stored_token(db: &Database) -> Option<String> {
    std::fs::read_to_string(session_token_path(db))
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve the stored login token to an account
///
/// # Errors
///
/// Returns [`SousChefError::NotSignedIn`] when no token is stored or
/// the stored token no longer resolves to an account.
pub fn current(db: &Database) -> Result<(Identity, UserAccount)> {
    let token = stored_token(db).ok_or_else(|| {
        SousChefError::NotSignedIn("run `souschef auth login` to start".to_string())
    })?;

    match db.users().login_user(&token)? {
        Some(account) => Ok((Identity::from_account(&account), account)),
        None => Err(SousChefError::NotSignedIn(
            "the stored session is no longer valid, sign in again".to_string(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let db = Database::open_at(dir.path().join("test.db")).expect("open failed");
        (db, dir)
    }

    #[test]
    fn test_current_without_token() {
        let (db, _dir) = create_test_db();

        let err = current(&db).expect_err("should fail");
        assert!(err.to_string().contains("Not signed in"));
        assert!(err.to_string().contains("souschef auth login"));
    }

    #[test]
    fn test_token_roundtrip() {
        let (db, _dir) = create_test_db();
        let auth = AuthService::new(&db);

        let account = auth.register("cook@example.com", "secret1").expect("register");
        let (_, token) = auth.sign_in("cook@example.com", "secret1").expect("sign in");
        store_token(&db, &token).expect("store token");

        let (identity, resolved) = current(&db).expect("current");
        assert_eq!(identity.user_id, account.id);
        assert_eq!(identity.email, "cook@example.com");
        assert_eq!(resolved.id, account.id);

        clear_token(&db).expect("clear");
        assert!(current(&db).is_err());
        // Clearing twice is a no-op.
        clear_token(&db).expect("clear again");
    }

    #[test]
    fn test_stale_token_is_rejected() {
        let (db, _dir) = create_test_db();
        let auth = AuthService::new(&db);

        auth.register("cook@example.com", "secret1").expect("register");
        let (_, token) = auth.sign_in("cook@example.com", "secret1").expect("sign in");
        store_token(&db, &token).expect("store token");

        // Signing out elsewhere invalidates the stored token.
        auth.sign_out(&token).expect("sign out");

        let err = current(&db).expect_err("should fail");
        assert!(err.to_string().contains("no longer valid"));
    }

    #[test]
    fn test_stored_token_ignores_blank_file() {
        let (db, _dir) = create_test_db();
        std::fs::write(session_token_path(&db), "  \n").expect("write");
        assert!(stored_token(&db).is_none());
    }
}
