//! User account and login token storage

use super::connect;
use super::types::{PlanTier, RecentUser, UserAccount};
use crate::error::{Result, SousChefError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use std::path::PathBuf;
use uuid::Uuid;

/// Account reads and writes needed by the session recorder
///
/// The sqlite store is the only production implementation; the trait
/// exists so the recording path can be exercised against failing or
/// scripted stores in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account by id
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserAccount>>;

    /// Stamp a session start onto an existing account
    ///
    /// Overwrites `last_session` and `session_count` and bumps
    /// `updated_at`. The account row must already exist.
    async fn record_session(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
        session_count: u32,
    ) -> Result<()>;
}

/// SQLite-backed user store
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    db_path: PathBuf,
}

fn account_from_row(row: &Row) -> rusqlite::Result<UserAccount> {
    let plan: String = row.get(2)?;
    let last_session: Option<String> = row.get(4)?;
    let session_count: Option<i64> = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(UserAccount {
        id: row.get(0)?,
        email: row.get(1)?,
        plan: PlanTier::parse_str(&plan).unwrap_or_default(),
        disabled: row.get(3)?,
        last_session: last_session.and_then(|ts| {
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }),
        session_count: session_count.unwrap_or(0).max(0) as u32,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl SqliteUserStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Create a new free-tier account
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails, including when the email is
    /// already taken.
    pub fn insert(&self, email: &str, password_digest: &str) -> Result<UserAccount> {
        let conn = connect(&self.db_path)?;
        let now = Utc::now();
        let account = UserAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            plan: PlanTier::Free,
            disabled: false,
            last_session: None,
            session_count: 0,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO users (id, email, password_digest, plan, disabled, last_session, session_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, NULL, 0, ?5, ?5)",
            params![
                account.id,
                account.email,
                password_digest,
                account.plan.to_string(),
                now.to_rfc3339(),
            ],
        )
        .context("Failed to insert user")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(account)
    }

    /// Look up an account by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let conn = connect(&self.db_path)?;

        let account = conn
            .query_row(
                "SELECT id, email, plan, disabled, last_session, session_count, created_at, updated_at
                 FROM users WHERE email = ?1",
                params![email],
                account_from_row,
            )
            .optional()
            .context("Failed to query user")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(account)
    }

    /// Look up an account together with its stored password digest
    pub fn credentials(&self, email: &str) -> Result<Option<(UserAccount, String)>> {
        let conn = connect(&self.db_path)?;

        let found = conn
            .query_row(
                "SELECT id, email, plan, disabled, last_session, session_count, created_at, updated_at, password_digest
                 FROM users WHERE email = ?1",
                params![email],
                |row| {
                    let account = account_from_row(row)?;
                    let digest: String = row.get(8)?;
                    Ok((account, digest))
                },
            )
            .optional()
            .context("Failed to query credentials")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(found)
    }

    /// Replace the password digest for an account
    ///
    /// # Errors
    ///
    /// Returns [`SousChefError::AccountNotFound`] if no account has this
    /// email.
    pub fn update_password(&self, email: &str, password_digest: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let rows = conn
            .execute(
                "UPDATE users SET password_digest = ?1, updated_at = ?2 WHERE email = ?3",
                params![password_digest, Utc::now().to_rfc3339(), email],
            )
            .context("Failed to update password")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        if rows == 0 {
            return Err(SousChefError::AccountNotFound.into());
        }

        Ok(())
    }

    /// Change the plan tier for an account
    ///
    /// # Errors
    ///
    /// Returns [`SousChefError::AccountNotFound`] if no account has this
    /// email.
    pub fn set_plan(&self, email: &str, plan: PlanTier) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let rows = conn
            .execute(
                "UPDATE users SET plan = ?1, updated_at = ?2 WHERE email = ?3",
                params![plan.to_string(), Utc::now().to_rfc3339(), email],
            )
            .context("Failed to update plan")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        if rows == 0 {
            return Err(SousChefError::AccountNotFound.into());
        }

        Ok(())
    }

    /// Block or unblock sign-in for an account
    pub fn set_disabled(&self, email: &str, disabled: bool) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let rows = conn
            .execute(
                "UPDATE users SET disabled = ?1, updated_at = ?2 WHERE email = ?3",
                params![disabled, Utc::now().to_rfc3339(), email],
            )
            .context("Failed to update disabled flag")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        if rows == 0 {
            return Err(SousChefError::AccountNotFound.into());
        }

        Ok(())
    }

    /// Consecutive failed sign-in attempts and the time of the last one
    ///
    /// Accounts with no failures, and emails with no account, read as
    /// `(0, None)`.
    pub fn failed_attempts(&self, email: &str) -> Result<(u32, Option<DateTime<Utc>>)> {
        let conn = connect(&self.db_path)?;

        let found: Option<(i64, Option<String>)> = conn
            .query_row(
                "SELECT failed_attempts, last_failed_at FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to query failed attempts")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        match found {
            Some((count, at)) => Ok((
                count.max(0) as u32,
                at.and_then(|ts| {
                    DateTime::parse_from_rfc3339(&ts)
                        .map(|dt| dt.with_timezone(&Utc))
                        .ok()
                }),
            )),
            None => Ok((0, None)),
        }
    }

    /// Count one more failed sign-in attempt for this account
    pub fn record_failed_attempt(&self, email: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute(
            "UPDATE users SET failed_attempts = failed_attempts + 1, last_failed_at = ?1 WHERE email = ?2",
            params![Utc::now().to_rfc3339(), email],
        )
        .context("Failed to record failed attempt")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Reset the failed sign-in counter for this account
    pub fn clear_failed_attempts(&self, email: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute(
            "UPDATE users SET failed_attempts = 0, last_failed_at = NULL WHERE email = ?1",
            params![email],
        )
        .context("Failed to clear failed attempts")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Persist a login token for an account
    pub fn create_login(&self, token: &str, user_id: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute(
            "INSERT OR REPLACE INTO logins (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, Utc::now().to_rfc3339()],
        )
        .context("Failed to create login")
        .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Remove a login token
    ///
    /// Removing a token that does not exist is not an error.
    pub fn delete_login(&self, token: &str) -> Result<()> {
        let conn = connect(&self.db_path)?;

        conn.execute("DELETE FROM logins WHERE token = ?1", params![token])
            .context("Failed to delete login")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Resolve a login token to its account
    pub fn login_user(&self, token: &str) -> Result<Option<UserAccount>> {
        let conn = connect(&self.db_path)?;

        let account = conn
            .query_row(
                "SELECT u.id, u.email, u.plan, u.disabled, u.last_session, u.session_count, u.created_at, u.updated_at
                 FROM users u JOIN logins l ON l.user_id = u.id
                 WHERE l.token = ?1",
                params![token],
                account_from_row,
            )
            .optional()
            .context("Failed to resolve login")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(account)
    }

    /// Total number of accounts
    pub fn count(&self) -> Result<u64> {
        let conn = connect(&self.db_path)?;

        let count: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |r| r.get(0))
            .context("Failed to count users")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    /// Number of premium accounts
    pub fn count_premium(&self) -> Result<u64> {
        let conn = connect(&self.db_path)?;

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM users WHERE plan = 'premium'",
                [],
                |r| r.get(0),
            )
            .context("Failed to count premium users")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    /// Most recently active accounts, newest session first
    ///
    /// Accounts that never had a session sort last.
    pub fn recent(&self, limit: u32) -> Result<Vec<RecentUser>> {
        let conn = connect(&self.db_path)?;

        let mut stmt = conn
            .prepare(
                "SELECT email, plan, last_session, session_count FROM users
                 ORDER BY last_session IS NULL, last_session DESC, email
                 LIMIT ?1",
            )
            .context("Failed to prepare recent users query")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let plan: String = row.get(1)?;
                let last_session: Option<String> = row.get(2)?;
                let session_count: Option<i64> = row.get(3)?;
                Ok(RecentUser {
                    email: row.get(0)?,
                    plan: PlanTier::parse_str(&plan).unwrap_or_default(),
                    last_session: last_session.and_then(|ts| {
                        DateTime::parse_from_rfc3339(&ts)
                            .map(|dt| dt.with_timezone(&Utc))
                            .ok()
                    }),
                    session_count: session_count.unwrap_or(0).max(0) as u32,
                })
            })
            .context("Failed to query recent users")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(
                row.context("Failed to read recent user row")
                    .map_err(|e| SousChefError::Storage(e.to_string()))?,
            );
        }

        Ok(users)
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserAccount>> {
        let conn = connect(&self.db_path)?;

        let account = conn
            .query_row(
                "SELECT id, email, plan, disabled, last_session, session_count, created_at, updated_at
                 FROM users WHERE id = ?1",
                params![user_id],
                account_from_row,
            )
            .optional()
            .context("Failed to query user")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        Ok(account)
    }

    async fn record_session(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
        session_count: u32,
    ) -> Result<()> {
        let conn = connect(&self.db_path)?;

        let rows = conn
            .execute(
                "UPDATE users SET last_session = ?1, session_count = ?2, updated_at = ?3 WHERE id = ?4",
                params![at.to_rfc3339(), session_count, Utc::now().to_rfc3339(), user_id],
            )
            .context("Failed to record session")
            .map_err(|e| SousChefError::Storage(e.to_string()))?;

        if rows == 0 {
            return Err(SousChefError::Storage(format!("No such user: {}", user_id)).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteUserStore, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let db = Database::open_at(dir.path().join("test.db")).expect("open failed");
        (db.users(), dir)
    }

    #[test]
    fn test_insert_and_find_by_email() {
        let (store, _dir) = create_test_store();

        let created = store.insert("cook@example.com", "digest").expect("insert");
        assert_eq!(created.plan, PlanTier::Free);
        assert_eq!(created.session_count, 0);
        assert!(created.last_session.is_none());
        assert!(!created.disabled);

        let found = store
            .find_by_email("cook@example.com")
            .expect("find")
            .expect("account should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "cook@example.com");
    }

    #[test]
    fn test_find_by_email_missing_returns_none() {
        let (store, _dir) = create_test_store();
        let found = store.find_by_email("nobody@example.com").expect("find");
        assert!(found.is_none());
    }

    #[test]
    fn test_insert_duplicate_email_fails() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "digest").expect("insert");
        let result = store.insert("cook@example.com", "other");
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_returns_digest() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "digest-123").expect("insert");

        let (account, digest) = store
            .credentials("cook@example.com")
            .expect("credentials")
            .expect("account should exist");
        assert_eq!(account.email, "cook@example.com");
        assert_eq!(digest, "digest-123");

        let missing = store.credentials("nobody@example.com").expect("credentials");
        assert!(missing.is_none());
    }

    #[test]
    fn test_update_password() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "old").expect("insert");

        store
            .update_password("cook@example.com", "new")
            .expect("update");
        let (_, digest) = store
            .credentials("cook@example.com")
            .expect("credentials")
            .expect("account should exist");
        assert_eq!(digest, "new");
    }

    #[test]
    fn test_update_password_missing_account() {
        let (store, _dir) = create_test_store();
        let err = store
            .update_password("nobody@example.com", "new")
            .expect_err("should fail");
        assert!(err.to_string().contains("No account found"));
    }

    #[test]
    fn test_set_plan() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "digest").expect("insert");

        store
            .set_plan("cook@example.com", PlanTier::Premium)
            .expect("set plan");
        let account = store
            .find_by_email("cook@example.com")
            .expect("find")
            .expect("account should exist");
        assert_eq!(account.plan, PlanTier::Premium);

        let err = store
            .set_plan("nobody@example.com", PlanTier::Premium)
            .expect_err("should fail");
        assert!(err.to_string().contains("No account found"));
    }

    #[test]
    fn test_set_disabled() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "digest").expect("insert");

        store.set_disabled("cook@example.com", true).expect("disable");
        let account = store
            .find_by_email("cook@example.com")
            .expect("find")
            .expect("account should exist");
        assert!(account.disabled);
    }

    #[test]
    fn test_login_token_roundtrip() {
        let (store, _dir) = create_test_store();
        let account = store.insert("cook@example.com", "digest").expect("insert");

        store.create_login("tok-1", &account.id).expect("create login");
        let resolved = store
            .login_user("tok-1")
            .expect("resolve")
            .expect("token should resolve");
        assert_eq!(resolved.id, account.id);

        store.delete_login("tok-1").expect("delete login");
        assert!(store.login_user("tok-1").expect("resolve").is_none());

        // Deleting again is a no-op.
        store.delete_login("tok-1").expect("delete login");
    }

    #[tokio::test]
    async fn test_record_session_updates_account() {
        let (store, _dir) = create_test_store();
        let account = store.insert("cook@example.com", "digest").expect("insert");

        let at = Utc::now();
        store
            .record_session(&account.id, at, 3)
            .await
            .expect("record");

        let found = store
            .find_by_id(&account.id)
            .await
            .expect("find")
            .expect("account should exist");
        assert_eq!(found.session_count, 3);
        let recorded = found.last_session.expect("last_session should be set");
        assert!((recorded - at).num_seconds().abs() < 2);
    }

    #[tokio::test]
    async fn test_record_session_missing_user_fails() {
        let (store, _dir) = create_test_store();
        let err = store
            .record_session("ghost", Utc::now(), 1)
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("No such user"));
    }

    #[test]
    fn test_failed_attempts_roundtrip() {
        let (store, _dir) = create_test_store();
        store.insert("cook@example.com", "digest").expect("insert");

        assert_eq!(
            store.failed_attempts("cook@example.com").expect("query"),
            (0, None)
        );

        store
            .record_failed_attempt("cook@example.com")
            .expect("record");
        store
            .record_failed_attempt("cook@example.com")
            .expect("record");

        let (count, at) = store.failed_attempts("cook@example.com").expect("query");
        assert_eq!(count, 2);
        assert!(at.is_some());

        store
            .clear_failed_attempts("cook@example.com")
            .expect("clear");
        assert_eq!(
            store.failed_attempts("cook@example.com").expect("query"),
            (0, None)
        );

        // Unknown emails read as zero.
        assert_eq!(
            store.failed_attempts("nobody@example.com").expect("query"),
            (0, None)
        );
    }

    #[test]
    fn test_counts_and_recent_ordering() {
        let (store, _dir) = create_test_store();
        let a = store.insert("a@example.com", "digest").expect("insert");
        let b = store.insert("b@example.com", "digest").expect("insert");
        store.insert("c@example.com", "digest").expect("insert");
        store
            .set_plan("b@example.com", PlanTier::Premium)
            .expect("set plan");

        assert_eq!(store.count().expect("count"), 3);
        assert_eq!(store.count_premium().expect("count premium"), 1);

        // b had a session yesterday, a just now, c never.
        let now = Utc::now();
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(store.record_session(&b.id, now - chrono::Duration::days(1), 1))
            .expect("record");
        rt.block_on(store.record_session(&a.id, now, 1)).expect("record");

        let recent = store.recent(5).expect("recent");
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].email, "a@example.com");
        assert_eq!(recent[1].email, "b@example.com");
        assert_eq!(recent[2].email, "c@example.com");
        assert!(recent[2].last_session.is_none());

        let capped = store.recent(2).expect("recent");
        assert_eq!(capped.len(), 2);
    }
}
