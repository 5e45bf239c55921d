//! Account registration and sign-in
//!
//! Authentication is local to the machine. Passwords are stored as
//! salted SHA-256 digests in the user store and sign-ins mint an opaque
//! login token that the identity layer resolves back to an account.

use crate::error::{Result, SousChefError};
use crate::store::{Database, SettingsStore, SqliteUserStore, UserAccount};
use chrono::{Duration, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Consecutive failures before sign-in is throttled
const MAX_FAILED_ATTEMPTS: u32 = 5;

/// How long the throttle lasts after the most recent failure
const LOCKOUT_MINUTES: i64 = 15;

/// Minimum password length accepted at registration
const MIN_PASSWORD_CHARS: usize = 6;

/// Registration, sign-in, and password reset over the user store
pub struct AuthService {
    users: SqliteUserStore,
    settings: SettingsStore,
    email_re: Regex,
}

impl AuthService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.users(),
            settings: db.settings(),
            email_re: Regex::new(EMAIL_PATTERN).expect("Invalid regex pattern"),
        }
    }

    /// Create a new free-tier account
    ///
    /// Email format is enforced only while the `require_email` freemium
    /// setting is on; empty emails are always rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SousChefError::InvalidEmail`], [`SousChefError::WeakPassword`],
    /// or [`SousChefError::EmailInUse`].
    pub fn register(&self, email: &str, password: &str) -> Result<UserAccount> {
        let email = normalize_email(email);

        if email.is_empty() {
            return Err(SousChefError::InvalidEmail.into());
        }
        if self.settings.load().require_email && !self.email_re.is_match(&email) {
            return Err(SousChefError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SousChefError::WeakPassword.into());
        }
        if self.users.find_by_email(&email)?.is_some() {
            return Err(SousChefError::EmailInUse.into());
        }

        let account = self.users.insert(&email, &digest_password(&email, password))?;
        debug!("Registered account {}", account.id);
        Ok(account)
    }

    /// Sign in and mint a login token
    ///
    /// # Errors
    ///
    /// Returns [`SousChefError::InvalidCredentials`] for unknown emails
    /// and wrong passwords alike, [`SousChefError::TooManyAttempts`]
    /// while the account is throttled, and
    /// [`SousChefError::AccountDisabled`] for blocked accounts.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(UserAccount, String)> {
        let email = normalize_email(email);

        let (account, digest) = match self.users.credentials(&email)? {
            Some(found) => found,
            None => return Err(SousChefError::InvalidCredentials.into()),
        };

        let (failures, last_failed_at) = self.users.failed_attempts(&email)?;
        if failures >= MAX_FAILED_ATTEMPTS {
            if let Some(at) = last_failed_at {
                if Utc::now() - at < Duration::minutes(LOCKOUT_MINUTES) {
                    return Err(SousChefError::TooManyAttempts.into());
                }
            }
        }

        if digest != digest_password(&email, password) {
            self.users.record_failed_attempt(&email)?;
            return Err(SousChefError::InvalidCredentials.into());
        }

        if account.disabled {
            return Err(SousChefError::AccountDisabled.into());
        }

        self.users.clear_failed_attempts(&email)?;

        let token = Uuid::new_v4().to_string();
        self.users.create_login(&token, &account.id)?;
        debug!("Signed in account {}", account.id);

        Ok((account, token))
    }

    /// Invalidate a login token
    pub fn sign_out(&self, token: &str) -> Result<()> {
        self.users.delete_login(token)
    }

    /// Replace the password for an existing account
    ///
    /// # Errors
    ///
    /// Returns [`SousChefError::AccountNotFound`] for unknown emails and
    /// [`SousChefError::WeakPassword`] for short replacements.
    pub fn reset_password(&self, email: &str, new_password: &str) -> Result<()> {
        let email = normalize_email(email);

        if new_password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SousChefError::WeakPassword.into());
        }
        if self.users.find_by_email(&email)?.is_none() {
            return Err(SousChefError::AccountNotFound.into());
        }

        self.users
            .update_password(&email, &digest_password(&email, new_password))?;
        self.users.clear_failed_attempts(&email)?;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FreemiumSettings, PlanTier};
    use tempfile::TempDir;

    fn create_test_auth() -> (AuthService, Database, TempDir) {
        let dir = TempDir::new().expect("failed to create tempdir");
        let db = Database::open_at(dir.path().join("test.db")).expect("open failed");
        (AuthService::new(&db), db, dir)
    }

    #[test]
    fn test_register_creates_free_account() {
        let (auth, _db, _dir) = create_test_auth();

        let account = auth.register("cook@example.com", "secret1").expect("register");
        assert_eq!(account.email, "cook@example.com");
        assert_eq!(account.plan, PlanTier::Free);
        assert_eq!(account.session_count, 0);
    }

    #[test]
    fn test_register_normalizes_email() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("  Cook@Example.COM ", "secret1").expect("register");
        let (account, _) = auth.sign_in("cook@example.com", "secret1").expect("sign in");
        assert_eq!(account.email, "cook@example.com");
    }

    #[test]
    fn test_register_rejects_invalid_email() {
        let (auth, _db, _dir) = create_test_auth();

        for email in [
            "",
            "   ",
            "nope",
            "two@@example.com",
            "no-domain@",
            "@no-local.com",
            "spa ce@example.com",
        ] {
            let err = auth.register(email, "secret1").expect_err("should fail");
            assert!(
                err.to_string().contains("Invalid email address"),
                "email {:?} gave {}",
                email,
                err
            );
        }
    }

    #[test]
    fn test_register_allows_loose_email_when_not_required() {
        let (auth, db, _dir) = create_test_auth();

        let settings = FreemiumSettings {
            require_email: false,
            ..FreemiumSettings::default()
        };
        db.settings().save(&settings).expect("save settings");

        auth.register("just-a-name", "secret1").expect("register");
        // Empty input stays rejected.
        assert!(auth.register("  ", "secret1").is_err());
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let (auth, _db, _dir) = create_test_auth();

        let err = auth
            .register("cook@example.com", "12345")
            .expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "Password should be at least 6 characters"
        );
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        let err = auth
            .register("cook@example.com", "other-secret")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Email is already in use");
    }

    #[test]
    fn test_sign_in_roundtrip() {
        let (auth, db, _dir) = create_test_auth();

        let created = auth.register("cook@example.com", "secret1").expect("register");
        let (account, token) = auth.sign_in("cook@example.com", "secret1").expect("sign in");
        assert_eq!(account.id, created.id);

        let resolved = db
            .users()
            .login_user(&token)
            .expect("resolve")
            .expect("token should resolve");
        assert_eq!(resolved.id, created.id);

        auth.sign_out(&token).expect("sign out");
        assert!(db.users().login_user(&token).expect("resolve").is_none());
    }

    #[test]
    fn test_sign_in_wrong_password() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        let err = auth
            .sign_in("cook@example.com", "wrong-password")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_sign_in_unknown_email() {
        let (auth, _db, _dir) = create_test_auth();

        let err = auth
            .sign_in("nobody@example.com", "secret1")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_sign_in_disabled_account() {
        let (auth, db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        db.users()
            .set_disabled("cook@example.com", true)
            .expect("disable");

        let err = auth
            .sign_in("cook@example.com", "secret1")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "This account has been disabled");
    }

    #[test]
    fn test_sign_in_throttles_after_repeated_failures() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        for _ in 0..5 {
            let err = auth
                .sign_in("cook@example.com", "wrong")
                .expect_err("should fail");
            assert_eq!(err.to_string(), "Invalid email or password");
        }

        // Even the correct password is refused while throttled.
        let err = auth
            .sign_in("cook@example.com", "secret1")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Too many failed attempts. Try again later");
    }

    #[test]
    fn test_successful_sign_in_resets_throttle() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        for _ in 0..4 {
            assert!(auth.sign_in("cook@example.com", "wrong").is_err());
        }
        auth.sign_in("cook@example.com", "secret1").expect("sign in");

        // The counter is back at zero, so more room before throttling.
        for _ in 0..4 {
            let err = auth
                .sign_in("cook@example.com", "wrong")
                .expect_err("should fail");
            assert_eq!(err.to_string(), "Invalid email or password");
        }
    }

    #[test]
    fn test_reset_password() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        auth.reset_password("cook@example.com", "new-secret")
            .expect("reset");

        assert!(auth.sign_in("cook@example.com", "secret1").is_err());
        auth.sign_in("cook@example.com", "new-secret").expect("sign in");
    }

    #[test]
    fn test_reset_password_unknown_email() {
        let (auth, _db, _dir) = create_test_auth();

        let err = auth
            .reset_password("nobody@example.com", "new-secret")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "No account found with this email");
    }

    #[test]
    fn test_reset_password_rejects_weak_replacement() {
        let (auth, _db, _dir) = create_test_auth();

        auth.register("cook@example.com", "secret1").expect("register");
        let err = auth
            .reset_password("cook@example.com", "123")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
    }
}
