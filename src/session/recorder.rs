//! Session start recording
//!
//! Stamps `last_session` and bumps the cumulative session count when a
//! gated session actually begins. A failed count read is tolerated and
//! treated as zero so a flaky read cannot block a session that policy
//! already approved; failed writes still propagate because an
//! unrecorded session would reopen the eligibility window early.
//!
//! The count is read and rewritten without a transaction. Concurrent
//! recordings for the same user can collapse into a single increment;
//! the counter is informational and this is accepted.

use crate::error::Result;
use crate::store::UserStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Records session starts against the user store
#[derive(Clone)]
pub struct SessionRecorder {
    store: Arc<dyn UserStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Record a session starting at `at`, returning the new count
    ///
    /// # Errors
    ///
    /// Returns error if the write fails, including when the account no
    /// longer exists.
    pub async fn record(&self, user_id: &str, at: DateTime<Utc>) -> Result<u32> {
        let current = match self.store.find_by_id(user_id).await {
            Ok(Some(account)) => account.session_count,
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read session count, treating as zero: {}", e);
                0
            }
        };

        let next = current.saturating_add(1);
        self.store.record_session(user_id, at, next).await?;
        debug!("Recorded session {} for user {}", next, user_id);

        Ok(next)
    }
}
