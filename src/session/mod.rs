//! Session gating for the chat assistant
//!
//! A chat session passes through eligibility ([`SessionPolicy`]), an
//! optional ad gate, recording ([`SessionRecorder`]), and for free
//! accounts an expiry countdown. [`GatedSession`] ties the stages
//! together and enforces their order: nothing is recorded until the ad
//! gate has finished, recording happens exactly once, and expiry is a
//! one-way transition.

pub mod countdown;
pub mod metrics;
pub mod policy;
pub mod recorder;

pub use countdown::Countdown;
pub use policy::{AccessDecision, SessionPolicy};
pub use recorder::SessionRecorder;

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a gated session
///
/// `Expired` is terminal. Sessions with no expiry timer stay `Active`
/// until dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet past the gate
    Pending,
    /// Running
    Active,
    /// The free-tier timer ran out
    Expired,
}

/// A single chat session with its gating state
#[derive(Debug)]
pub struct GatedSession {
    user_id: String,
    limit: Option<Duration>,
    expiry: Option<Arc<Countdown>>,
    started_at: Option<DateTime<Utc>>,
}

impl GatedSession {
    /// Build a pending session from an access decision
    ///
    /// # Errors
    ///
    /// Returns error for a denied decision; callers are expected to
    /// surface the denial instead of constructing a session.
    pub fn new(user_id: &str, decision: &AccessDecision) -> Result<Self> {
        let limit = match decision {
            AccessDecision::Unlimited => None,
            AccessDecision::Gated { session, .. } => Some(*session),
            AccessDecision::Denied { reason, .. } => {
                anyhow::bail!("Cannot start a denied session: {}", reason)
            }
        };

        Ok(Self {
            user_id: user_id.to_string(),
            limit,
            expiry: None,
            started_at: None,
        })
    }

    /// Start the session
    ///
    /// Requires the ad gate, when one was shown, to have completed.
    /// Records the session start and arms the expiry countdown for
    /// limited sessions. Returns the new cumulative session count.
    ///
    /// # Errors
    ///
    /// Returns error if the session already started, the gate has not
    /// finished, or recording fails. A recording failure leaves the
    /// session pending so activation can be retried.
    pub async fn activate(
        &mut self,
        recorder: &SessionRecorder,
        gate: Option<&Countdown>,
    ) -> Result<u32> {
        if self.started_at.is_some() {
            anyhow::bail!("Session already started");
        }
        if let Some(gate) = gate {
            if !gate.is_complete() {
                anyhow::bail!("The sponsor message has not finished");
            }
        }

        let now = Utc::now();
        let count = recorder.record(&self.user_id, now).await?;

        self.started_at = Some(now);
        self.expiry = self.limit.map(|d| Arc::new(Countdown::start(d)));

        Ok(count)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.started_at.is_none() {
            return SessionState::Pending;
        }
        match &self.expiry {
            Some(countdown) if countdown.is_complete() => SessionState::Expired,
            _ => SessionState::Active,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.state() == SessionState::Expired
    }

    /// Time left before expiry; unlimited sessions return None
    pub fn remaining(&self) -> Option<Duration> {
        self.expiry.as_ref().map(|c| c.remaining())
    }

    /// Handle to the expiry countdown for awaiting alongside other work
    pub fn expiry(&self) -> Option<Arc<Countdown>> {
        self.expiry.clone()
    }

    /// When the session activated
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Tear the session down early
    ///
    /// Stops the expiry countdown so a quit session cannot later read
    /// as expired. Closing an already expired session changes nothing.
    pub fn close(&self) {
        if let Some(countdown) = &self.expiry {
            countdown.cancel();
        }
    }
}
