//! Free-tier session eligibility
//!
//! Decides, from an account and the freemium settings, whether a chat
//! session may start and under which timers. The calendar math counts
//! elapsed days by rounding up, so any part of a day counts as a whole
//! one and a user who waited almost a week is not bounced for a few
//! missing minutes.

use crate::store::{FreemiumSettings, UserAccount};
use chrono::{DateTime, Duration as CalendarDuration, Utc};
use std::time::Duration;

const MS_PER_DAY: i64 = 86_400_000;

/// Outcome of a session eligibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Premium access with no ad gate and no expiry timer
    Unlimited,
    /// Free access behind an optional ad gate, expiring after `session`
    Gated {
        /// Ad gate length, absent when the ad is disabled
        ad: Option<Duration>,
        /// Session length before expiry
        session: Duration,
    },
    /// No session allowed yet
    Denied {
        reason: String,
        /// When the eligibility window reopens
        next_eligible_at: DateTime<Utc>,
    },
}

impl AccessDecision {
    pub fn allows_access(&self) -> bool {
        !matches!(self, Self::Denied { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }
}

/// Session eligibility rules over the freemium settings
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    settings: FreemiumSettings,
    bypass_eligibility: bool,
}

impl SessionPolicy {
    /// Build a policy from settings
    ///
    /// With `bypass_eligibility` set, the frequency window is skipped
    /// and every free account is treated as eligible. Timers still
    /// apply.
    pub fn new(settings: FreemiumSettings, bypass_eligibility: bool) -> Self {
        Self {
            settings,
            bypass_eligibility,
        }
    }

    /// Decide whether this account may start a session at `now`
    pub fn evaluate(&self, account: &UserAccount, now: DateTime<Utc>) -> AccessDecision {
        if account.plan.is_premium() {
            return AccessDecision::Unlimited;
        }

        if !self.bypass_eligibility {
            if let Some(last) = account.last_session {
                let days = elapsed_days(now, last);
                let frequency = i64::from(self.settings.session_frequency);
                if days < frequency {
                    return AccessDecision::Denied {
                        reason: format!(
                            "Free users are limited to 1 session per {} days",
                            self.settings.session_frequency
                        ),
                        next_eligible_at: last
                            + CalendarDuration::days(self.settings.session_frequency.into()),
                    };
                }
            }
        }

        AccessDecision::Gated {
            ad: self
                .settings
                .show_ad
                .then(|| Duration::from_secs(self.settings.ad_duration)),
            session: Duration::from_secs(self.settings.session_time),
        }
    }
}

/// Whole days between two instants, rounded up
fn elapsed_days(now: DateTime<Utc>, last: DateTime<Utc>) -> i64 {
    let ms = (now - last).num_milliseconds().abs();
    (ms + MS_PER_DAY - 1) / MS_PER_DAY
}
