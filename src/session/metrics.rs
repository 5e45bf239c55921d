//! Telemetry for gated chat sessions
//!
//! Tracks session lifecycle metrics labeled by plan tier so free and
//! premium behavior can be separated downstream. Denials and ad-gate
//! waits are recorded through free functions because no session object
//! exists at those points.
//!
//! # Metrics
//!
//! - `session_starts_total`: Counter of sessions that began
//! - `session_active_count`: Gauge of currently running sessions
//! - `session_duration_seconds`: Histogram of session length by outcome
//! - `session_closes_total`: Counter of closed sessions by outcome
//! - `session_denials_total`: Counter of eligibility denials
//! - `ad_gate_wait_seconds`: Histogram of time spent on the ad gate
//! - `suggestions_served_total`: Counter of suggestion cards shown
//! - `provider_errors_total`: Counter of surfaced chat-provider failures
//!
//! # Examples
//!
//! ```
//! use souschef::session::metrics::SessionMetrics;
//!
//! let metrics = SessionMetrics::new("free");
//! metrics.record_close("completed");
//! ```

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::cell::Cell;
use std::time::Instant;

/// Metrics for a single chat session
///
/// Created when a session activates and closed exactly once with an
/// outcome. Uses interior mutability (Cell) so closing works through
/// an immutable reference; the struct is meant to live inside the one
/// task driving the session.
#[derive(Debug)]
pub struct SessionMetrics {
    /// Plan tier label ("free" or "premium")
    plan: String,

    /// When the session activated
    start: Instant,

    /// Whether the close has been recorded, to prevent double counting
    recorded: Cell<bool>,
}

impl SessionMetrics {
    /// Start tracking a session
    ///
    /// Increments the start counter and the active-session gauge.
    ///
    /// # Examples
    ///
    /// ```
    /// use souschef::session::metrics::SessionMetrics;
    ///
    /// let metrics = SessionMetrics::new("premium");
    /// assert_eq!(metrics.plan(), "premium");
    /// ```
    pub fn new(plan: &str) -> Self {
        increment_counter!("session_starts_total", "plan" => plan.to_string());
        increment_gauge!("session_active_count", 1.0, "plan" => plan.to_string());

        Self {
            plan: plan.to_string(),
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Record the session ending with the given outcome
    ///
    /// Outcomes are "completed" for a normal quit and "expired" for the
    /// free-tier timer running out. Repeated calls are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use souschef::session::metrics::SessionMetrics;
    ///
    /// let metrics = SessionMetrics::new("free");
    /// metrics.record_close("expired");
    /// ```
    pub fn record_close(&self, outcome: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        let duration = self.start.elapsed();

        histogram!(
            "session_duration_seconds",
            duration.as_secs_f64(),
            "plan" => self.plan.clone(),
            "outcome" => outcome.to_string()
        );

        increment_counter!(
            "session_closes_total",
            "plan" => self.plan.clone(),
            "outcome" => outcome.to_string()
        );

        decrement_gauge!("session_active_count", 1.0, "plan" => self.plan.clone());
    }

    /// The plan tier label this session is tracked under
    pub fn plan(&self) -> &str {
        &self.plan
    }

    /// Time since the session activated
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for SessionMetrics {
    /// Keeps the active gauge accurate when a session is dropped
    /// without an explicit close
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("session_active_count", 1.0, "plan" => self.plan.clone());
        }
    }
}

/// Record an eligibility denial
pub fn record_session_denied() {
    increment_counter!("session_denials_total");
}

/// Record a completed ad-gate wait
pub fn record_ad_gate_wait(seconds: f64) {
    histogram!("ad_gate_wait_seconds", seconds);
}

/// Record suggestion cards being shown
pub fn record_suggestions_served(count: usize) {
    increment_counter!("suggestions_served_total");
    histogram!("suggestion_recipes_returned", count as f64);
}

/// Record a chat-provider failure that was surfaced to the user
pub fn record_provider_error(provider: &str) {
    increment_counter!("provider_errors_total", "provider" => provider.to_string());
}

/// Initializes the metrics exporter for Prometheus
///
/// With the `prometheus` feature enabled this installs the Prometheus
/// exporter; without it the function is a safe no-op.
///
/// # Examples
///
/// ```
/// use souschef::session::metrics::init_metrics_exporter;
///
/// init_metrics_exporter();
/// ```
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
