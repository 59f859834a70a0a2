//! Quota-aware pacing for every call that spends GitHub budget.
//!
//! [`RateGovernor::acquire`] must be awaited immediately before each
//! quota-consuming request. It reads the live quota for the bucket the call
//! draws from, suspends until the window resets when the budget runs low, and
//! keeps a fixed minimum spacing between consecutive calls so bursts stay
//! under GitHub's secondary limits. Suspension is the recovery path for
//! exhaustion; `acquire` only fails when the quota itself cannot be read.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use thiserror::Error;
use tokio::time::{Instant, sleep};

use crate::github::{AnalysisError, PullRequestGateway, QuotaResource, QuotaState};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// Remaining-call threshold below which the governor waits for a reset.
pub const DEFAULT_LOW_WATERMARK: u32 = 10;
/// Extra time added to every reset wait.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5);
/// Minimum gap between consecutive quota-consuming calls.
pub const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(1000);
/// Consecutive failed quota reads tolerated before giving up.
pub const DEFAULT_QUOTA_ATTEMPTS: u32 = 3;

/// Tunables for [`RateGovernor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorPolicy {
    /// Suspend when fewer than this many calls remain.
    pub low_watermark: u32,
    /// Added to the time until reset.
    pub safety_margin: Duration,
    /// Minimum spacing between consecutive calls.
    pub min_spacing: Duration,
    /// Quota reads attempted before [`RateLimitError::QuotaUnavailable`].
    pub quota_attempts: u32,
}

impl Default for GovernorPolicy {
    fn default() -> Self {
        Self {
            low_watermark: DEFAULT_LOW_WATERMARK,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            min_spacing: DEFAULT_MIN_SPACING,
            quota_attempts: DEFAULT_QUOTA_ATTEMPTS,
        }
    }
}

/// Failures of the governor itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The quota endpoint failed on every attempt.
    #[error("could not read {resource} quota after {attempts} attempts: {source}")]
    QuotaUnavailable {
        /// Bucket that could not be read.
        resource: QuotaResource,
        /// Attempts made.
        attempts: u32,
        /// The last failure.
        source: AnalysisError,
    },
}

/// Wall-clock source used to compare against quota reset timestamps.
pub trait Clock: Send + Sync {
    /// Current time as Unix seconds.
    fn now_unix(&self) -> u64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0)
    }
}

/// Single pacing point shared by every quota-consuming call site.
pub struct RateGovernor<'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    gateway: &'gateway Gateway,
    policy: GovernorPolicy,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetrySink>,
    last_call: Mutex<Option<Instant>>,
}

impl<'gateway, Gateway> RateGovernor<'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a governor reading quota through `gateway`.
    #[must_use]
    pub fn new(gateway: &'gateway Gateway, policy: GovernorPolicy) -> Self {
        Self {
            gateway,
            policy,
            clock: Arc::new(SystemClock),
            telemetry: Arc::new(NoopTelemetrySink),
            last_call: Mutex::new(None),
        }
    }

    /// Replaces the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Routes suspension events to `telemetry`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &GovernorPolicy {
        &self.policy
    }

    /// The gateway whose calls this governor paces.
    #[must_use]
    pub const fn gateway(&self) -> &'gateway Gateway {
        self.gateway
    }

    /// Waits until one call against `resource` may be issued.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::QuotaUnavailable`] when the quota cannot be
    /// read after the configured number of attempts.
    pub async fn acquire(&self, resource: QuotaResource) -> Result<(), RateLimitError> {
        self.wait_for_spacing().await;

        let quota = self.read_quota(resource).await?;
        if quota.is_below(self.policy.low_watermark) {
            self.suspend_until_reset(resource, quota).await;

            let rechecked = self.read_quota(resource).await?;
            if rechecked.is_below(self.policy.low_watermark) {
                tracing::warn!(
                    "{resource} quota still low after reset ({} remaining); continuing",
                    rechecked.remaining()
                );
            }
        }

        *self.lock_last_call() = Some(Instant::now());
        Ok(())
    }

    fn lock_last_call(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn wait_for_spacing(&self) {
        let last_call = *self.lock_last_call();
        let Some(previous) = last_call else {
            return;
        };

        let remaining = self.policy.min_spacing.saturating_sub(previous.elapsed());
        if !remaining.is_zero() {
            sleep(remaining).await;
        }
    }

    async fn read_quota(&self, resource: QuotaResource) -> Result<QuotaState, RateLimitError> {
        let attempts = self.policy.quota_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.gateway.quota(resource).await {
                Ok(quota) => return Ok(quota),
                Err(error) if attempt >= attempts => {
                    return Err(RateLimitError::QuotaUnavailable {
                        resource,
                        attempts,
                        source: error,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        "reading {resource} quota failed (attempt {attempt}/{attempts}): {error}"
                    );
                    attempt += 1;
                    sleep(self.policy.min_spacing).await;
                }
            }
        }
    }

    async fn suspend_until_reset(&self, resource: QuotaResource, quota: QuotaState) {
        let until_reset = quota.seconds_until_reset_from(self.clock.now_unix());
        if until_reset == 0 {
            tracing::debug!("{resource} quota low but its reset time has already passed");
            return;
        }

        let wait = Duration::from_secs(until_reset).saturating_add(self.policy.safety_margin);
        tracing::warn!(
            "{resource} quota low ({} remaining); waiting {}s until reset at {}",
            quota.remaining(),
            wait.as_secs(),
            format_reset(quota.reset_at())
        );
        self.telemetry.record(TelemetryEvent::QuotaSuspended {
            resource: resource.to_string(),
            remaining: quota.remaining(),
            reset_at: quota.reset_at(),
            wait_seconds: wait.as_secs(),
        });

        sleep(wait).await;
    }
}

fn format_reset(reset_at: u64) -> String {
    i64::try_from(reset_at)
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map_or_else(|| reset_at.to_string(), |time| time.to_rfc3339())
}
