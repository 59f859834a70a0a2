//! Quota state reported by the GitHub rate limit endpoint.
//!
//! GitHub meters REST calls and search calls in separate buckets. The
//! [`QuotaState`] type mirrors one bucket at the moment it was queried; it is
//! never cached beyond the call it guards.

use std::fmt;

use serde::Serialize;

/// Quota bucket a remote call draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaResource {
    /// Core REST API budget (file listings, pull request reads).
    Core,
    /// Search API budget.
    Search,
}

impl QuotaResource {
    /// Returns the key used by the `/rate_limit` response for this bucket.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for QuotaResource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Remaining budget and reset time for one quota bucket.
///
/// # Example
///
/// ```
/// use prtally::github::rate_limit::QuotaState;
///
/// let quota = QuotaState::new(5000, 4999, 1_700_000_000);
/// assert!(!quota.is_below(10));
/// assert_eq!(quota.remaining(), 4999);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    /// Maximum requests allowed in the current window.
    limit: u32,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the window resets.
    reset_at: u64,
}

impl QuotaState {
    /// Creates a new quota snapshot.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true when fewer than `watermark` calls remain.
    #[must_use]
    pub const fn is_below(&self, watermark: u32) -> bool {
        self.remaining < watermark
    }

    /// Seconds between `now` (Unix seconds) and the reset time.
    ///
    /// Returns 0 once the reset time has passed.
    #[must_use]
    pub const fn seconds_until_reset_from(&self, now: u64) -> u64 {
        self.reset_at.saturating_sub(now)
    }
}
