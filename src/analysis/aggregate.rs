//! Per-user marker totals for one team.

use std::collections::HashSet;
use std::mem;

use crate::github::{PullRequestNumber, PullRequestRef, RepositoryLocator, UserLogin};

use super::classifier::MarkerKind;

/// Marker line counts for one pull request or one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkerCounts {
    test_lines: u64,
    assistant_lines: u64,
}

impl MarkerCounts {
    /// Creates counts from explicit values.
    #[must_use]
    pub const fn new(test_lines: u64, assistant_lines: u64) -> Self {
        Self {
            test_lines,
            assistant_lines,
        }
    }

    /// Added lines carrying the test marker.
    #[must_use]
    pub const fn test_lines(&self) -> u64 {
        self.test_lines
    }

    /// Added lines carrying the assistant marker.
    #[must_use]
    pub const fn assistant_lines(&self) -> u64 {
        self.assistant_lines
    }

    /// Whether both counters are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.test_lines == 0 && self.assistant_lines == 0
    }

    /// Counts one matching line.
    pub const fn record(&mut self, kind: MarkerKind) {
        match kind {
            MarkerKind::Test => self.test_lines = self.test_lines.saturating_add(1),
            MarkerKind::Assistant => {
                self.assistant_lines = self.assistant_lines.saturating_add(1);
            }
        }
    }

    /// Field-wise sum.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            test_lines: self.test_lines.saturating_add(other.test_lines),
            assistant_lines: self.assistant_lines.saturating_add(other.assistant_lines),
        }
    }
}

/// Per-user totals for one team, in configured member order.
///
/// Every configured member has an entry, zero or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSummary {
    entries: Vec<(UserLogin, MarkerCounts)>,
}

impl UserSummary {
    /// Creates a summary with a zero entry for each member.
    #[must_use]
    pub fn for_members(members: &[UserLogin]) -> Self {
        let entries = members
            .iter()
            .map(|member| (member.clone(), MarkerCounts::default()))
            .collect();
        Self { entries }
    }

    /// Totals for `user`, if present.
    #[must_use]
    pub fn get(&self, user: &UserLogin) -> Option<MarkerCounts> {
        self.entries
            .iter()
            .find(|(login, _)| login == user)
            .map(|(_, counts)| *counts)
    }

    /// Entries in member order.
    pub fn iter(&self) -> impl Iterator<Item = (&UserLogin, MarkerCounts)> {
        self.entries.iter().map(|(login, counts)| (login, *counts))
    }

    /// Number of users.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no users.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum across all users.
    #[must_use]
    pub fn total(&self) -> MarkerCounts {
        self.entries
            .iter()
            .fold(MarkerCounts::default(), |total, (_, counts)| total.add(*counts))
    }
}

/// Adds `counts` into the entry for `user`, creating a zero entry first when
/// the user is not present.
#[must_use]
pub fn accumulate(mut summary: UserSummary, user: &UserLogin, counts: MarkerCounts) -> UserSummary {
    if let Some((_, existing)) = summary.entries.iter_mut().find(|(login, _)| login == user) {
        *existing = existing.add(counts);
    } else {
        summary.entries.push((user.clone(), counts));
    }
    summary
}

type LedgerKey = (UserLogin, RepositoryLocator, PullRequestNumber);

/// Folds per-PR counts into a team's [`UserSummary`], counting each pull
/// request at most once per user.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    summary: UserSummary,
    counted: HashSet<LedgerKey>,
}

impl Aggregator {
    /// Starts from a zero summary for `members`.
    #[must_use]
    pub fn for_members(members: &[UserLogin]) -> Self {
        Self {
            summary: UserSummary::for_members(members),
            counted: HashSet::new(),
        }
    }

    /// Whether `pull_request` has already been counted for `user`.
    #[must_use]
    pub fn is_counted(&self, user: &UserLogin, pull_request: &PullRequestRef) -> bool {
        self.counted.contains(&ledger_key(user, pull_request))
    }

    /// Adds the counts of one pull request for `user`. Returns `false` and
    /// leaves the summary untouched when the pull request was already
    /// counted.
    pub fn record(
        &mut self,
        user: &UserLogin,
        pull_request: &PullRequestRef,
        counts: MarkerCounts,
    ) -> bool {
        if !self.counted.insert(ledger_key(user, pull_request)) {
            return false;
        }
        self.summary = accumulate(mem::take(&mut self.summary), user, counts);
        true
    }

    /// Distinct pull requests counted so far.
    #[must_use]
    pub fn pull_requests(&self) -> usize {
        self.counted.len()
    }

    /// Current totals.
    #[must_use]
    pub const fn summary(&self) -> &UserSummary {
        &self.summary
    }

    /// Consumes the aggregator, returning the totals.
    #[must_use]
    pub fn into_summary(self) -> UserSummary {
        self.summary
    }
}

fn ledger_key(user: &UserLogin, pull_request: &PullRequestRef) -> LedgerKey {
    (
        user.clone(),
        pull_request.repository.clone(),
        pull_request.number,
    )
}
