//! Team-by-team analysis driver.
//!
//! Teams, members and repositories are walked sequentially. Failures are
//! contained at the smallest unit that still lets the run make progress: a
//! failed search ends that member/repository pair and drops whatever it had
//! already counted for the pair, a failed file listing skips that pull
//! request, and only an unreadable quota (or a team whose every search
//! failed) marks the whole team as failed.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{DateRange, TeamDefinition};
use crate::github::pagination::MAX_PER_PAGE;
use crate::github::{
    AnalysisError, PullRequestGateway, PullRequestRef, QuotaResource, RepositoryLocator,
    RepositoryName, RepositoryOwner, UserLogin,
};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::aggregate::{Aggregator, MarkerCounts, UserSummary};
use super::classifier::DiffClassifier;
use super::governor::{RateGovernor, RateLimitError};
use super::traversal::PullRequestTraversal;

/// Lifecycle of one team's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamStatus {
    /// Configured but not yet analysed. [`TeamAnalysisOrchestrator::run`]
    /// takes teams in order, so every team after the current one is pending.
    Pending,
    /// In progress.
    Running,
    /// Finished; the summary is complete.
    Completed,
    /// Abandoned after a team-level failure.
    Failed,
}

impl TeamStatus {
    /// Lowercase name used in logs and telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a team was marked [`TeamStatus::Failed`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TeamFailure {
    /// The rate governor could not read the quota.
    #[error(transparent)]
    Quota(#[from] RateLimitError),
    /// Every search the team issued failed.
    #[error("all {searches} pull request searches failed")]
    SearchesFailed {
        /// Searches attempted.
        searches: usize,
    },
}

/// Inputs for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Organisation owning the repositories.
    pub organization: RepositoryOwner,
    /// Repositories in configured order.
    pub repositories: Vec<RepositoryName>,
    /// Members in configured order.
    pub members: Vec<UserLogin>,
    /// Inclusive creation window.
    pub range: DateRange,
}

impl AnalysisRequest {
    /// Builds the request for `team`.
    #[must_use]
    pub fn for_team(organization: &RepositoryOwner, team: &TeamDefinition, range: DateRange) -> Self {
        Self {
            organization: organization.clone(),
            repositories: team.repositories().to_vec(),
            members: team.members().to_vec(),
            range,
        }
    }
}

/// Result of analysing one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamReport {
    /// Team name.
    pub team: String,
    /// What was analysed.
    pub request: AnalysisRequest,
    /// Final state, always terminal.
    pub status: TeamStatus,
    /// Per-member totals. Partial when the team failed.
    pub summary: UserSummary,
    /// Distinct pull requests counted.
    pub pull_requests: usize,
    /// Searches or pull requests that failed and were skipped.
    pub recovered_failures: usize,
    /// Set when `status` is [`TeamStatus::Failed`].
    pub failure: Option<TeamFailure>,
}

impl TeamReport {
    /// Whether the team completed without finding any pull request.
    #[must_use]
    pub const fn found_nothing(&self) -> bool {
        self.pull_requests == 0
    }
}

#[derive(Debug, Default)]
struct TeamProgress {
    aggregator: Aggregator,
    searches: usize,
    failed_searches: usize,
    recovered_failures: usize,
}

impl TeamProgress {
    fn new(members: &[UserLogin]) -> Self {
        Self {
            aggregator: Aggregator::for_members(members),
            ..Self::default()
        }
    }

    const fn note_recovered(&mut self) {
        self.recovered_failures = self.recovered_failures.saturating_add(1);
    }
}

enum FetchError {
    Quota(RateLimitError),
    Remote(AnalysisError),
}

/// Drives traversal, classification and aggregation for each team.
pub struct TeamAnalysisOrchestrator<'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    governor: RateGovernor<'gateway, Gateway>,
    classifier: DiffClassifier,
    per_page: u8,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<'gateway, Gateway> TeamAnalysisOrchestrator<'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates an orchestrator using the largest page size GitHub allows.
    #[must_use]
    pub fn new(governor: RateGovernor<'gateway, Gateway>, classifier: DiffClassifier) -> Self {
        Self {
            governor,
            classifier,
            per_page: MAX_PER_PAGE,
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Sets the page size for searches and file listings.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page;
        self
    }

    /// Routes team completion events to `telemetry`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Analyses every team in order. A failed team never stops the
    /// remaining ones.
    pub async fn run(
        &self,
        organization: &RepositoryOwner,
        teams: &[TeamDefinition],
        range: DateRange,
    ) -> Vec<TeamReport> {
        let mut reports = Vec::with_capacity(teams.len());
        for team in teams {
            let request = AnalysisRequest::for_team(organization, team, range);
            reports.push(self.run_team(team.name(), request).await);
        }
        reports
    }

    /// Analyses one team.
    pub async fn run_team(&self, team: &str, request: AnalysisRequest) -> TeamReport {
        let mut status = TeamStatus::Running;
        tracing::info!(
            "team {team}: {status} ({} members, {} repositories, {})",
            request.members.len(),
            request.repositories.len(),
            request.range
        );

        let mut progress = TeamProgress::new(&request.members);
        let outcome = self.analyse(team, &request, &mut progress).await;

        let failure = match outcome {
            Err(error) => Some(TeamFailure::from(error)),
            Ok(()) if progress.searches > 0 && progress.failed_searches == progress.searches => {
                Some(TeamFailure::SearchesFailed {
                    searches: progress.searches,
                })
            }
            Ok(()) => None,
        };
        status = if failure.is_some() {
            TeamStatus::Failed
        } else {
            TeamStatus::Completed
        };

        match &failure {
            Some(reason) => tracing::warn!("team {team}: {status}: {reason}"),
            None => tracing::info!(
                "team {team}: {status} ({} pull requests, {} recovered failures)",
                progress.aggregator.pull_requests(),
                progress.recovered_failures
            ),
        }

        let pull_requests = progress.aggregator.pull_requests();
        self.telemetry.record(TelemetryEvent::TeamFinished {
            team: team.to_owned(),
            status: status.to_string(),
            pull_requests,
            recovered_failures: progress.recovered_failures,
        });

        TeamReport {
            team: team.to_owned(),
            request,
            status,
            summary: progress.aggregator.into_summary(),
            pull_requests,
            recovered_failures: progress.recovered_failures,
            failure,
        }
    }

    async fn analyse(
        &self,
        team: &str,
        request: &AnalysisRequest,
        progress: &mut TeamProgress,
    ) -> Result<(), RateLimitError> {
        for member in &request.members {
            for repository_name in &request.repositories {
                let repository =
                    RepositoryLocator::new(request.organization.clone(), repository_name.clone());
                self.analyse_pair(team, repository, member, request.range, progress)
                    .await?;
            }
        }
        Ok(())
    }

    async fn analyse_pair(
        &self,
        team: &str,
        repository: RepositoryLocator,
        member: &UserLogin,
        range: DateRange,
        progress: &mut TeamProgress,
    ) -> Result<(), RateLimitError> {
        let mut traversal = PullRequestTraversal::for_user(
            &self.governor,
            repository,
            member.clone(),
            range,
            self.per_page,
        );

        // Counts stay pending until the search completes; a pair whose
        // search fails contributes nothing.
        let mut pending: Vec<(PullRequestRef, MarkerCounts)> = Vec::new();
        while let Some(pull_request) = traversal.next().await? {
            let seen = progress.aggregator.is_counted(member, &pull_request)
                || pending.iter().any(|(counted, _)| counted == &pull_request);
            if seen {
                tracing::debug!(
                    "team {team}: {} {} already counted for {member}",
                    pull_request.repository,
                    pull_request.number
                );
                continue;
            }

            match self.classify_pull_request(&pull_request).await {
                Ok(counts) => pending.push((pull_request, counts)),
                Err(FetchError::Quota(error)) => return Err(error),
                Err(FetchError::Remote(error)) => {
                    tracing::warn!(
                        "team {team}: skipping {} {} by {member}: {error}",
                        pull_request.repository,
                        pull_request.number
                    );
                    progress.note_recovered();
                }
            }
        }

        progress.searches = progress.searches.saturating_add(1);
        if traversal.failed() {
            progress.note_recovered();
            if traversal.pages_fetched() == 0 {
                progress.failed_searches = progress.failed_searches.saturating_add(1);
            } else {
                tracing::warn!(
                    "team {team}: discarding {} pull request(s) by {member} in {} after the search failed",
                    pending.len(),
                    traversal.query().repository()
                );
            }
            return Ok(());
        }

        for (pull_request, counts) in pending {
            progress.aggregator.record(member, &pull_request, counts);
        }
        Ok(())
    }

    /// Sums the classification of every changed file. A listing failure on
    /// any page discards the whole pull request.
    async fn classify_pull_request(
        &self,
        pull_request: &PullRequestRef,
    ) -> Result<MarkerCounts, FetchError> {
        let mut counts = MarkerCounts::default();
        let mut page = 1;

        loop {
            self.governor
                .acquire(QuotaResource::Core)
                .await
                .map_err(FetchError::Quota)?;
            let files = self
                .governor
                .gateway()
                .list_changed_files(&pull_request.repository, pull_request.number, page, self.per_page)
                .await
                .map_err(FetchError::Remote)?;

            counts = files
                .items
                .iter()
                .fold(counts, |total, file| total.add(self.classifier.classify_file(file)));

            if files.items.len() < usize::from(self.per_page) || !files.page_info.has_next() {
                return Ok(counts);
            }
            page += 1;
        }
    }
}
