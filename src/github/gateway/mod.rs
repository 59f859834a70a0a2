//! Gateways for searching pull requests and reading diffs through Octocrab.
//!
//! This module provides the trait-based capability the analysis engine calls
//! for every remote operation. The trait-based design enables mocking in tests
//! while the Octocrab implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod pull_request;

pub use pull_request::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::AnalysisError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{FilePage, SearchPage};
use crate::github::rate_limit::{QuotaResource, QuotaState};
use crate::github::search::SearchQuery;

/// Remote capability used by the analysis engine.
///
/// Implementations perform exactly one HTTP request per call and never sleep
/// or retry; pacing belongs to the caller's rate governor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch one page of pull requests matching `query`.
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, AnalysisError>;

    /// Fetch one page of the files changed by a pull request.
    async fn list_changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<FilePage, AnalysisError>;

    /// Fetch the current quota for one bucket.
    async fn quota(&self, resource: QuotaResource) -> Result<QuotaState, AnalysisError>;
}

#[cfg(test)]
mod tests;
