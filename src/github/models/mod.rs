//! Data models for search results, changed files, and quota responses.
//!
//! Types prefixed with `Api` are internal deserialisation targets that convert
//! into public domain types.

use serde::Deserialize;

use super::error::AnalysisError;
use super::locator::{PullRequestNumber, RepositoryLocator, UserLogin};
use super::pagination::PageInfo;
use super::rate_limit::{QuotaResource, QuotaState};
use super::search::SearchQuery;

/// Identifies one remote pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestRef {
    /// Repository the pull request belongs to.
    pub repository: RepositoryLocator,
    /// Pull request number.
    pub number: PullRequestNumber,
    /// Author login.
    pub author: UserLogin,
}

/// A changed file and its unified diff patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Path of the file within the repository.
    pub file_name: String,
    /// Unified diff hunk text; absent for binary or oversized files.
    pub patch: Option<String>,
}

impl FileDiff {
    /// Creates a file diff.
    #[must_use]
    pub fn new(file_name: impl Into<String>, patch: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            patch,
        }
    }
}

/// One page of pull request search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Pull requests on this page in the order GitHub returned them.
    pub items: Vec<PullRequestRef>,
    /// Pagination state.
    pub page_info: PageInfo,
}

/// One page of a pull request's changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePage {
    /// Files on this page.
    pub items: Vec<FileDiff>,
    /// Pagination state.
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

/// Search result entry; `/search/issues` returns issues and pull requests in
/// the same shape.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiSearchItem {
    pub(super) number: u64,
    pub(super) user: Option<ApiUser>,
}

impl ApiSearchItem {
    /// Converts a search hit into a reference scoped to the query's
    /// repository. Hits without an author login are attributed to the
    /// queried author, since the query filters on that author.
    pub(super) fn into_pull_request_ref(
        self,
        query: &SearchQuery,
    ) -> Result<PullRequestRef, AnalysisError> {
        let number = PullRequestNumber::new(self.number)?;
        let author = match self.user.and_then(|user| user.login) {
            Some(login) => UserLogin::new(&login)?,
            None => query.author().clone(),
        };

        Ok(PullRequestRef {
            repository: query.repository().clone(),
            number,
            author,
        })
    }
}

/// Changed file entry from `/repos/{owner}/{repo}/pulls/{number}/files`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiFile {
    pub(super) filename: String,
    pub(super) patch: Option<String>,
}

impl From<ApiFile> for FileDiff {
    fn from(value: ApiFile) -> Self {
        Self {
            file_name: value.filename,
            patch: value.patch,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRate {
    pub(super) limit: u64,
    pub(super) remaining: u64,
    pub(super) reset: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRateResources {
    pub(super) core: ApiRate,
    pub(super) search: ApiRate,
}

/// Response body of `/rate_limit`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRateLimit {
    pub(super) resources: ApiRateResources,
}

impl ApiRateLimit {
    /// Selects one bucket, saturating counts that do not fit in `u32`.
    pub(super) fn quota_for(&self, resource: QuotaResource) -> QuotaState {
        let rate = match resource {
            QuotaResource::Core => &self.resources.core,
            QuotaResource::Search => &self.resources.search,
        };
        QuotaState::new(
            u32::try_from(rate.limit).unwrap_or(u32::MAX),
            u32::try_from(rate.remaining).unwrap_or(u32::MAX),
            rate.reset,
        )
    }
}
