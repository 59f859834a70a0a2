//! GitHub capability used by the analysis engine.
//!
//! This module wraps Octocrab to search pull requests by author, list the
//! files a pull request changed, and read the current quota. Errors are mapped
//! into user-friendly variants so that callers can contain failures at the
//! right granularity without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod search;

pub use error::AnalysisError;
pub use gateway::{OctocrabGateway, PullRequestGateway};
pub use locator::{
    GITHUB_API_BASE, PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner, UserLogin, resolve_api_base,
};
pub use models::{FileDiff, FilePage, PullRequestRef, SearchPage};
pub use pagination::PageInfo;
pub use rate_limit::{QuotaResource, QuotaState};
pub use search::SearchQuery;

#[cfg(test)]
pub use gateway::MockPullRequestGateway;

#[cfg(test)]
mod tests;
