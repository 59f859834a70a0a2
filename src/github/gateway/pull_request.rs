//! Octocrab implementation of the pull request gateway.

use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use url::Url;

use crate::github::error::AnalysisError;
use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{
    ApiFile, ApiRateLimit, ApiSearchItem, FileDiff, FilePage, PullRequestRef, SearchPage,
};
use crate::github::pagination::{PageInfo, validate_pagination};
use crate::github::rate_limit::{QuotaResource, QuotaState};
use crate::github::search::SearchQuery;

use super::PullRequestGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error;

const SEARCH_ISSUES_PATH: &str = "/search/issues";
const RATE_LIMIT_PATH: &str = "/rate_limit";

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and API root.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidUrl` when the base URI cannot be parsed
    /// or `AnalysisError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, AnalysisError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, AnalysisError> {
        validate_pagination(page, per_page)?;

        let search = query.to_string();
        let page_str = page.to_string();
        let per_page_str = per_page.to_string();
        let query_params = [
            ("q", search.as_str()),
            ("page", page_str.as_str()),
            ("per_page", per_page_str.as_str()),
        ];

        let page_result: Page<ApiSearchItem> = self
            .client
            .get(SEARCH_ISSUES_PATH, Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("search pull requests", &error))?;

        // Extract pagination info before consuming items.
        let page_info = PageInfo::builder(page, per_page)
            .total_count(page_result.total_count)
            .has_next(page_result.next.is_some())
            .build();

        let items = page_result
            .items
            .into_iter()
            .map(|item| item.into_pull_request_ref(query))
            .collect::<Result<Vec<PullRequestRef>, AnalysisError>>()?;

        Ok(SearchPage { items, page_info })
    }

    async fn list_changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<FilePage, AnalysisError> {
        validate_pagination(page, per_page)?;

        let page_str = page.to_string();
        let per_page_str = per_page.to_string();
        let query_params = [
            ("page", page_str.as_str()),
            ("per_page", per_page_str.as_str()),
        ];

        let page_result: Page<ApiFile> = self
            .client
            .get(
                repository.pull_request_files_path(number),
                Some(&query_params),
            )
            .await
            .map_err(|error| map_octocrab_error("list pull request files", &error))?;

        let page_info = PageInfo::builder(page, per_page)
            .has_next(page_result.next.is_some())
            .build();
        let items = page_result.items.into_iter().map(FileDiff::from).collect();

        Ok(FilePage { items, page_info })
    }

    async fn quota(&self, resource: QuotaResource) -> Result<QuotaState, AnalysisError> {
        self.client
            .get::<ApiRateLimit, _, _>(RATE_LIMIT_PATH, None::<&()>)
            .await
            .map(|response| response.quota_for(resource))
            .map_err(|error| map_octocrab_error("rate limit", &error))
    }
}
