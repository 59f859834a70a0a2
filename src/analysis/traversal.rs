//! Lazy, rate-governed enumeration of one user's pull requests in one
//! repository.

use std::collections::VecDeque;

use crate::config::DateRange;
use crate::github::search::SEARCH_RESULT_CEILING;
use crate::github::{
    PullRequestGateway, PullRequestRef, QuotaResource, RepositoryLocator, SearchQuery, UserLogin,
};

use super::governor::{RateGovernor, RateLimitError};

/// Pull requests matching one search predicate, fetched a page at a time.
///
/// Items come out in the order GitHub returns them. Once exhausted the
/// traversal keeps returning `None`; a different user, repository or range
/// needs a new traversal.
pub struct PullRequestTraversal<'run, 'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    governor: &'run RateGovernor<'gateway, Gateway>,
    query: SearchQuery,
    per_page: u8,
    buffer: VecDeque<PullRequestRef>,
    next_page: u32,
    pages_fetched: u32,
    results_seen: u64,
    exhausted: bool,
    failed: bool,
}

impl<'run, 'gateway, Gateway> PullRequestTraversal<'run, 'gateway, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Pull requests authored by `user` in `repository` created within
    /// `range`.
    #[must_use]
    pub fn for_user(
        governor: &'run RateGovernor<'gateway, Gateway>,
        repository: RepositoryLocator,
        user: UserLogin,
        range: DateRange,
        per_page: u8,
    ) -> Self {
        Self {
            governor,
            query: SearchQuery::new(repository, user, range),
            per_page,
            buffer: VecDeque::new(),
            next_page: 1,
            pages_fetched: 0,
            results_seen: 0,
            exhausted: false,
            failed: false,
        }
    }

    /// The search predicate being walked.
    #[must_use]
    pub const fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Whether a search call failed. The traversal ends at the failure, so
    /// anything not yet yielded is treated as absent.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// Pages successfully fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Yields the next pull request, fetching a page when the buffer is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] when the governor cannot read the search
    /// quota. Search failures themselves end the traversal instead.
    pub async fn next(&mut self) -> Result<Option<PullRequestRef>, RateLimitError> {
        loop {
            if let Some(pull_request) = self.buffer.pop_front() {
                return Ok(Some(pull_request));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<(), RateLimitError> {
        self.governor.acquire(QuotaResource::Search).await?;

        let result = self
            .governor
            .gateway()
            .search_pull_requests(&self.query, self.next_page, self.per_page)
            .await;

        match result {
            Ok(page) => {
                let received = page.items.len();
                self.pages_fetched = self.pages_fetched.saturating_add(1);
                self.results_seen = self
                    .results_seen
                    .saturating_add(u64::try_from(received).unwrap_or(u64::MAX));

                if received < usize::from(self.per_page) || !page.page_info.has_next() {
                    self.exhausted = true;
                } else if self.results_seen >= SEARCH_RESULT_CEILING {
                    tracing::warn!(
                        "search for {} in {} reached the {SEARCH_RESULT_CEILING}-result ceiling; \
                         later pull requests are not counted",
                        self.query.author(),
                        self.query.repository()
                    );
                    self.exhausted = true;
                }

                self.buffer.extend(page.items);
                self.next_page = self.next_page.saturating_add(1);
            }
            Err(error) => {
                tracing::warn!(
                    "search for {} in {} failed on page {}: {error}; treating the pair as having no pull requests",
                    self.query.author(),
                    self.query.repository(),
                    self.next_page
                );
                self.failed = true;
                self.exhausted = true;
            }
        }
        Ok(())
    }
}
