//! Shared test utilities for CLI tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prtally::github::{
    FileDiff, FilePage, PageInfo, PullRequestNumber, PullRequestRef, QuotaResource, QuotaState,
    RepositoryLocator, SearchPage, SearchQuery,
};
use prtally::{AnalysisError, PullRequestGateway};

/// A gateway answering from preconfigured results and recording every search
/// query it receives.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    searches: Arc<Mutex<Vec<String>>>,
    results: HashMap<(String, String), Vec<u64>>,
    files: HashMap<(String, u64), Vec<FileDiff>>,
}

impl ScriptedGateway {
    /// Pull request numbers returned for `author` in `repository`.
    pub fn with_search(mut self, author: &str, repository: &str, numbers: &[u64]) -> Self {
        self.results
            .insert((author.to_owned(), repository.to_owned()), numbers.to_vec());
        self
    }

    /// Adds a changed file to pull request `number` in `repository`.
    pub fn with_files(mut self, repository: &str, number: u64, file_name: &str, patch: &str) -> Self {
        self.files
            .entry((repository.to_owned(), number))
            .or_default()
            .push(FileDiff::new(file_name, Some(patch.to_owned())));
        self
    }

    /// Handle on the recorded search queries.
    pub fn searches(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.searches)
    }
}

#[async_trait]
impl PullRequestGateway for ScriptedGateway {
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, AnalysisError> {
        self.searches
            .lock()
            .expect("searches mutex should be available")
            .push(query.to_string());

        let key = (
            query.author().as_str().to_owned(),
            query.repository().repository().as_str().to_owned(),
        );
        let items = self
            .results
            .get(&key)
            .map(|numbers| {
                numbers
                    .iter()
                    .map(|number| PullRequestRef {
                        repository: query.repository().clone(),
                        number: PullRequestNumber::new(*number).expect("valid number"),
                        author: query.author().clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SearchPage {
            items,
            page_info: PageInfo::builder(page, per_page).build(),
        })
    }

    async fn list_changed_files(
        &self,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        page: u32,
        per_page: u8,
    ) -> Result<FilePage, AnalysisError> {
        let key = (repository.repository().as_str().to_owned(), number.get());
        Ok(FilePage {
            items: self.files.get(&key).cloned().unwrap_or_default(),
            page_info: PageInfo::builder(page, per_page).build(),
        })
    }

    async fn quota(&self, _resource: QuotaResource) -> Result<QuotaState, AnalysisError> {
        Ok(QuotaState::new(5000, 5000, 0))
    }
}
