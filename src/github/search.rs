//! Search predicate for pull requests authored by one user in one repository.

use std::fmt;

use crate::config::date_range::{DATE_FORMAT, DateRange};

use super::locator::{RepositoryLocator, UserLogin};

/// GitHub never returns more than this many results for one search query.
pub const SEARCH_RESULT_CEILING: u64 = 1000;

/// "Pull requests authored by `author` in `repository` created within
/// `range`", rendered as a GitHub search query string.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use prtally::config::DateRange;
/// use prtally::github::{RepositoryLocator, SearchQuery, UserLogin};
///
/// let repository = RepositoryLocator::from_owner_repo("octo", "widgets").unwrap();
/// let author = UserLogin::new("alice").unwrap();
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
/// )
/// .unwrap();
/// let query = SearchQuery::new(repository, author, range);
/// assert_eq!(
///     query.to_string(),
///     "repo:octo/widgets is:pr author:alice created:2025-01-01..2025-01-31"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    repository: RepositoryLocator,
    author: UserLogin,
    range: DateRange,
}

impl SearchQuery {
    /// Creates the predicate for one (repository, author, window) tuple.
    #[must_use]
    pub const fn new(repository: RepositoryLocator, author: UserLogin, range: DateRange) -> Self {
        Self {
            repository,
            author,
            range,
        }
    }

    /// Repository the search is restricted to.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// Author the search is restricted to.
    #[must_use]
    pub const fn author(&self) -> &UserLogin {
        &self.author
    }

    /// Creation window of the search.
    #[must_use]
    pub const fn range(&self) -> &DateRange {
        &self.range
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "repo:{} is:pr author:{} created:{}..{}",
            self.repository,
            self.author,
            self.range.from().format(DATE_FORMAT),
            self.range.to().format(DATE_FORMAT)
        )
    }
}
