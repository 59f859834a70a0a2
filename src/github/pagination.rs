//! Pagination state and navigation for GitHub API responses.
//!
//! This module provides types for tracking pagination state when walking
//! search results and pull request file listings. The `PageInfo` struct
//! captures the current page position and whether the remote signalled more
//! results.

use super::error::AnalysisError;

/// Largest page size GitHub accepts.
pub const MAX_PER_PAGE: u8 = 100;

/// Current page state for paginated results.
///
/// # Example
///
/// ```
/// use prtally::github::pagination::PageInfo;
///
/// let info = PageInfo::builder(2, 50)
///     .total_count(Some(240))
///     .has_next(true)
///     .build();
/// assert!(!info.is_first_page());
/// assert!(!info.is_last_page());
/// assert_eq!(info.total_count(), Some(240));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page number (1-based).
    current_page: u32,
    /// Items per page.
    per_page: u8,
    /// Total number of matching items if the remote reported it.
    total_count: Option<u64>,
    /// Whether more pages exist after the current one.
    has_next: bool,
}

impl PageInfo {
    /// Starts building page info for `current_page` with `per_page` items.
    #[must_use]
    pub const fn builder(current_page: u32, per_page: u8) -> PageInfoBuilder {
        PageInfoBuilder {
            info: Self {
                current_page,
                per_page,
                total_count: None,
                has_next: false,
            },
        }
    }

    /// Returns the current page number (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Returns the number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Returns the total number of matching items if known.
    #[must_use]
    pub const fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Returns true if more pages exist after the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Returns true if this is the first page.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    /// Returns true if this is the last page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        !self.has_next
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: 30,
            total_count: None,
            has_next: false,
        }
    }
}

/// Builder for [`PageInfo`].
#[derive(Debug, Clone, Copy)]
pub struct PageInfoBuilder {
    info: PageInfo,
}

impl PageInfoBuilder {
    /// Sets the total number of matching items.
    #[must_use]
    pub const fn total_count(mut self, total_count: Option<u64>) -> Self {
        self.info.total_count = total_count;
        self
    }

    /// Sets whether there is a next page.
    #[must_use]
    pub const fn has_next(mut self, has_next: bool) -> Self {
        self.info.has_next = has_next;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub const fn build(self) -> PageInfo {
        self.info
    }
}

/// Rejects page numbers and sizes GitHub would refuse.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidPagination`] when `page` is zero or
/// `per_page` falls outside `1..=100`.
pub fn validate_pagination(page: u32, per_page: u8) -> Result<(), AnalysisError> {
    if page == 0 {
        return Err(AnalysisError::InvalidPagination {
            message: "page must be at least 1".to_owned(),
        });
    }

    if per_page == 0 {
        return Err(AnalysisError::InvalidPagination {
            message: "per_page must be at least 1".to_owned(),
        });
    }

    if per_page > MAX_PER_PAGE {
        return Err(AnalysisError::InvalidPagination {
            message: format!("per_page must not exceed {MAX_PER_PAGE}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{PageInfo, validate_pagination};
    use crate::github::AnalysisError;

    #[test]
    fn default_page_is_first_and_last() {
        let info = PageInfo::default();
        assert!(info.is_first_page());
        assert!(info.is_last_page());
        assert_eq!(info.per_page(), 30);
    }

    #[rstest]
    #[case(0, 30)]
    #[case(1, 0)]
    #[case(1, 101)]
    fn rejects_out_of_range_pagination(#[case] page: u32, #[case] per_page: u8) {
        let result = validate_pagination(page, per_page);
        assert!(
            matches!(result, Err(AnalysisError::InvalidPagination { .. })),
            "expected InvalidPagination, got {result:?}"
        );
    }

    #[test]
    fn accepts_maximum_page_size() {
        assert!(validate_pagination(10, 100).is_ok());
    }
}
