//! Error types exposed by the GitHub capability and input layers.

use thiserror::Error;

/// Errors surfaced while reading input or communicating with GitHub.
///
/// Variants at the remote-call level (`Authentication`, `NotFound`,
/// `Validation`, `RateLimited`, `Api`, `Network`) are recovered by the
/// analysis engine at the granularity where they occur. Configuration
/// variants abort the run before any remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The authentication token was missing.
    #[error("personal access token is required (use --token or GITHUB_TOKEN)")]
    MissingToken,

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A calendar date could not be parsed.
    #[error("invalid date '{input}': expected yyyy-mm-dd")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// The start of a date range falls after its end.
    #[error("date range is inverted: {from} is after {to}")]
    InvalidDateRange {
        /// Requested start date.
        from: String,
        /// Requested end date.
        to: String,
    },

    /// A repository, organisation, or user identifier was blank.
    #[error("{kind} must not be empty")]
    EmptyIdentifier {
        /// The kind of identifier that was blank.
        kind: &'static str,
    },

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The provided API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected or lacks permission.
    #[error("GitHub rejected the request: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// The repository, organisation, or pull request does not exist.
    #[error("GitHub resource not found: {message}")]
    NotFound {
        /// Response detail from GitHub.
        message: String,
    },

    /// GitHub rejected the query, typically an unknown user in a search.
    #[error("GitHub rejected the query: {message}")]
    Validation {
        /// Response detail from GitHub.
        message: String,
    },

    /// GitHub throttled the request despite quota governance.
    #[error("GitHub throttled the request: {message}")]
    RateLimited {
        /// Response detail from GitHub.
        message: String,
    },

    /// GitHub returned any other API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },
}

