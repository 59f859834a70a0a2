//! Identity wrappers for organisations, repositories, users, and tokens.

use std::fmt;

use url::Url;

use super::error::AnalysisError;

/// Public GitHub REST API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

fn require_non_blank(value: &str, kind: &'static str) -> Result<String, AnalysisError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::EmptyIdentifier { kind });
    }
    Ok(trimmed.to_owned())
}

/// Repository owner (the organisation) wrapper to avoid stringly typed
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyIdentifier`] for blank input.
    pub fn new(value: &str) -> Result<Self, AnalysisError> {
        require_non_blank(value, "organisation name").map(Self)
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the repository name is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyIdentifier`] for blank input.
    pub fn new(value: &str) -> Result<Self, AnalysisError> {
        require_non_blank(value, "repository name").map(Self)
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// GitHub user login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserLogin(String);

impl UserLogin {
    /// Validates that the login is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyIdentifier`] for blank input.
    pub fn new(value: &str) -> Result<Self, AnalysisError> {
        require_non_blank(value, "user login").map(Self)
    }

    /// Borrow the login.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserLogin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Rejects zero, which GitHub never assigns.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, AnalysisError> {
        if value == 0 {
            return Err(AnalysisError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Personal access token wrapper enforcing presence.
///
/// The `Debug` output is redacted so the credential never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, AnalysisError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PersonalAccessToken(<redacted>)")
    }
}

/// Resolves the API root for a configured base URL.
///
/// `github.com` web URLs map onto the public API host; any other URL is used
/// as given so GitHub Enterprise roots (`https://ghe.example.com/api/v3`) and
/// local test servers work unchanged.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidUrl`] when the input cannot be parsed or has
/// no host.
pub fn resolve_api_base(input: &str) -> Result<Url, AnalysisError> {
    let parsed = Url::parse(input).map_err(|error| AnalysisError::InvalidUrl(error.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AnalysisError::InvalidUrl("URL must include a host".to_owned()))?;

    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse(GITHUB_API_BASE)
            .map_err(|error| AnalysisError::InvalidUrl(error.to_string()));
    }

    Ok(parsed)
}

/// One repository inside the analysed organisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryLocator {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator from already validated parts.
    #[must_use]
    pub const fn new(owner: RepositoryOwner, repository: RepositoryName) -> Self {
        Self { owner, repository }
    }

    /// Creates a repository locator from owner and repository name strings.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyIdentifier` when owner or repo is blank.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns the API path listing the changed files of a pull request.
    pub(crate) fn pull_request_files_path(&self, number: PullRequestNumber) -> String {
        format!(
            "/repos/{}/{}/pulls/{}/files",
            self.owner.as_str(),
            self.repository.as_str(),
            number.get()
        )
    }
}

impl fmt::Display for RepositoryLocator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}/{}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}
