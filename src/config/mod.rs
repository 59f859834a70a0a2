//! Application configuration loaded from CLI, environment, and files.
//!
//! [`PrTallyConfig`] merges values from command-line arguments, environment
//! variables, and configuration files using ortho-config's layered approach.
//! The team roster lives in a separate JSON file ([`TeamsConfig`]) and the
//! reporting window is a [`DateRange`].
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.prtally.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PRTALLY_TOKEN`, `PRTALLY_FROM`, and so on,
//!    plus `GITHUB_TOKEN` as a token fallback
//! 4. **Command-line arguments** – `--token`/`-t`, `--from`, `--to`, ...
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! teams_file = "config/teams.json"
//! from = "2025-01-01"
//! to = "2025-01-31"
//! file_extensions = ".cs"
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8Path;
use chrono::NaiveDate;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::analysis::classifier::{
    DEFAULT_ASSISTANT_MARKER, DEFAULT_FILE_EXTENSIONS, DEFAULT_TEST_MARKER,
};
use crate::analysis::governor::{
    DEFAULT_LOW_WATERMARK, DEFAULT_MIN_SPACING, DEFAULT_QUOTA_ATTEMPTS, DEFAULT_SAFETY_MARGIN,
};
use crate::analysis::{DiffClassifier, ExtensionFilter, GovernorPolicy};
use crate::github::pagination::MAX_PER_PAGE;
use crate::github::{AnalysisError, GITHUB_API_BASE, RepositoryOwner, resolve_api_base};

pub mod date_range;
pub mod teams;

pub use date_range::DateRange;
pub use teams::{DEFAULT_TEAMS_FILE, TeamDefinition, TeamsConfig};

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PRTALLY_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `PRTALLY_TEAMS_FILE` or `--teams-file`: Team configuration JSON
/// - `PRTALLY_ORGANIZATION` or `--organization`: Organisation override
/// - `PRTALLY_FROM`/`PRTALLY_TO` or `--from`/`--to`: Inclusive date bounds
///
/// # Example
///
/// ```no_run
/// use prtally::PrTallyConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = PrTallyConfig::load().expect("failed to load configuration");
/// config.validate().expect("invalid configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PRTALLY",
    discovery(
        dotfile_name = ".prtally.toml",
        config_file_name = "prtally.toml",
        app_name = "prtally"
    )
)]
pub struct PrTallyConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PRTALLY_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Path to the team configuration JSON.
    #[ortho_config(cli_short = 'c')]
    pub teams_file: String,

    /// Organisation name overriding the one in the team file.
    #[ortho_config(cli_short = 'o')]
    pub organization: Option<String>,

    /// First day of the reporting window (`yyyy-mm-dd`).
    #[ortho_config(cli_short = 'f')]
    pub from: Option<String>,

    /// Last day of the reporting window (`yyyy-mm-dd`), inclusive.
    #[ortho_config()]
    pub to: Option<String>,

    /// GitHub API root. Point at a GitHub Enterprise server's `/api/v3`.
    #[ortho_config()]
    pub api_base: String,

    /// Comma-separated extensions of files to scan. Empty scans every file.
    #[ortho_config()]
    pub file_extensions: String,

    /// Marker text identifying a test annotation.
    #[ortho_config()]
    pub test_marker: String,

    /// Marker text identifying an assistant-attributed line.
    #[ortho_config()]
    pub assistant_marker: String,

    /// Matches markers regardless of case.
    #[ortho_config()]
    pub case_insensitive: bool,

    /// Remaining-call threshold below which the run waits for a quota reset.
    #[ortho_config()]
    pub low_watermark: u32,

    /// Seconds added to every quota reset wait.
    #[ortho_config()]
    pub safety_margin_seconds: u64,

    /// Minimum milliseconds between quota-consuming calls.
    #[ortho_config()]
    pub min_call_spacing_ms: u64,

    /// Consecutive quota reads attempted before a team is marked failed.
    #[ortho_config()]
    pub quota_attempts: u32,

    /// Page size for searches and file listings (1 to 100).
    #[ortho_config()]
    pub per_page: u8,

    /// Prompts on standard input for a missing token and for the date range.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so this is set on the command line or in a file.
    #[ortho_config(cli_short = 'i')]
    pub interactive: bool,

    /// Writes JSONL telemetry events to standard error.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for PrTallyConfig {
    fn default() -> Self {
        Self {
            token: None,
            teams_file: DEFAULT_TEAMS_FILE.to_owned(),
            organization: None,
            from: None,
            to: None,
            api_base: GITHUB_API_BASE.to_owned(),
            file_extensions: DEFAULT_FILE_EXTENSIONS.to_owned(),
            test_marker: DEFAULT_TEST_MARKER.to_owned(),
            assistant_marker: DEFAULT_ASSISTANT_MARKER.to_owned(),
            case_insensitive: false,
            low_watermark: DEFAULT_LOW_WATERMARK,
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN.as_secs(),
            min_call_spacing_ms: duration_millis(DEFAULT_MIN_SPACING),
            quota_attempts: DEFAULT_QUOTA_ATTEMPTS,
            per_page: MAX_PER_PAGE,
            interactive: false,
            telemetry: false,
        }
    }
}

impl PrTallyConfig {
    /// Checks values that cannot be expressed through types alone.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when `per_page` is outside
    /// 1..=100, `quota_attempts` is zero, a marker is blank, or the teams
    /// file path is empty.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(configuration(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        if self.quota_attempts == 0 {
            return Err(configuration("quota_attempts must be at least 1"));
        }
        if self.teams_file.trim().is_empty() {
            return Err(configuration("teams_file must not be empty"));
        }
        self.classifier().map(|_| ())
    }

    /// Resolves the token from configuration or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingToken`] when no token source provides
    /// a non-blank value.
    pub fn resolve_token(&self) -> Result<String, AnalysisError> {
        self.token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or(AnalysisError::MissingToken)
    }

    /// Path of the team configuration JSON.
    #[must_use]
    pub fn teams_path(&self) -> &Utf8Path {
        Utf8Path::new(self.teams_file.trim())
    }

    /// The organisation override, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when the override is blank.
    pub fn organization_override(&self) -> Result<Option<RepositoryOwner>, AnalysisError> {
        self.organization
            .as_deref()
            .map(|organization| {
                RepositoryOwner::new(organization)
                    .map_err(|_| configuration("organization must not be blank"))
            })
            .transpose()
    }

    /// Parsed API root.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidUrl`] when `api_base` is not a URL.
    pub fn api_base_url(&self) -> Result<Url, AnalysisError> {
        resolve_api_base(&self.api_base)
    }

    /// Reporting window from `from`/`to`, falling back to the default window
    /// for missing or invalid bounds.
    #[must_use]
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        DateRange::resolve_or_default(self.from.as_deref(), self.to.as_deref(), today)
    }

    /// Rate governor policy.
    #[must_use]
    pub const fn governor_policy(&self) -> GovernorPolicy {
        GovernorPolicy {
            low_watermark: self.low_watermark,
            safety_margin: Duration::from_secs(self.safety_margin_seconds),
            min_spacing: Duration::from_millis(self.min_call_spacing_ms),
            quota_attempts: self.quota_attempts,
        }
    }

    /// Diff classifier built from the extension filter and marker texts.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when a marker is blank.
    pub fn classifier(&self) -> Result<DiffClassifier, AnalysisError> {
        DiffClassifier::with_markers(
            ExtensionFilter::parse(&self.file_extensions),
            &self.test_marker,
            &self.assistant_marker,
            self.case_insensitive,
        )
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn configuration(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Configuration {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests;
