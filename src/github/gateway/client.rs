//! Octocrab client construction helpers for gateway implementations.

use http::Uri;
use octocrab::Octocrab;
use url::Url;

use crate::github::error::AnalysisError;
use crate::github::locator::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidUrl` when the base URI cannot be parsed or
/// `AnalysisError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &PersonalAccessToken,
    api_base: &Url,
) -> Result<Octocrab, AnalysisError> {
    let base_uri: Uri = api_base
        .as_str()
        .parse::<Uri>()
        .map_err(|error| AnalysisError::InvalidUrl(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| AnalysisError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
