//! Error mapping helpers for the Octocrab gateway.
//!
//! Classification relies on the structured HTTP status only; GitHub's message
//! text is carried for diagnostics but never inspected.

use http::StatusCode;

use crate::github::error::AnalysisError;

/// Checks if a GitHub error status indicates an authentication or permission
/// failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

fn map_status(operation: &str, status: StatusCode, message: &str) -> AnalysisError {
    let detail = format!("{operation} failed with status {status}: {message}");
    match status {
        StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited { message: detail },
        StatusCode::NOT_FOUND => AnalysisError::NotFound { message: detail },
        StatusCode::UNPROCESSABLE_ENTITY => AnalysisError::Validation { message: detail },
        _ if is_auth_failure(status) => AnalysisError::Authentication { message: detail },
        _ => AnalysisError::Api { message: detail },
    }
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> AnalysisError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return map_status(operation, source.status_code, &source.message);
    }

    if is_network_error(error) {
        return AnalysisError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    AnalysisError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
