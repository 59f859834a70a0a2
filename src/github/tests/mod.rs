//! Unit tests for the GitHub identifiers and search predicate.

use chrono::NaiveDate;
use rstest::rstest;

use super::{
    AnalysisError, PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName,
    SearchQuery, UserLogin, resolve_api_base,
};
use crate::config::DateRange;

#[rstest]
fn rejects_empty_token() {
    let result = PersonalAccessToken::new(String::new());
    assert!(
        matches!(result, Err(AnalysisError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn trims_token_whitespace() {
    let token = PersonalAccessToken::new("  ghp_example\n").expect("token should be valid");
    assert_eq!(token.value(), "ghp_example");
}

#[rstest]
fn token_debug_output_is_redacted() {
    let token = PersonalAccessToken::new("ghp_secret").expect("token should be valid");
    let rendered = format!("{token:?}");
    assert!(
        !rendered.contains("ghp_secret"),
        "token leaked into debug output: {rendered}"
    );
}

#[rstest]
#[case("")]
#[case("   ")]
fn rejects_blank_identifiers(#[case] value: &str) {
    assert!(matches!(
        RepositoryName::new(value),
        Err(AnalysisError::EmptyIdentifier { .. })
    ));
    assert!(matches!(
        UserLogin::new(value),
        Err(AnalysisError::EmptyIdentifier { .. })
    ));
    assert!(matches!(
        RepositoryLocator::from_owner_repo(value, "repo"),
        Err(AnalysisError::EmptyIdentifier { .. })
    ));
}

#[rstest]
fn rejects_zero_pull_request_number() {
    let result = PullRequestNumber::new(0);
    assert!(
        matches!(result, Err(AnalysisError::InvalidPullRequestNumber)),
        "expected InvalidPullRequestNumber for zero, got {result:?}"
    );
}

#[rstest]
#[case("https://github.com", "https://api.github.com/")]
#[case("https://api.github.com", "https://api.github.com/")]
#[case("https://ghe.example.com/api/v3", "https://ghe.example.com/api/v3")]
fn resolves_api_base(#[case] input: &str, #[case] expected: &str) {
    let api_base = resolve_api_base(input).expect("API base should resolve");
    assert_eq!(api_base.as_str(), expected, "api base mismatch");
}

#[rstest]
fn rejects_invalid_api_base() {
    let result = resolve_api_base("not a url");
    assert!(
        matches!(result, Err(AnalysisError::InvalidUrl(_))),
        "expected InvalidUrl, got {result:?}"
    );
}

#[rstest]
fn renders_search_predicate_with_inclusive_window() {
    let query = SearchQuery::new(
        RepositoryLocator::from_owner_repo("acme", "payments").expect("valid locator"),
        UserLogin::new("bob").expect("valid login"),
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
        )
        .expect("valid range"),
    );

    assert_eq!(
        query.to_string(),
        "repo:acme/payments is:pr author:bob created:2024-12-01..2024-12-31"
    );
}

#[rstest]
fn builds_pull_request_files_path() {
    let locator = RepositoryLocator::from_owner_repo("acme", "payments").expect("valid locator");
    let number = PullRequestNumber::new(42).expect("valid number");
    assert_eq!(
        locator.pull_request_files_path(number),
        "/repos/acme/payments/pulls/42/files"
    );
}
