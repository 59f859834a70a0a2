//! Wiremock-backed tests for the Octocrab gateway.

use chrono::NaiveDate;
use rstest::rstest;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{OctocrabGateway, PullRequestGateway};
use crate::config::DateRange;
use crate::github::error::AnalysisError;
use crate::github::locator::{
    PersonalAccessToken, PullRequestNumber, RepositoryLocator, UserLogin, resolve_api_base,
};
use crate::github::rate_limit::QuotaResource;
use crate::github::search::SearchQuery;

const API_PREFIX: &str = "/api/v3";

fn gateway_for(server: &MockServer) -> OctocrabGateway {
    let api_base = resolve_api_base(&format!("{}{API_PREFIX}", server.uri()))
        .expect("mock server URL should parse");
    let token = PersonalAccessToken::new("valid-token").expect("token should be valid");
    OctocrabGateway::for_token(&token, &api_base).expect("should create gateway")
}

fn sample_query() -> SearchQuery {
    SearchQuery::new(
        RepositoryLocator::from_owner_repo("octo", "widgets").expect("valid locator"),
        UserLogin::new("alice").expect("valid login"),
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date"),
        )
        .expect("valid range"),
    )
}

#[tokio::test]
async fn search_sends_predicate_and_maps_page() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    let search_path = format!("{API_PREFIX}/search/issues");
    let next_url = format!(
        "{server_uri}{search_path}?q=x&page=2&per_page=2",
        server_uri = server.uri()
    );
    let response = ResponseTemplate::new(200)
        .set_body_json(serde_json::json!({
            "total_count": 3,
            "incomplete_results": false,
            "items": [
                { "number": 11, "title": "First", "user": { "login": "alice" } },
                { "number": 12, "title": "Second", "user": { "login": "alice" } }
            ]
        }))
        .insert_header("Link", format!("<{next_url}>; rel=\"next\""));

    Mock::given(method("GET"))
        .and(path(search_path))
        .and(query_param(
            "q",
            "repo:octo/widgets is:pr author:alice created:2025-01-01..2025-01-31",
        ))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let page = gateway
        .search_pull_requests(&sample_query(), 1, 2)
        .await
        .expect("search should succeed");

    let numbers: Vec<u64> = page.items.iter().map(|item| item.number.get()).collect();
    assert_eq!(numbers, vec![11, 12], "items should keep remote order");
    assert_eq!(page.page_info.total_count(), Some(3));
    assert!(page.page_info.has_next(), "Link header should signal a next page");
}

#[tokio::test]
async fn search_maps_unprocessable_query_to_validation_error() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/search/issues")))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "Validation Failed",
            "documentation_url": "https://docs.github.com/v3/search/"
        })))
        .mount(&server)
        .await;

    let error = gateway
        .search_pull_requests(&sample_query(), 1, 30)
        .await
        .expect_err("search should fail");

    assert!(
        matches!(error, AnalysisError::Validation { .. }),
        "expected Validation, got {error:?}"
    );
}

#[rstest]
#[case(0, 30)]
#[case(1, 101)]
#[tokio::test]
async fn search_rejects_invalid_pagination_without_calling_remote(
    #[case] page: u32,
    #[case] per_page: u8,
) {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    let error = gateway
        .search_pull_requests(&sample_query(), page, per_page)
        .await
        .expect_err("invalid params should fail");

    assert!(
        matches!(error, AnalysisError::InvalidPagination { .. }),
        "expected InvalidPagination, got {error:?}"
    );
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "no request should reach the server");
}

#[tokio::test]
async fn list_changed_files_maps_patches() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/repos/octo/widgets/pulls/7/files")))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "sha": "a1",
                "filename": "src/WidgetTests.cs",
                "status": "modified",
                "patch": "@@ -1,2 +1,3 @@\n+[Test]\n context"
            },
            { "sha": "b2", "filename": "assets/logo.png", "status": "added" }
        ])))
        .mount(&server)
        .await;

    let repository = RepositoryLocator::from_owner_repo("octo", "widgets").expect("valid locator");
    let number = PullRequestNumber::new(7).expect("valid number");
    let page = gateway
        .list_changed_files(&repository, number, 1, 100)
        .await
        .expect("listing should succeed");

    assert_eq!(page.items.len(), 2);
    let first = page.items.first().expect("should have first file");
    assert_eq!(first.file_name, "src/WidgetTests.cs");
    assert!(first.patch.is_some());
    let second = page.items.get(1).expect("should have second file");
    assert!(second.patch.is_none(), "binary file should have no patch");
    assert!(!page.page_info.has_next());
}

#[tokio::test]
async fn list_changed_files_maps_missing_pull_request_to_not_found() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/repos/octo/widgets/pulls/9/files")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let repository = RepositoryLocator::from_owner_repo("octo", "widgets").expect("valid locator");
    let number = PullRequestNumber::new(9).expect("valid number");
    let error = gateway
        .list_changed_files(&repository, number, 1, 100)
        .await
        .expect_err("listing should fail");

    assert!(
        matches!(error, AnalysisError::NotFound { .. }),
        "expected NotFound, got {error:?}"
    );
}

#[tokio::test]
async fn quota_reads_requested_bucket() {
    const SEARCH_RESET_AT: u64 = 1_700_000_060;

    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/rate_limit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resources": {
                "core": { "limit": 5000, "used": 10, "remaining": 4990, "reset": 1_700_000_000_u64 },
                "search": { "limit": 30, "used": 26, "remaining": 4, "reset": SEARCH_RESET_AT }
            },
            "rate": { "limit": 5000, "used": 10, "remaining": 4990, "reset": 1_700_000_000_u64 }
        })))
        .mount(&server)
        .await;

    let search = gateway
        .quota(QuotaResource::Search)
        .await
        .expect("quota should load");
    assert_eq!(search.remaining(), 4);
    assert_eq!(search.reset_at(), SEARCH_RESET_AT);

    let core = gateway
        .quota(QuotaResource::Core)
        .await
        .expect("quota should load");
    assert_eq!(core.remaining(), 4990);
}
