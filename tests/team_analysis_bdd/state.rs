//! Scenario state and the analysis driver for the team analysis BDD tests.

use std::time::Duration;

use chrono::NaiveDate;
use prtally::github::{RepositoryOwner, resolve_api_base};
use prtally::{
    DateRange, DiffClassifier, GovernorPolicy, OctocrabGateway, PersonalAccessToken,
    RateGovernor, TeamAnalysisOrchestrator, TeamDefinition, TeamReport,
};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use wiremock::{Mock, MockServer};

use super::runtime::{self, SharedRuntime};

/// Prefix GitHub Enterprise puts in front of every REST path.
pub(crate) const API_PREFIX: &str = "/api/v3";

#[derive(ScenarioState, Default)]
pub(crate) struct AnalysisState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) teams: Slot<Vec<TeamDefinition>>,
    pub(crate) reports: Slot<Vec<TeamReport>>,
}

impl AnalysisState {
    /// Finds the report for `team`.
    pub(crate) fn report(&self, team: &str) -> TeamReport {
        self.reports
            .with_ref(|reports| reports.iter().find(|report| report.team == team).cloned())
            .flatten()
            .unwrap_or_else(|| panic!("no report for team {team}"))
    }
}

/// Ensures the runtime and server are initialised in `AnalysisState`.
pub(crate) fn ensure_runtime_and_server(state: &AnalysisState) -> SharedRuntime {
    runtime::ensure_runtime_and_server(&state.runtime, &state.server)
        .unwrap_or_else(|error| panic!("failed to initialise runtime: {error}"))
}

/// Mounts `mock` on the scenario's server.
pub(crate) fn mount(state: &AnalysisState, mock: Mock) {
    let shared_runtime = ensure_runtime_and_server(state);
    state
        .server
        .with_ref(|server| shared_runtime.block_on(mock.mount(server)))
        .unwrap_or_else(|| panic!("mock server not initialised"));
}

/// The window every scenario analyses.
pub(crate) fn analysis_range() -> DateRange {
    let date = |day| {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap_or_else(|| panic!("invalid day {day}"))
    };
    DateRange::new(date(1), date(31)).unwrap_or_else(|error| panic!("invalid range: {error}"))
}

/// Runs every configured team against the mock server.
pub(crate) fn run_analysis(state: &AnalysisState, organization: &str) -> Vec<TeamReport> {
    let shared_runtime = ensure_runtime_and_server(state);
    let server_uri = state
        .server
        .with_ref(MockServer::uri)
        .unwrap_or_else(|| panic!("mock server URL missing"));
    let teams = state.teams.get().unwrap_or_default();

    let api_base = resolve_api_base(&format!("{server_uri}{API_PREFIX}"))
        .unwrap_or_else(|error| panic!("mock server URL should parse: {error}"));
    let token = PersonalAccessToken::new("ghp_scenario")
        .unwrap_or_else(|error| panic!("token should be valid: {error}"));
    let owner = RepositoryOwner::new(organization)
        .unwrap_or_else(|error| panic!("organization should be valid: {error}"));

    shared_runtime.block_on(async {
        let gateway = OctocrabGateway::for_token(&token, &api_base)
            .unwrap_or_else(|error| panic!("gateway should build: {error}"));
        let policy = GovernorPolicy {
            min_spacing: Duration::ZERO,
            ..GovernorPolicy::default()
        };
        let orchestrator = TeamAnalysisOrchestrator::new(
            RateGovernor::new(&gateway, policy),
            DiffClassifier::default(),
        );
        orchestrator.run(&owner, &teams, analysis_range()).await
    })
}
