//! Team analysis run: resolve inputs, build the gateway, print reports.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use prtally::analysis::AnalysisRequest;
use prtally::{
    AnalysisError, DateRange, NoopTelemetrySink, OctocrabGateway, PersonalAccessToken,
    PrTallyConfig, PullRequestGateway, RateGovernor, StderrJsonlTelemetrySink,
    TeamAnalysisOrchestrator, TeamsConfig, TelemetrySink,
};
use url::Url;

use super::output::{io_error, write_completion, write_run_header, write_team_report};
use super::prompt::{prompt_date_range, prompt_token};

/// Runs the analysis against GitHub, printing to stdout.
///
/// # Errors
///
/// Returns a configuration error when the configuration, team file or token
/// is missing or invalid, and [`AnalysisError::Io`] when output fails.
/// Remote failures are reported per team instead.
pub async fn run(config: &PrTallyConfig) -> Result<(), AnalysisError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut prompts = io::stderr();
    let mut stdout = io::stdout().lock();
    let today = Local::now().date_naive();

    run_with_gateway_builder(
        config,
        OctocrabGateway::for_token,
        &mut input,
        &mut prompts,
        &mut stdout,
        today,
    )
    .await
}

/// Runs the analysis using a custom gateway builder.
///
/// This function is exposed for testing with fake gateways.
pub async fn run_with_gateway_builder<G, F, R, P, W>(
    config: &PrTallyConfig,
    build_gateway: F,
    input: &mut R,
    prompts: &mut P,
    writer: &mut W,
    today: NaiveDate,
) -> Result<(), AnalysisError>
where
    G: PullRequestGateway,
    F: FnOnce(&PersonalAccessToken, &Url) -> Result<G, AnalysisError>,
    R: io::BufRead,
    P: Write,
    W: Write,
{
    config.validate()?;
    let teams = load_teams(config)?;
    let token = resolve_token(config, input, prompts)?;
    let range = resolve_date_range(config, input, prompts, today)?;
    let api_base = config.api_base_url()?;

    let gateway = build_gateway(&token, &api_base)?;
    analyse_teams(config, &gateway, &teams, range, writer).await
}

/// Loads the team file and applies the organisation override.
fn load_teams(config: &PrTallyConfig) -> Result<TeamsConfig, AnalysisError> {
    let teams = TeamsConfig::load(config.teams_path())?;
    Ok(match config.organization_override()? {
        Some(organization) => teams.with_organization(organization),
        None => teams,
    })
}

/// Configured token, then `GITHUB_TOKEN`, then a prompt in interactive mode.
fn resolve_token<R, P>(
    config: &PrTallyConfig,
    input: &mut R,
    prompts: &mut P,
) -> Result<PersonalAccessToken, AnalysisError>
where
    R: io::BufRead,
    P: Write,
{
    match config.resolve_token() {
        Ok(value) => PersonalAccessToken::new(value),
        Err(AnalysisError::MissingToken) if config.interactive => prompt_token(input, prompts),
        Err(error) => Err(error),
    }
}

/// Prompts for the window only when interactive and no bound is configured.
fn resolve_date_range<R, P>(
    config: &PrTallyConfig,
    input: &mut R,
    prompts: &mut P,
    today: NaiveDate,
) -> Result<DateRange, AnalysisError>
where
    R: io::BufRead,
    P: Write,
{
    if config.interactive && config.from.is_none() && config.to.is_none() {
        prompt_date_range(input, prompts, today)
    } else {
        Ok(config.date_range(today))
    }
}

async fn analyse_teams<G, W>(
    config: &PrTallyConfig,
    gateway: &G,
    teams: &TeamsConfig,
    range: DateRange,
    writer: &mut W,
) -> Result<(), AnalysisError>
where
    G: PullRequestGateway,
    W: Write,
{
    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };
    let governor =
        RateGovernor::new(gateway, config.governor_policy()).with_telemetry(Arc::clone(&telemetry));
    let orchestrator = TeamAnalysisOrchestrator::new(governor, config.classifier()?)
        .with_per_page(config.per_page)
        .with_telemetry(telemetry);

    write_run_header(writer, teams.organization(), teams.teams().len(), range)?;
    for team in teams.teams() {
        let request = AnalysisRequest::for_team(teams.organization(), team, range);
        let report = orchestrator.run_team(team.name(), request).await;
        write_team_report(writer, &report)?;
        writer.flush().map_err(|e| io_error(&e))?;
    }
    write_completion(writer)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use camino::Utf8PathBuf;
    use chrono::NaiveDate;
    use prtally::{AnalysisError, PrTallyConfig};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::run_with_gateway_builder;
    use crate::cli::test_utils::ScriptedGateway;

    const TEAMS_JSON: &str = r#"{
        "organizationName": "acme",
        "teams": {
            "platform": { "members": ["alice", "bob"], "repositories": ["payments"] },
            "mobile": { "members": ["carol"], "repositories": ["app"] }
        }
    }"#;

    struct Workspace {
        _temp_dir: TempDir,
        teams_file: Utf8PathBuf,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let temp_dir = TempDir::new().expect("failed to create temporary directory");
        let teams_file = Utf8PathBuf::from_path_buf(temp_dir.path().join("teams.json"))
            .expect("temporary path should be UTF-8");
        fs::write(&teams_file, TEAMS_JSON).expect("failed to write teams file");
        Workspace {
            _temp_dir: temp_dir,
            teams_file,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date")
    }

    fn config_for(workspace: &Workspace) -> PrTallyConfig {
        PrTallyConfig {
            token: Some("ghp_example".to_owned()),
            teams_file: workspace.teams_file.to_string(),
            from: Some("2025-03-01".to_owned()),
            to: Some("2025-03-31".to_owned()),
            ..Default::default()
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn prints_each_team_and_completion(workspace: Workspace) {
        let gateway = ScriptedGateway::default()
            .with_search("alice", "payments", &[12])
            .with_files("payments", 12, "src/LedgerTests.cs", "+[Test]\n+// Added by copilot");
        let captured = gateway.searches();

        let mut output = Vec::new();
        run_with_gateway_builder(
            &config_for(&workspace),
            |_, _| Ok(gateway),
            &mut Cursor::new(""),
            &mut Vec::new(),
            &mut output,
            today(),
        )
        .await
        .expect("run should succeed");

        let text = String::from_utf8(output).expect("output should be UTF-8");
        assert!(text.contains("Analysing 2 team(s) in acme from 2025-03-01 to 2025-03-31"));
        assert!(text.contains("  alice: Tests: 1, Assistant Lines: 1"), "output: {text}");
        assert!(text.contains("  bob: Tests: 0, Assistant Lines: 0"));
        assert!(text.contains("Team: mobile"));
        assert!(text.contains("  carol: Tests: 0, Assistant Lines: 0"));
        assert!(text.trim_end().ends_with("Analysis complete."));

        let queries = captured.lock().expect("searches mutex").clone();
        assert!(
            queries.contains(
                &"repo:acme/payments is:pr author:alice created:2025-03-01..2025-03-31".to_owned()
            ),
            "queries: {queries:?}"
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn organization_override_replaces_file_value(workspace: Workspace) {
        let gateway = ScriptedGateway::default();
        let captured = gateway.searches();
        let config = PrTallyConfig {
            organization: Some("globex".to_owned()),
            ..config_for(&workspace)
        };

        let mut output = Vec::new();
        run_with_gateway_builder(
            &config,
            |_, _| Ok(gateway),
            &mut Cursor::new(""),
            &mut Vec::new(),
            &mut output,
            today(),
        )
        .await
        .expect("run should succeed");

        let queries = captured.lock().expect("searches mutex").clone();
        assert!(queries.iter().all(|query| query.starts_with("repo:globex/")));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_token_is_fatal_before_any_remote_call(workspace: Workspace) {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
        let config = PrTallyConfig {
            token: None,
            ..config_for(&workspace)
        };

        let result = run_with_gateway_builder(
            &config,
            |_, _| -> Result<ScriptedGateway, AnalysisError> {
                panic!("gateway should not be built without a token")
            },
            &mut Cursor::new(""),
            &mut Vec::new(),
            &mut Vec::new(),
            today(),
        )
        .await;

        assert!(
            matches!(result, Err(AnalysisError::MissingToken)),
            "expected MissingToken, got {result:?}"
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn interactive_mode_prompts_for_token_and_dates(workspace: Workspace) {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
        let config = PrTallyConfig {
            token: None,
            from: None,
            to: None,
            interactive: true,
            ..config_for(&workspace)
        };
        let gateway = ScriptedGateway::default();
        let captured = gateway.searches();

        let mut prompts = Vec::new();
        run_with_gateway_builder(
            &config,
            |token, _| {
                assert_eq!(token.value(), "ghp_prompted");
                Ok(gateway)
            },
            &mut Cursor::new("ghp_prompted\n2025-01-01\n2025-01-15\n"),
            &mut prompts,
            &mut Vec::new(),
            today(),
        )
        .await
        .expect("run should succeed");

        let queries = captured.lock().expect("searches mutex").clone();
        assert!(
            queries
                .iter()
                .all(|query| query.ends_with("created:2025-01-01..2025-01-15")),
            "queries: {queries:?}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_teams_file_is_fatal() {
        let config = PrTallyConfig {
            token: Some("ghp_example".to_owned()),
            teams_file: "does/not/exist/teams.json".to_owned(),
            ..Default::default()
        };

        let result = run_with_gateway_builder(
            &config,
            |_, _| Ok(ScriptedGateway::default()),
            &mut Cursor::new(""),
            &mut Vec::new(),
            &mut Vec::new(),
            today(),
        )
        .await;

        assert!(
            matches!(result, Err(AnalysisError::Configuration { .. })),
            "expected Configuration error, got {result:?}"
        );
    }
}
