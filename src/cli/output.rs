//! Report formatting for CLI output.

use std::io::{self, Write};

use prtally::github::{RepositoryName, RepositoryOwner, UserLogin};
use prtally::{AnalysisError, DateRange, TeamReport, TeamStatus};

/// Writes the line announcing the run.
pub fn write_run_header<W: Write>(
    writer: &mut W,
    organization: &RepositoryOwner,
    teams: usize,
    range: DateRange,
) -> Result<(), AnalysisError> {
    writeln!(
        writer,
        "Analysing {teams} team(s) in {} from {range}",
        organization.as_str()
    )
    .map_err(|e| io_error(&e))
}

/// Writes one team's section: header, then totals or a diagnostic.
pub fn write_team_report<W: Write>(writer: &mut W, report: &TeamReport) -> Result<(), AnalysisError> {
    let request = &report.request;

    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "Team: {}", report.team).map_err(|e| io_error(&e))?;
    writeln!(writer, "  Date range: {}", request.range).map_err(|e| io_error(&e))?;
    writeln!(writer, "  Members: {}", join_logins(&request.members)).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "  Repositories: {}",
        join_repositories(&request.repositories)
    )
    .map_err(|e| io_error(&e))?;

    if report.status == TeamStatus::Failed {
        let reason = report
            .failure
            .as_ref()
            .map_or_else(|| "unknown failure".to_owned(), ToString::to_string);
        writeln!(writer, "  Analysis failed: {reason}").map_err(|e| io_error(&e))?;
        return write_checklist(writer, &request.organization);
    }

    for (user, counts) in report.summary.iter() {
        writeln!(
            writer,
            "  {user}: Tests: {}, Assistant Lines: {}",
            counts.test_lines(),
            counts.assistant_lines()
        )
        .map_err(|e| io_error(&e))?;
    }

    if report.recovered_failures > 0 {
        writeln!(
            writer,
            "  Note: {} search(es) or pull request(s) were skipped after errors; see the log.",
            report.recovered_failures
        )
        .map_err(|e| io_error(&e))?;
    }

    if report.found_nothing() {
        writeln!(writer, "  No pull requests were found.").map_err(|e| io_error(&e))?;
        write_checklist(writer, &request.organization)?;
    }
    Ok(())
}

/// Writes the final line of a run.
pub fn write_completion<W: Write>(writer: &mut W) -> Result<(), AnalysisError> {
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "Analysis complete.").map_err(|e| io_error(&e))
}

/// Possible causes of an empty or failed team, listed without picking one.
fn write_checklist<W: Write>(
    writer: &mut W,
    organization: &RepositoryOwner,
) -> Result<(), AnalysisError> {
    let organization_name = organization.as_str();
    let lines = [
        "  Possible causes:".to_owned(),
        "    - no pull requests were created in the date range".to_owned(),
        format!("    - the organization name '{organization_name}' or a repository name is wrong"),
        "    - the token lacks permission to read the repositories".to_owned(),
        "    - a member username is not a valid GitHub login".to_owned(),
    ];
    for line in lines {
        writeln!(writer, "{line}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn join_logins(logins: &[UserLogin]) -> String {
    logins
        .iter()
        .map(UserLogin::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_repositories(repositories: &[RepositoryName]) -> String {
    repositories
        .iter()
        .map(RepositoryName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Converts an I/O error into an [`AnalysisError::Io`].
pub fn io_error(error: &io::Error) -> AnalysisError {
    AnalysisError::Io {
        message: error.to_string(),
    }
}
