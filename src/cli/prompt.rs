//! Interactive prompts for the token and the reporting window.
//!
//! Prompts read from any `BufRead` and write to any `Write`, so the binary
//! uses stdin/stderr while tests use in-memory buffers.

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use prtally::config::date_range::{DATE_FORMAT, default_from, parse_date};
use prtally::{AnalysisError, DateRange, PersonalAccessToken};

use super::output::io_error;

/// Asks for a personal access token.
///
/// # Errors
///
/// Returns [`AnalysisError::MissingToken`] for blank input and
/// [`AnalysisError::Io`] when the prompt cannot be written or read.
pub fn prompt_token<R, W>(input: &mut R, prompts: &mut W) -> Result<PersonalAccessToken, AnalysisError>
where
    R: BufRead,
    W: Write,
{
    write!(prompts, "GitHub personal access token: ").map_err(|e| io_error(&e))?;
    prompts.flush().map_err(|e| io_error(&e))?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(|e| io_error(&e))?;
    PersonalAccessToken::new(line)
}

/// Asks for the start and end dates, re-prompting until each answer is
/// blank (keep the default) or a valid date. An end date before the start
/// date is asked again.
///
/// # Errors
///
/// Returns [`AnalysisError::Io`] when the prompt cannot be written or read.
pub fn prompt_date_range<R, W>(
    input: &mut R,
    prompts: &mut W,
    today: NaiveDate,
) -> Result<DateRange, AnalysisError>
where
    R: BufRead,
    W: Write,
{
    let from = prompt_date(input, prompts, "Start date", default_from(today), None)?;
    let to = prompt_date(input, prompts, "End date", today, Some(from))?;

    Ok(DateRange::new(from, to).unwrap_or_else(|error| {
        tracing::warn!("{error}; using the default window");
        DateRange::ending_on(today)
    }))
}

fn prompt_date<R, W>(
    input: &mut R,
    prompts: &mut W,
    label: &str,
    default: NaiveDate,
    not_before: Option<NaiveDate>,
) -> Result<NaiveDate, AnalysisError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(
            prompts,
            "{label} (yyyy-mm-dd) [{}]: ",
            default.format(DATE_FORMAT)
        )
        .map_err(|e| io_error(&e))?;
        prompts.flush().map_err(|e| io_error(&e))?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(|e| io_error(&e))? == 0 {
            return Ok(default);
        }

        let answer = line.trim();
        let candidate = if answer.is_empty() {
            Ok(default)
        } else {
            parse_date(answer)
        };

        match (candidate, not_before) {
            (Ok(date), Some(earliest)) if date < earliest => {
                writeln!(
                    prompts,
                    "{label} must not be before {}.",
                    earliest.format(DATE_FORMAT)
                )
                .map_err(|e| io_error(&e))?;
            }
            (Ok(date), _) => return Ok(date),
            (Err(error), _) => {
                writeln!(prompts, "{error}").map_err(|e| io_error(&e))?;
            }
        }
    }
}
