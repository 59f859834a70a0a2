//! Inclusive calendar date range bounding the analysis window.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::github::error::AnalysisError;

/// Days covered by the default window ending today.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Input format for dates on the command line and in prompts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive `[from, to]` range of calendar dates with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting inverted bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidDateRange`] when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AnalysisError> {
        if from > to {
            return Err(AnalysisError::InvalidDateRange {
                from: from.format(DATE_FORMAT).to_string(),
                to: to.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// The default window: the thirty days up to and including `today`.
    #[must_use]
    pub fn ending_on(today: NaiveDate) -> Self {
        Self {
            from: default_from(today),
            to: today,
        }
    }

    /// Resolves optional textual bounds, falling back to defaults.
    ///
    /// Unparseable bounds are replaced by their default and an inverted range
    /// is replaced by the default window. Each substitution is logged.
    #[must_use]
    pub fn resolve_or_default(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Self {
        let from_date = resolve_bound("from", from, default_from(today));
        let to_date = resolve_bound("to", to, today);

        Self::new(from_date, to_date).unwrap_or_else(|error| {
            tracing::warn!("{error}; using the default {DEFAULT_WINDOW_DAYS}-day window");
            Self::ending_on(today)
        })
    }

    /// First day of the window.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the window.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} to {}",
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        )
    }
}

/// Parses a `yyyy-mm-dd` date, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidDate`] when the input is not a valid date.
pub fn parse_date(input: &str) -> Result<NaiveDate, AnalysisError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| AnalysisError::InvalidDate {
        input: trimmed.to_owned(),
    })
}

/// Start of the default window ending on `today`.
#[must_use]
pub fn default_from(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

fn resolve_bound(label: &str, input: Option<&str>, default: NaiveDate) -> NaiveDate {
    let Some(raw) = input.filter(|value| !value.trim().is_empty()) else {
        return default;
    };

    parse_date(raw).unwrap_or_else(|error| {
        tracing::warn!(
            "{error}; using {label} = {}",
            default.format(DATE_FORMAT)
        );
        default
    })
}
