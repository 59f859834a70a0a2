//! prtally library crate: per-team pull request marker reports.
//!
//! For every configured team the library enumerates each member's pull
//! requests in the team's repositories through GitHub search, reads each pull
//! request's changed files, and counts added lines carrying a test annotation
//! or an assistant-attribution marker. Every quota-consuming call is paced by
//! a single rate governor, and failures are contained per pull request,
//! member/repository pair or team so that one bad unit never ends the run.

pub mod analysis;
pub mod config;
pub mod github;
pub mod telemetry;

pub use analysis::{
    DiffClassifier, GovernorPolicy, MarkerCounts, RateGovernor, RateLimitError,
    TeamAnalysisOrchestrator, TeamReport, TeamStatus, UserSummary,
};
pub use config::{DateRange, PrTallyConfig, TeamDefinition, TeamsConfig};
pub use github::{AnalysisError, OctocrabGateway, PersonalAccessToken, PullRequestGateway};
pub use telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetryEvent, TelemetrySink};
