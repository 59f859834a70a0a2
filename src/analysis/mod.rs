//! Rate-governed pull request traversal and diff classification.
//!
//! For each team the orchestrator walks every member/repository pair,
//! enumerates the member's pull requests through a paginated search, fetches
//! each pull request's changed files, counts marker lines in the added diff
//! lines, and folds the counts into per-user totals. Every quota-consuming
//! call passes through a single [`RateGovernor`].

pub mod aggregate;
pub mod classifier;
pub mod governor;
pub mod orchestrator;
pub mod traversal;

pub use aggregate::{Aggregator, MarkerCounts, UserSummary, accumulate};
pub use classifier::{DiffClassifier, ExtensionFilter, MarkerKind, MarkerPattern};
pub use governor::{Clock, GovernorPolicy, RateGovernor, RateLimitError, SystemClock};
pub use orchestrator::{
    AnalysisRequest, TeamAnalysisOrchestrator, TeamFailure, TeamReport, TeamStatus,
};
pub use traversal::PullRequestTraversal;
