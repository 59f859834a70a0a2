//! Support modules for the team analysis BDD tests.

#[path = "../support/runtime.rs"]
pub(crate) mod runtime;
pub(crate) mod state;

pub(crate) use state::{API_PREFIX, AnalysisState, ensure_runtime_and_server, mount, run_analysis};
