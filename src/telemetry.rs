//! Application telemetry events and sinks.
//!
//! A run can legitimately pause for many minutes while GitHub quota resets, so
//! suspensions and team outcomes are emitted as structured events in addition
//! to log lines. Events are written locally and never transmitted anywhere.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// The rate governor suspended the run until the quota window resets.
    QuotaSuspended {
        /// Quota bucket that ran low (`core` or `search`).
        resource: String,
        /// Calls left in the bucket when the suspension started.
        remaining: u32,
        /// Unix timestamp of the reset.
        reset_at: u64,
        /// Planned suspension including the safety margin, in seconds.
        wait_seconds: u64,
    },
    /// A team finished analysis.
    TeamFinished {
        /// Team name.
        team: String,
        /// Final state (`completed` or `failed`).
        status: String,
        /// Distinct pull requests counted for the team.
        pull_requests: usize,
        /// Recovered per-pair or per-PR failures.
        recovered_failures: usize,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingSink;
    use super::{TelemetryEvent, TelemetrySink};

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingSink::default();
        sink.record(TelemetryEvent::TeamFinished {
            team: "platform".to_owned(),
            status: "completed".to_owned(),
            pull_requests: 4,
            recovered_failures: 0,
        });

        assert_eq!(
            sink.take(),
            vec![TelemetryEvent::TeamFinished {
                team: "platform".to_owned(),
                status: "completed".to_owned(),
                pull_requests: 4,
                recovered_failures: 0,
            }]
        );
    }

    #[test]
    fn events_serialise_with_snake_case_tag() {
        let event = TelemetryEvent::QuotaSuspended {
            resource: "search".to_owned(),
            remaining: 5,
            reset_at: 1_700_000_000,
            wait_seconds: 125,
        };

        let serialised = serde_json::to_string(&event).expect("event should serialise");
        assert!(
            serialised.contains(r#""type":"quota_suspended""#),
            "unexpected JSON: {serialised}"
        );
        assert!(serialised.contains(r#""wait_seconds":125"#));
    }
}
