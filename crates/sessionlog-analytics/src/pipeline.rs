//! End-to-end batch pipeline: grouping → sessionization → aggregation.
//!
//! Each client's partition is processed independently with its own local
//! accumulator and merged into the flat session list at the end; there is
//! no shared mutable state across clients.

use crate::engagement::{self, EngagementReport};
use crate::grouping::ClientEventIndex;
use crate::sessionize;
use serde::{Deserialize, Serialize};
use sessionlog_core::config::{AnalyticsConfig, DEFAULT_INACTIVITY_GAP_MINUTES};
use sessionlog_core::error::SkippedRecord;
use sessionlog_core::types::{LogRecord, Session};

/// Tunable knobs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Inactivity gap in minutes; strictly-greater-than comparison.
    pub inactivity_gap_minutes: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            inactivity_gap_minutes: DEFAULT_INACTIVITY_GAP_MINUTES,
        }
    }
}

impl From<&AnalyticsConfig> for PipelineOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            inactivity_gap_minutes: config.session.inactivity_gap_minutes,
        }
    }
}

/// Everything one batch run produces: the sessions themselves, the
/// aggregated engagement report, and the records that had to be excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsOutcome {
    /// All sessions, ordered by `(client_ip, session_id)`.
    pub sessions: Vec<Session>,
    pub report: EngagementReport,
    /// Input records excluded from grouping, by input index.
    pub skipped: Vec<SkippedRecord>,
}

/// Run the full pipeline over one batch of records.
pub fn run(records: &[LogRecord], options: &PipelineOptions) -> AnalyticsOutcome {
    if records.is_empty() {
        tracing::warn!("no input records; producing empty analytics");
    }

    let (index, skipped) = ClientEventIndex::build(records);

    // Clients iterate in lexicographic order and ids ascend within each
    // client, so the merged list is already (client_ip, session_id)-ordered.
    let mut sessions = Vec::new();
    for (client_ip, events) in index.iter() {
        let ids = sessionize::assign_session_ids(events, options.inactivity_gap_minutes);
        sessions.extend(sessionize::summarize_sessions(client_ip, events, &ids));
    }

    let report = engagement::aggregate(&sessions);
    tracing::info!(
        clients = index.client_count(),
        sessions = sessions.len(),
        skipped = skipped.len(),
        "analytics pass complete"
    );

    AnalyticsOutcome {
        sessions,
        report,
        skipped,
    }
}

/// All sessions of one client in session-id order — the per-client
/// drill-down behind the CLI `client` subcommand.
pub fn client_sessions<'a>(outcome: &'a AnalyticsOutcome, client_ip: &str) -> Vec<&'a Session> {
    outcome
        .sessions
        .iter()
        .filter(|s| s.client_ip == client_ip)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(minutes: f64, ip: &str, url: &str) -> LogRecord {
        LogRecord {
            timestamp: Some(
                Utc.timestamp_millis_opt(1_437_555_600_000 + (minutes * 60_000.0) as i64)
                    .unwrap(),
            ),
            client_ip: ip.into(),
            request_url: url.into(),
            ..LogRecord::default()
        }
    }

    #[test]
    fn test_two_session_client_end_to_end() {
        // Client A at t = 0, 5, 10, 30, 35 minutes: two sessions of 10 and
        // 5 minutes, average 7.5.
        let records = vec![
            record(0.0, "A", "/a"),
            record(5.0, "A", "/b"),
            record(10.0, "A", "/c"),
            record(30.0, "A", "/d"),
            record(35.0, "A", "/e"),
        ];

        let outcome = run(&records, &PipelineOptions::default());
        assert_eq!(outcome.sessions.len(), 2);
        assert_eq!(outcome.sessions[0].duration_minutes, 10.0);
        assert_eq!(outcome.sessions[1].duration_minutes, 5.0);
        assert_eq!(outcome.report.average_session_duration_minutes, 7.5);
        assert_eq!(outcome.report.session_counts["A"], 2);
    }

    #[test]
    fn test_url_popularity_counts_sessions_not_visits() {
        // Three same-session events, two of them for /x: /x contributes 1.
        let records = vec![
            record(0.0, "A", "/x"),
            record(5.0, "A", "/x"),
            record(6.0, "A", "/y"),
        ];

        let outcome = run(&records, &PipelineOptions::default());
        assert_eq!(outcome.sessions.len(), 1);
        assert_eq!(outcome.report.url_visits["/x"], 1);
        assert_eq!(outcome.report.url_visits["/y"], 1);
    }

    #[test]
    fn test_unordered_input_is_sorted_per_client() {
        let records = vec![
            record(35.0, "A", "/e"),
            record(0.0, "A", "/a"),
            record(30.0, "A", "/d"),
            record(5.0, "A", "/b"),
            record(10.0, "A", "/c"),
        ];

        let outcome = run(&records, &PipelineOptions::default());
        assert_eq!(outcome.sessions.len(), 2);
        assert_eq!(outcome.sessions[0].duration_minutes, 10.0);
    }

    #[test]
    fn test_sessions_ordered_by_client_then_id() {
        let records = vec![
            record(0.0, "B", "/a"),
            record(60.0, "B", "/b"),
            record(0.0, "A", "/a"),
        ];

        let outcome = run(&records, &PipelineOptions::default());
        let keys: Vec<(&str, u64)> = outcome
            .sessions
            .iter()
            .map(|s| (s.client_ip.as_str(), s.session_id))
            .collect();
        assert_eq!(keys, [("A", 0), ("B", 0), ("B", 1)]);
    }

    #[test]
    fn test_malformed_records_surface_in_outcome() {
        let mut bad = record(0.0, "A", "/a");
        bad.timestamp = None;
        let records = vec![record(0.0, "A", "/a"), bad];

        let outcome = run(&records, &PipelineOptions::default());
        assert_eq!(outcome.sessions.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 1);
    }

    #[test]
    fn test_empty_input_yields_zero_valued_outputs() {
        let outcome = run(&[], &PipelineOptions::default());
        assert!(outcome.sessions.is_empty());
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.report.total_sessions, 0);
        assert_eq!(outcome.report.average_session_duration_minutes, 0.0);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let records = vec![
            record(0.0, "B", "/x"),
            record(20.0, "A", "/y"),
            record(0.0, "A", "/x"),
            record(16.5, "B", "/z"),
        ];

        let first = run(&records, &PipelineOptions::default());
        let second = run(&records, &PipelineOptions::default());
        assert_eq!(first.sessions, second.sessions);
        assert_eq!(first.report, second.report);
        assert_eq!(first.skipped, second.skipped);
    }

    #[test]
    fn test_gap_override_via_options() {
        let records = vec![record(0.0, "A", "/a"), record(10.0, "A", "/b")];

        let tight = run(
            &records,
            &PipelineOptions {
                inactivity_gap_minutes: 5.0,
            },
        );
        assert_eq!(tight.sessions.len(), 2);

        let default = run(&records, &PipelineOptions::default());
        assert_eq!(default.sessions.len(), 1);
    }

    #[test]
    fn test_client_sessions_drill_down() {
        let records = vec![
            record(0.0, "A", "/a"),
            record(30.0, "A", "/b"),
            record(0.0, "B", "/c"),
        ];

        let outcome = run(&records, &PipelineOptions::default());
        let for_a = client_sessions(&outcome, "A");
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].session_id, 0);
        assert_eq!(for_a[1].session_id, 1);
        assert!(client_sessions(&outcome, "C").is_empty());
    }

    #[test]
    fn test_outcome_serializes_to_json() {
        let records = vec![record(0.0, "A", "/a")];
        let outcome = run(&records, &PipelineOptions::default());

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: AnalyticsOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sessions, outcome.sessions);
        assert_eq!(parsed.report, outcome.report);
    }
}
