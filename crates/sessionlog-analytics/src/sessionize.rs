//! Inactivity-gap sessionization and per-session summarization.
//!
//! `assign_session_ids` is a strict left-to-right scan with O(1) state over
//! one client's time-ordered events; `summarize_sessions` reduces each
//! session's members into one `Session` record. Both operate on a single
//! client — cross-client work happens in the pipeline.

use crate::grouping::ClientEvent;
use chrono::{DateTime, Utc};
use sessionlog_core::types::Session;
use std::collections::BTreeSet;

/// Assign a session id to every event of one client's time-ordered
/// sequence. A gap strictly greater than `gap_minutes` since the previous
/// event opens a new session; a gap of exactly `gap_minutes` does not. The
/// first event always lands in session 0.
pub fn assign_session_ids(events: &[ClientEvent], gap_minutes: f64) -> Vec<u64> {
    let mut ids = Vec::with_capacity(events.len());
    let mut prev_time: Option<DateTime<Utc>> = None;
    let mut session_id = 0u64;

    for event in events {
        if let Some(prev) = prev_time {
            if minutes_between(prev, event.timestamp) > gap_minutes {
                session_id += 1;
            }
        }
        ids.push(session_id);
        prev_time = Some(event.timestamp);
    }

    ids
}

/// Reduce one client's sessionized events into `Session` records, one per
/// session id. The reduction itself is order-independent (min/max
/// timestamps, distinct URL set); contiguous ids are guaranteed by the
/// ordered scan above.
pub fn summarize_sessions(
    client_ip: &str,
    events: &[ClientEvent],
    session_ids: &[u64],
) -> Vec<Session> {
    debug_assert_eq!(events.len(), session_ids.len());
    let mut sessions: Vec<Session> = Vec::new();

    for (event, &session_id) in events.iter().zip(session_ids) {
        match sessions.last_mut() {
            Some(current) if current.session_id == session_id => {
                current.start_time = current.start_time.min(event.timestamp);
                current.end_time = current.end_time.max(event.timestamp);
                current.urls_visited.insert(event.request_url.clone());
            }
            _ => sessions.push(Session {
                client_ip: client_ip.to_string(),
                session_id,
                start_time: event.timestamp,
                end_time: event.timestamp,
                duration_minutes: 0.0,
                urls_visited: BTreeSet::from([event.request_url.clone()]),
            }),
        }
    }

    for session in &mut sessions {
        session.duration_minutes = minutes_between(session.start_time, session.end_time);
    }

    sessions
}

/// Minutes from `earlier` to `later`, with sub-second precision.
fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
