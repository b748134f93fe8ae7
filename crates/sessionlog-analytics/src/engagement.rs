//! Engagement and content-popularity aggregation across all sessions.
//!
//! Four pure reductions over the full session collection: per-client
//! session counts, global average session duration, the most-engaged
//! ranking, and per-URL distinct-session visit counts. Computed in a
//! single pass; the grouping semantics of each output are independent.

use serde::{Deserialize, Serialize};
use sessionlog_core::types::Session;
use std::collections::BTreeMap;

/// One entry in the most-engaged ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEngagement {
    pub client_ip: String,
    pub duration_minutes: f64,
}

/// The analytic outputs of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementReport {
    /// Sessions per client.
    pub session_counts: BTreeMap<String, u64>,
    /// Arithmetic mean of `duration_minutes` over all sessions of all
    /// clients (not a per-client average). 0 when there are no sessions.
    pub average_session_duration_minutes: f64,
    /// Distinct `(client_ip, duration_minutes)` pairs, longest first; ties
    /// broken by client ascending.
    pub most_engaged: Vec<ClientEngagement>,
    /// Per URL, the number of distinct `(client_ip, session_id)` pairs that
    /// visited it. Repeat visits within one session count once.
    pub url_visits: BTreeMap<String, u64>,
    pub total_sessions: u64,
}

/// Aggregate engagement metrics over all sessions.
pub fn aggregate(sessions: &[Session]) -> EngagementReport {
    let mut session_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut url_visits: BTreeMap<String, u64> = BTreeMap::new();
    let mut duration_sum = 0.0;
    let mut pairs: Vec<ClientEngagement> = Vec::with_capacity(sessions.len());

    for session in sessions {
        *session_counts.entry(session.client_ip.clone()).or_insert(0) += 1;
        duration_sum += session.duration_minutes;

        // urls_visited is already distinct within the session, so one
        // increment per member URL equals one distinct (client, session)
        // visit.
        for url in &session.urls_visited {
            *url_visits.entry(url.clone()).or_insert(0) += 1;
        }

        pairs.push(ClientEngagement {
            client_ip: session.client_ip.clone(),
            duration_minutes: session.duration_minutes,
        });
    }

    let average_session_duration_minutes = if sessions.is_empty() {
        0.0
    } else {
        duration_sum / sessions.len() as f64
    };

    pairs.sort_by(|a, b| {
        b.duration_minutes
            .total_cmp(&a.duration_minutes)
            .then_with(|| a.client_ip.cmp(&b.client_ip))
    });
    pairs.dedup_by(|a, b| {
        a.client_ip == b.client_ip && a.duration_minutes.total_cmp(&b.duration_minutes).is_eq()
    });

    EngagementReport {
        session_counts,
        average_session_duration_minutes,
        most_engaged: pairs,
        url_visits,
        total_sessions: sessions.len() as u64,
    }
}
