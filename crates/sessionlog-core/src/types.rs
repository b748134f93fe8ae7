use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One parsed load-balancer access-log entry.
///
/// Field set follows the AWS Classic ELB access-log format. Every field is
/// lenient: the log format marks absent values with `-` / `-1` and
/// real-world logs contain truncated lines, so numeric fields are `Option`
/// and derived string fields may be empty. Validation happens at the
/// engine boundary, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Event time, normalized to UTC. `None` when absent or unparseable.
    pub timestamp: Option<DateTime<Utc>>,
    /// Load balancer name.
    pub elb: String,
    /// Client address, split from the combined `ip:port` field.
    pub client_ip: String,
    pub client_port: String,
    /// Backend address, split from the combined `ip:port` field.
    pub backend_ip: String,
    pub backend_port: String,
    pub request_processing_time: Option<f64>,
    pub backend_processing_time: Option<f64>,
    pub response_processing_time: Option<f64>,
    pub elb_status_code: Option<u16>,
    pub backend_status_code: Option<u16>,
    pub received_bytes: Option<u64>,
    pub sent_bytes: Option<u64>,
    /// Request line components, split from the quoted `"METHOD URL PROTOCOL"` field.
    pub request_method: String,
    pub request_url: String,
    pub request_protocol: String,
    pub user_agent: String,
    pub ssl_cipher: String,
    pub ssl_protocol: String,
}

/// A derived browsing session: one per `(client_ip, session_id)`.
///
/// Immutable once built. Session ids are 0-based, unique within a client,
/// and strictly increasing with time; consecutive sessions of the same
/// client are separated by more than the inactivity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub client_ip: String,
    pub session_id: u64,
    /// Earliest member-record timestamp.
    pub start_time: DateTime<Utc>,
    /// Latest member-record timestamp.
    pub end_time: DateTime<Utc>,
    /// `(end_time - start_time)` in minutes; 0 for single-event sessions.
    pub duration_minutes: f64,
    /// Distinct URLs touched during the session.
    pub urls_visited: BTreeSet<String>,
}

impl Session {
    /// Number of distinct URLs visited in this session.
    pub fn distinct_url_count(&self) -> usize {
        self.urls_visited.len()
    }
}
