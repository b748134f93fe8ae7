//! Per-client grouping and time ordering.
//!
//! Entry point of the engine: validates raw records, excludes malformed
//! ones with a per-record report, and hands each client its events in
//! ascending timestamp order.

use chrono::{DateTime, Utc};
use sessionlog_core::error::{MalformedField, SkippedRecord};
use sessionlog_core::types::LogRecord;
use std::collections::BTreeMap;

/// One validated event inside a client's group: just the fields the engine
/// consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvent {
    pub timestamp: DateTime<Utc>,
    pub request_url: String,
}

impl ClientEvent {
    fn from_record(record: &LogRecord) -> Result<Self, MalformedField> {
        let timestamp = record.timestamp.ok_or(MalformedField::MissingTimestamp)?;
        if record.client_ip.is_empty() {
            return Err(MalformedField::MissingClientIp);
        }
        if record.request_url.is_empty() {
            return Err(MalformedField::MissingRequestUrl);
        }
        Ok(Self {
            timestamp,
            request_url: record.request_url.clone(),
        })
    }
}

/// Per-client event groups, each ordered by ascending timestamp. Ties in
/// timestamp keep input order (stable sort), so results are deterministic.
#[derive(Debug, Default)]
pub struct ClientEventIndex {
    groups: BTreeMap<String, Vec<ClientEvent>>,
}

impl ClientEventIndex {
    /// Group a batch of records by client. Records missing an
    /// engine-critical field are excluded and reported; the batch continues
    /// for all valid records, each of which lands in exactly one group.
    pub fn build(records: &[LogRecord]) -> (Self, Vec<SkippedRecord>) {
        let mut groups: BTreeMap<String, Vec<ClientEvent>> = BTreeMap::new();
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match ClientEvent::from_record(record) {
                Ok(event) => {
                    groups.entry(record.client_ip.clone()).or_default().push(event);
                }
                Err(reason) => {
                    tracing::debug!(index, %reason, "excluding malformed record");
                    skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        for events in groups.values_mut() {
            events.sort_by_key(|e| e.timestamp);
        }

        (Self { groups }, skipped)
    }

    /// Iterate clients in deterministic (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ClientEvent])> {
        self.groups.iter().map(|(ip, events)| (ip.as_str(), events.as_slice()))
    }

    /// Events for one client, if present.
    pub fn get(&self, client_ip: &str) -> Option<&[ClientEvent]> {
        self.groups.get(client_ip).map(|events| events.as_slice())
    }

    /// Number of distinct clients.
    pub fn client_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(secs: i64, ip: &str, url: &str) -> LogRecord {
        LogRecord {
            timestamp: Some(Utc.timestamp_opt(1_437_555_600 + secs, 0).unwrap()),
            client_ip: ip.into(),
            request_url: url.into(),
            ..LogRecord::default()
        }
    }

    #[test]
    fn test_groups_by_client_ordered_by_time() {
        let records = vec![
            record(300, "10.0.0.2", "/b"),
            record(0, "10.0.0.1", "/a"),
            record(60, "10.0.0.2", "/a"),
            record(120, "10.0.0.1", "/b"),
        ];

        let (index, skipped) = ClientEventIndex::build(&records);
        assert!(skipped.is_empty());
        assert_eq!(index.client_count(), 2);

        let first = index.get("10.0.0.1").unwrap();
        assert_eq!(first.len(), 2);
        assert!(first[0].timestamp < first[1].timestamp);
        assert_eq!(first[0].request_url, "/a");

        let second = index.get("10.0.0.2").unwrap();
        assert_eq!(second[0].request_url, "/a");
        assert_eq!(second[1].request_url, "/b");
    }

    #[test]
    fn test_timestamp_ties_keep_input_order() {
        let records = vec![
            record(0, "10.0.0.1", "/first"),
            record(0, "10.0.0.1", "/second"),
            record(0, "10.0.0.1", "/third"),
        ];

        let (index, _) = ClientEventIndex::build(&records);
        let events = index.get("10.0.0.1").unwrap();
        let urls: Vec<&str> = events.iter().map(|e| e.request_url.as_str()).collect();
        assert_eq!(urls, ["/first", "/second", "/third"]);
    }

    #[test]
    fn test_malformed_records_reported_not_fatal() {
        let mut missing_ts = record(0, "10.0.0.1", "/a");
        missing_ts.timestamp = None;

        let records = vec![
            record(0, "10.0.0.1", "/a"),
            missing_ts,
            record(60, "", "/b"),
            record(120, "10.0.0.3", ""),
            record(180, "10.0.0.1", "/b"),
        ];

        let (index, skipped) = ClientEventIndex::build(&records);
        assert_eq!(index.client_count(), 1);
        assert_eq!(index.get("10.0.0.1").unwrap().len(), 2);

        assert_eq!(skipped.len(), 3);
        assert_eq!(skipped[0].index, 1);
        assert_eq!(skipped[0].reason, MalformedField::MissingTimestamp);
        assert_eq!(skipped[1].index, 2);
        assert_eq!(skipped[1].reason, MalformedField::MissingClientIp);
        assert_eq!(skipped[2].index, 3);
        assert_eq!(skipped[2].reason, MalformedField::MissingRequestUrl);
    }

    #[test]
    fn test_empty_input() {
        let (index, skipped) = ClientEventIndex::build(&[]);
        assert!(index.is_empty());
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_clients_iterate_in_lexicographic_order() {
        let records = vec![
            record(0, "10.0.0.9", "/a"),
            record(0, "10.0.0.1", "/a"),
            record(0, "10.0.0.5", "/a"),
        ];

        let (index, _) = ClientEventIndex::build(&records);
        let clients: Vec<&str> = index.iter().map(|(ip, _)| ip).collect();
        assert_eq!(clients, ["10.0.0.1", "10.0.0.5", "10.0.0.9"]);
    }
}
