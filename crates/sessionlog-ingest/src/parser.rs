//! AWS Classic ELB access-log line parsing.
//!
//! Turns raw space-delimited log lines (with quoted request and user-agent
//! fields) into typed `LogRecord`s. Parsing is deliberately lenient: the
//! format marks absent values with `-` / `-1` and real logs contain
//! truncated lines, so unparseable timestamps and numerics become `None`
//! and missing composite-field components become empty strings. Lines that
//! don't reach the request field are reported per-line and the batch
//! continues.

use chrono::{DateTime, Utc};
use regex::Regex;
use sessionlog_core::error::{AnalyticsError, Result, SkippedLine};
use sessionlog_core::types::LogRecord;
use std::io::BufRead;
use std::path::Path;

/// A double-quoted run or a bare token.
const TOKEN_PATTERN: &str = r#""([^"]*)"|(\S+)"#;

/// Columns through the quoted request field; user agent and the two SSL
/// columns are optional trailing fields.
const MIN_FIELDS: usize = 12;

/// Parser for ELB access-log lines.
pub struct LineParser {
    token_pattern: Regex,
}

impl LineParser {
    pub fn new() -> Self {
        let token_pattern = Regex::new(TOKEN_PATTERN).expect("static token pattern compiles");
        Self { token_pattern }
    }

    /// Parse a whole file, collecting malformed lines instead of aborting.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome> {
        let file = std::fs::File::open(path)?;
        self.parse_reader(std::io::BufReader::new(file))
    }

    /// Parse log lines from any buffered reader. Malformed lines are
    /// reported in the outcome; IO errors abort.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<ParseOutcome> {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            match self.parse_line(idx + 1, &line) {
                Ok(record) => records.push(record),
                Err(AnalyticsError::MalformedLine { line, reason }) => {
                    tracing::warn!(line, %reason, "skipping malformed log line");
                    skipped.push(SkippedLine { line, reason });
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            records = records.len(),
            skipped = skipped.len(),
            "parsed log batch"
        );
        Ok(ParseOutcome { records, skipped })
    }

    /// Parse a single log line. `line_no` is 1-based and only used for
    /// error reporting.
    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<LogRecord> {
        let tokens = self.tokenize(line);
        if tokens.is_empty() {
            return Err(AnalyticsError::MalformedLine {
                line: line_no,
                reason: "empty line".into(),
            });
        }
        if tokens.len() < MIN_FIELDS {
            return Err(AnalyticsError::MalformedLine {
                line: line_no,
                reason: format!(
                    "expected at least {} fields, found {}",
                    MIN_FIELDS,
                    tokens.len()
                ),
            });
        }

        let field = |i: usize| tokens.get(i).copied().unwrap_or("");
        let (client_ip, client_port) = split_ip_port(field(2));
        let (backend_ip, backend_port) = split_ip_port(field(3));
        let (request_method, request_url, request_protocol) = split_request(field(11));

        Ok(LogRecord {
            timestamp: parse_timestamp(field(0)),
            elb: field(1).to_string(),
            client_ip,
            client_port,
            backend_ip,
            backend_port,
            request_processing_time: field(4).parse().ok(),
            backend_processing_time: field(5).parse().ok(),
            response_processing_time: field(6).parse().ok(),
            elb_status_code: field(7).parse().ok(),
            backend_status_code: field(8).parse().ok(),
            received_bytes: field(9).parse().ok(),
            sent_bytes: field(10).parse().ok(),
            request_method,
            request_url,
            request_protocol,
            user_agent: field(12).to_string(),
            ssl_cipher: field(13).to_string(),
            ssl_protocol: field(14).to_string(),
        })
    }

    fn tokenize<'a>(&self, line: &'a str) -> Vec<&'a str> {
        self.token_pattern
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()))
            .collect()
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Records parsed from one batch, plus the lines that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<LogRecord>,
    pub skipped: Vec<SkippedLine>,
}

fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(token)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Split a combined `ip:port` field. A missing port yields an empty
/// string rather than an error.
fn split_ip_port(field: &str) -> (String, String) {
    match field.split_once(':') {
        Some((ip, port)) => (ip.to_string(), port.to_string()),
        None => (field.to_string(), String::new()),
    }
}

/// Split a combined `METHOD URL PROTOCOL` request field on whitespace.
/// Missing components yield empty strings.
fn split_request(field: &str) -> (String, String, String) {
    let mut parts = field.split_whitespace();
    (
        parts.next().unwrap_or_default().to_string(),
        parts.next().unwrap_or_default().to_string(),
        parts.next().unwrap_or_default().to_string(),
    )
}
