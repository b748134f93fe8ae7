use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed record at input index {index}: {reason}")]
    MalformedRecord { index: usize, reason: MalformedField },

    #[error("Malformed log line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Which engine-critical field a record is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedField {
    MissingTimestamp,
    MissingClientIp,
    MissingRequestUrl,
}

impl fmt::Display for MalformedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedField::MissingTimestamp => write!(f, "missing timestamp"),
            MalformedField::MissingClientIp => write!(f, "missing client_ip"),
            MalformedField::MissingRequestUrl => write!(f, "missing request_url"),
        }
    }
}

/// A record excluded from grouping, identified by its 0-based position in
/// the input batch. The batch continues for all valid records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: MalformedField,
}

impl From<SkippedRecord> for AnalyticsError {
    /// Escalate a per-record skip into a hard error, for callers that
    /// treat any malformed input as fatal.
    fn from(skip: SkippedRecord) -> Self {
        AnalyticsError::MalformedRecord {
            index: skip.index,
            reason: skip.reason,
        }
    }
}

/// A raw log line the parser could not turn into a record (1-based line
/// number within the source file or stream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: String,
}
