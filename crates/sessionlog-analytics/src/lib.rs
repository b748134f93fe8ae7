//! Sessionization and engagement aggregation for access-log events.
//!
//! Converts an unordered batch of timestamped per-client events into
//! bounded sessions (inactivity-gap rule) and summary statistics: session
//! counts, average session duration, the most-engaged ranking, and per-URL
//! distinct-session visit counts.

pub mod engagement;
pub mod grouping;
pub mod pipeline;
pub mod reports;
pub mod sessionize;

pub use engagement::{ClientEngagement, EngagementReport};
pub use grouping::{ClientEvent, ClientEventIndex};
pub use pipeline::{client_sessions, run, AnalyticsOutcome, PipelineOptions};
pub use reports::ReportGenerator;
