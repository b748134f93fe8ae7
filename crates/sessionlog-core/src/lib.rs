pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalyticsConfig, DEFAULT_INACTIVITY_GAP_MINUTES};
pub use error::{AnalyticsError, MalformedField, SkippedLine, SkippedRecord};
pub use types::{LogRecord, Session};
