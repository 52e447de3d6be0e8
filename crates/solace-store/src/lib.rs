pub mod database;
pub mod error;
pub mod messages;
pub mod moods;
pub mod retention;
pub mod row_helpers;
pub mod schema;
pub mod sessions;

pub use database::{run_blocking, Database};
pub use error::StoreError;

use chrono::{DateTime, SecondsFormat, Utc};

/// Canonical timestamp encoding for every stored row.
///
/// Fixed microsecond precision keeps lexical order equal to time order, which
/// the `ORDER BY timestamp` queries rely on.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
