use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const LOG_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    level TEXT NOT NULL,
    target TEXT NOT NULL,
    message TEXT NOT NULL,
    fields TEXT,
    session_id TEXT
);
CREATE INDEX IF NOT EXISTS idx_logs_level ON logs(level);
CREATE INDEX IF NOT EXISTS idx_logs_session ON logs(session_id);
CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
";

/// SQLite sink for warn+ logs, kept apart from the conversation database.
pub struct SqliteLogSink {
    conn: Mutex<Connection>,
}

impl SqliteLogSink {
    pub fn new(db_path: &Path) -> Result<Self, rusqlite::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(LOG_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(LOG_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert(&self, entry: &PendingLog) {
        let conn = self.conn.lock();
        // A failing log write must never take the request down with it.
        let _ = conn.execute(
            "INSERT INTO logs (timestamp, level, target, message, fields, session_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                entry.timestamp,
                entry.level,
                entry.target,
                entry.message,
                entry.fields,
                entry.session_id,
            ],
        );
    }

    /// Delete records older than `days`. Returns the number removed; a
    /// window reaching before the representable range removes nothing.
    pub fn prune_older_than(&self, days: u32) -> Result<usize, rusqlite::Error> {
        let Some(cutoff) =
            Duration::try_days(i64::from(days)).and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(0);
        };
        let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.conn.lock();
        conn.execute("DELETE FROM logs WHERE timestamp < ?1", [cutoff])
    }
}

struct PendingLog {
    timestamp: String,
    level: String,
    target: String,
    message: String,
    fields: Option<String>,
    session_id: Option<String>,
}

/// tracing Layer that writes WARN and ERROR events to a `SqliteLogSink`.
pub struct SqliteLogLayer {
    sink: Arc<SqliteLogSink>,
}

impl SqliteLogLayer {
    pub fn new(sink: Arc<SqliteLogSink>) -> Self {
        Self { sink }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    session_id: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl FieldVisitor {
    fn put(&mut self, name: &str, value: serde_json::Value) {
        self.fields.insert(name.to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        match field.name() {
            "message" => self.message = Some(rendered),
            "session_id" => self.session_id = Some(rendered.trim_matches('"').to_string()),
            name => self.put(name, serde_json::Value::String(rendered)),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "session_id" => self.session_id = Some(value.to_string()),
            name => self.put(name, serde_json::Value::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field.name(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field.name(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.put(field.name(), serde_json::Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field.name(), value.into());
    }
}

/// Stored on spans so child events inherit the span's session id.
struct SpanSession(String);

impl<S> Layer<S> for SqliteLogLayer
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if let (Some(session_id), Some(span)) = (visitor.session_id, ctx.span(id)) {
            span.extensions_mut().insert(SpanSession(session_id));
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > tracing::Level::WARN {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        if visitor.session_id.is_none() {
            if let Some(scope) = ctx.event_scope(event) {
                visitor.session_id = scope.from_root().fold(None, |found, span| {
                    let extensions = span.extensions();
                    extensions
                        .get::<SpanSession>()
                        .map(|s| s.0.clone())
                        .or(found)
                });
            }
        }

        let fields = if visitor.fields.is_empty() {
            None
        } else {
            serde_json::to_string(&visitor.fields).ok()
        };

        self.sink.insert(&PendingLog {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: level.to_string().to_uppercase(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields,
            session_id: visitor.session_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn pending(level: &str, target: &str, message: &str, session_id: Option<&str>) -> PendingLog {
        PendingLog {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: level.into(),
            target: target.into(),
            message: message.into(),
            fields: None,
            session_id: session_id.map(str::to_string),
        }
    }

    /// (level, message, session_id, fields) of every stored record, oldest first.
    fn stored(sink: &SqliteLogSink) -> Vec<(String, String, Option<String>, Option<String>)> {
        let conn = sink.conn.lock();
        let mut stmt = conn
            .prepare("SELECT level, message, session_id, fields FROM logs ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
            .unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn file_sink_creates_database() {
        let dir = std::env::temp_dir().join(format!("solace-test-logs-{}", uuid::Uuid::now_v7()));
        let path = dir.join("logs.db");
        let sink = SqliteLogSink::new(&path).unwrap();
        sink.insert(&pending("WARN", "solace_llm", "slow upstream", None));
        assert_eq!(stored(&sink).len(), 1);
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn prune_removes_only_old_records() {
        let sink = SqliteLogSink::in_memory().unwrap();
        let mut old = pending("WARN", "test", "old", None);
        old.timestamp = "2020-01-01T00:00:00.000000Z".into();
        sink.insert(&old);
        sink.insert(&pending("WARN", "test", "fresh", None));

        assert_eq!(sink.prune_older_than(30).unwrap(), 1);
        let left = stored(&sink);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].1, "fresh");
    }

    #[test]
    fn prune_with_huge_window_keeps_everything() {
        let sink = SqliteLogSink::in_memory().unwrap();
        sink.insert(&pending("WARN", "test", "old", None));
        assert_eq!(sink.prune_older_than(u32::MAX).unwrap(), 0);
        assert_eq!(stored(&sink).len(), 1);
    }

    #[test]
    fn layer_persists_warn_and_inherits_span_session() {
        let sink = Arc::new(SqliteLogSink::in_memory().unwrap());
        let subscriber =
            tracing_subscriber::registry().with(SqliteLogLayer::new(Arc::clone(&sink)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("not persisted");
            let span = tracing::info_span!("turn", session_id = "sess_xyz");
            let _guard = span.enter();
            tracing::warn!(error_kind = "timeout", "generation failed");
        });

        let records = stored(&sink);
        assert_eq!(records.len(), 1);
        let (level, message, session_id, fields) = &records[0];
        assert_eq!(level, "WARN");
        assert_eq!(message, "generation failed");
        assert_eq!(session_id.as_deref(), Some("sess_xyz"));
        assert!(fields.as_deref().unwrap().contains("timeout"));
    }
}
