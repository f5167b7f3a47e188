//! Structured security events.
//!
//! Every event is rendered as a single JSON object `{"event": "...", ...fields}`
//! and handed either to the `log` facade (target `site_guard::event`) or to an
//! injected sink. Rendering never fails: unserializable fields degrade to a
//! fixed fallback payload.

use log::Level;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub const EVENT_TARGET: &str = "site_guard::event";

pub const EVENT_CSP_VIOLATION: &str = "csp_violation_reported";
pub const EVENT_PAYLOAD_TOO_LARGE: &str = "csp_report_payload_too_large";
pub const EVENT_PAYLOAD_INVALID_JSON: &str = "csp_report_payload_invalid_json";
pub const EVENT_CSP_MODE_INVALID: &str = "csp_mode_invalid";
pub const EVENT_LOCALHOST_OVERRIDE: &str = "site_url_localhost_override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub level: Level,
    pub event: &'static str,
    pub payload: String,
}

type EventSink = Arc<dyn Fn(&EventRecord) + Send + Sync + 'static>;

#[derive(Clone, Default)]
pub struct EventLogger {
    sink: Option<EventSink>,
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

impl EventLogger {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes events to `sink` instead of the `log` facade.
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    #[inline]
    pub fn warn<T: Serialize + ?Sized>(&self, event: &'static str, fields: &T) {
        self.emit(Level::Warn, event, fields);
    }

    #[inline]
    pub fn info<T: Serialize + ?Sized>(&self, event: &'static str, fields: &T) {
        self.emit(Level::Info, event, fields);
    }

    pub fn emit<T: Serialize + ?Sized>(&self, level: Level, event: &'static str, fields: &T) {
        let record = EventRecord {
            level,
            event,
            payload: render_payload(event, fields),
        };

        match &self.sink {
            Some(sink) => sink(&record),
            None => log::log!(target: EVENT_TARGET, level, "{}", record.payload),
        }
    }
}

fn render_payload<T: Serialize + ?Sized>(event: &str, fields: &T) -> String {
    let rendered = serde_json::to_value(fields).and_then(|value| {
        let mut object = Map::new();
        object.insert("event".to_owned(), Value::String(event.to_owned()));
        match value {
            Value::Object(map) => object.extend(map),
            Value::Null => {}
            other => {
                object.insert("payload".to_owned(), other);
            }
        }
        serde_json::to_string(&Value::Object(object))
    });

    rendered.unwrap_or_else(|_| fallback_payload(event))
}

fn fallback_payload(event: &str) -> String {
    let event = Value::String(event.to_owned());
    format!(r#"{{"event":{},"payload":"unserializable"}}"#, event)
}
