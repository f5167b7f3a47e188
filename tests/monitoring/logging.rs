use actix_site_guard::{EventLogger, EventRecord};
use log::Level;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::sync::Arc;

fn recording_logger() -> (EventLogger, Arc<Mutex<Vec<EventRecord>>>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    let logger = EventLogger::with_sink(move |record| sink.lock().push(record.clone()));
    (logger, records)
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refused"))
    }
}

fn parsed(record: &EventRecord) -> Value {
    serde_json::from_str(&record.payload).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_fields_are_flattened() {
        let (logger, records) = recording_logger();
        logger.warn("csp_violation_reported", &json!({"directive": "img-src", "count": 2}));

        let records = records.lock();
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].event, "csp_violation_reported");
        assert_eq!(
            parsed(&records[0]),
            json!({"event": "csp_violation_reported", "directive": "img-src", "count": 2})
        );
    }

    #[test]
    fn test_scalar_fields_are_nested() {
        let (logger, records) = recording_logger();
        logger.info("custom_event", &"hello");
        logger.info("empty_event", &());

        let records = records.lock();
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(parsed(&records[0]), json!({"event": "custom_event", "payload": "hello"}));
        assert_eq!(parsed(&records[1]), json!({"event": "empty_event"}));
    }

    #[test]
    fn test_unserializable_fields_fall_back() {
        let (logger, records) = recording_logger();
        logger.warn("csp_mode_invalid", &Unserializable);

        let records = records.lock();
        assert_eq!(
            parsed(&records[0]),
            json!({"event": "csp_mode_invalid", "payload": "unserializable"})
        );
    }

    #[test]
    fn test_default_logger_goes_to_log_facade() {
        let logger = EventLogger::new();
        logger.warn("csp_mode_invalid", &json!({"value": "x"}));

        assert!(format!("{logger:?}").contains("custom_sink: false"));
    }
}
