use actix_site_guard::{
    CspMode, EventLogger, EventRecord, SiteConfigBuilder, SiteOrigin, SiteState,
};
use actix_web::HttpResponse;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

pub const SECRET: &str = "s3cret-preview";

#[derive(Clone, Default)]
pub struct Recorder {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl Recorder {
    pub fn logger(&self) -> EventLogger {
        let records = self.records.clone();
        EventLogger::with_sink(move |record| records.lock().push(record.clone()))
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.records.lock().iter().map(|r| r.event).collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.records.lock().iter().filter(|r| r.event == event).count()
    }

    pub fn payloads(&self, event: &str) -> Vec<Value> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.event == event)
            .map(|r| serde_json::from_str(&r.payload).unwrap())
            .collect()
    }
}

pub fn site_state(is_production: bool, mode: CspMode) -> (SiteState, Recorder) {
    let config = SiteConfigBuilder::new()
        .origin(SiteOrigin::parse("https://example.com").unwrap())
        .production(is_production)
        .csp_mode(mode)
        .preview_secret(SECRET)
        .build()
        .unwrap();

    let recorder = Recorder::default();
    let state = SiteState::new(config).with_logger(recorder.logger());
    (state, recorder)
}

pub async fn ok_handler() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
