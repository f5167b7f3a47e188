//! CSP violation report normalization.
//!
//! Browsers send three shapes: the legacy `{"csp-report": {...}}` object, a
//! Reporting API batch `[{"type": ..., "body": {...}}]`, or a bare record.
//! [`ReportPayload`] classifies the shape once; every record is then reduced to
//! a [`ViolationEntry`] whose URI fields carry an origin or a category token,
//! never a full URL.

use crate::constants::{DEDUPE_SEPARATOR, INVALID_URI_TOKEN, UNKNOWN_TOKEN};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

type Record = Map<String, Value>;

const DIRECTIVE_KEYS: &[&str] = &[
    "effective-directive",
    "effectiveDirective",
    "violated-directive",
    "violatedDirective",
];
const BLOCKED_KEYS: &[&str] = &["blocked-uri", "blockedURL", "blockedUri"];
const DOCUMENT_KEYS: &[&str] = &["document-uri", "documentURL", "documentUri"];
const SOURCE_KEYS: &[&str] = &["source-file", "sourceFile"];
const STATUS_KEYS: &[&str] = &["status-code", "statusCode"];

const KEYWORD_TOKENS: &[&str] = &["inline", "eval", "self", "none"];
const COLLAPSED_SCHEMES: &[&str] = &["data:", "blob:", "about:"];

#[derive(Debug, Clone, Copy)]
pub enum ReportPayload<'a> {
    Legacy(&'a Record),
    Batch(&'a [Value]),
    Bare(&'a Record),
    Unsupported,
}

impl<'a> ReportPayload<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Batch(items),
            Value::Object(map) if map.get("csp-report").is_some_and(Value::is_object) => {
                Self::Legacy(map)
            }
            Value::Object(map) => Self::Bare(map),
            _ => Self::Unsupported,
        }
    }

    /// Innermost violation records, in payload order.
    pub fn records(&self) -> Vec<&'a Record> {
        match *self {
            Self::Legacy(map) | Self::Bare(map) => vec![innermost(map)],
            Self::Batch(items) => items
                .iter()
                .filter_map(Value::as_object)
                .map(innermost)
                .collect(),
            Self::Unsupported => Vec::new(),
        }
    }

    pub fn entries(&self) -> Vec<ViolationEntry> {
        self.records()
            .into_iter()
            .map(ViolationEntry::from_record)
            .collect()
    }
}

fn innermost(record: &Record) -> &Record {
    record
        .get("body")
        .and_then(Value::as_object)
        .or_else(|| record.get("csp-report").and_then(Value::as_object))
        .unwrap_or(record)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationEntry {
    pub directive: String,
    pub blocked_origin: String,
    pub document_origin: String,
    pub source_origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ViolationEntry {
    pub fn from_record(record: &Record) -> Self {
        let directive = first_string(record, DIRECTIVE_KEYS)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNKNOWN_TOKEN)
            .to_owned();

        let status_code = STATUS_KEYS
            .iter()
            .find_map(|key| record.get(*key).and_then(Value::as_u64))
            .and_then(|code| u16::try_from(code).ok());

        Self {
            directive,
            blocked_origin: normalize_origin(first_string(record, BLOCKED_KEYS)),
            document_origin: normalize_origin(first_string(record, DOCUMENT_KEYS)),
            source_origin: normalize_origin(first_string(record, SOURCE_KEYS)),
            status_code,
        }
    }

    /// Aggregation key for downstream log deduplication.
    pub fn dedupe_key(&self) -> String {
        let mut key = String::with_capacity(
            self.directive.len() + self.blocked_origin.len() + self.document_origin.len() + 2,
        );
        key.push_str(&self.directive);
        key.push(DEDUPE_SEPARATOR);
        key.push_str(&self.blocked_origin);
        key.push(DEDUPE_SEPARATOR);
        key.push_str(&self.document_origin);
        key
    }
}

fn first_string<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

/// Collapses a reported URI to the least identifying useful signal.
pub fn normalize_origin(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return UNKNOWN_TOKEN.to_owned();
    };

    let lowered = raw.to_ascii_lowercase();
    let keyword = lowered.trim_matches('\'');
    if KEYWORD_TOKENS.contains(&keyword) {
        return keyword.to_owned();
    }

    if let Some(scheme) = COLLAPSED_SCHEMES.iter().find(|s| lowered.starts_with(**s)) {
        return (*scheme).to_owned();
    }

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            url.origin().ascii_serialization()
        }
        Ok(url) => format!("{}:", url.scheme()),
        Err(_) => INVALID_URI_TOKEN.to_owned(),
    }
}

/// Parses a report body and returns one entry per violation record.
pub fn parse_report_body(body: &[u8]) -> Result<Vec<ViolationEntry>, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(ReportPayload::classify(&value).entries())
}
