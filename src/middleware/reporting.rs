use crate::constants::{HEADER_X_FORWARDED_FOR, HEADER_X_REAL_IP, UNKNOWN_TOKEN};
use crate::logging::{EVENT_CSP_VIOLATION, EVENT_PAYLOAD_INVALID_JSON, EVENT_PAYLOAD_TOO_LARGE};
use crate::monitoring::report::{parse_report_body, ViolationEntry};
use crate::state::SiteState;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderMap, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
        Method,
    },
    Error, HttpResponse,
};
use bytes::{Bytes, BytesMut};
use futures::{
    future::{ready, LocalBoxFuture, Ready},
    FutureExt, Stream, StreamExt,
};
use serde::Serialize;
use std::{fmt, panic::AssertUnwindSafe, rc::Rc};
use thiserror::Error;

const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/csp-report", "application/reports+json"];

/// Why a report was dropped before reaching the log. Never surfaced to the
/// reporting browser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportRejection {
    #[error("rate limit exceeded for {0}")]
    RateLimited(String),

    #[error("unsupported content type")]
    UnsupportedContentType,

    #[error("declared content length {declared} exceeds {limit} bytes")]
    DeclaredTooLarge { declared: u64, limit: usize },

    #[error("body exceeded {limit} bytes after {bytes_read} bytes")]
    StreamTooLarge { bytes_read: usize, limit: usize },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("payload error: {0}")]
    Payload(String),
}

/// Intercepts `POST` to the report path and answers `204 No Content` with
/// `Cache-Control: no-store`, whatever happens while processing the report.
#[derive(Clone)]
pub struct CspReportingMiddleware {
    state: SiteState,
}

impl CspReportingMiddleware {
    #[inline]
    pub fn new(state: SiteState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn state(&self) -> &SiteState {
        &self.state
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspReportingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CspReportingMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspReportingMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct CspReportingMiddlewareService<S> {
    service: Rc<S>,
    state: SiteState,
}

impl<S, B> Service<ServiceRequest> for CspReportingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if *req.method() == Method::POST && req.path() == self.state.config().report_path() {
            let state = self.state.clone();

            Box::pin(async move {
                let (http_req, payload) = req.into_parts();
                ingest_report(&state, http_req.headers(), payload).await;

                let response = no_store_no_content().map_into_right_body();
                Ok(ServiceResponse::new(http_req, response))
            })
        } else {
            let fut = self.service.call(req);
            Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            })
        }
    }
}

fn no_store_no_content() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((CACHE_CONTROL, "no-store"))
        .finish()
}

/// Runs the report pipeline and absorbs every outcome, panics included.
/// Returns the number of violations logged.
pub async fn ingest_report<S, E>(state: &SiteState, headers: &HeaderMap, body: S) -> usize
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let outcome = AssertUnwindSafe(process_report(state, headers, body))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(logged)) => logged,
        Ok(Err(rejection)) => {
            log::debug!("CSP report dropped: {}", rejection);
            0
        }
        Err(_) => {
            log::error!("CSP report processing panicked");
            0
        }
    }
}

async fn process_report<S, E>(
    state: &SiteState,
    headers: &HeaderMap,
    body: S,
) -> Result<usize, ReportRejection>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let stats = state.stats();
    let logger = state.logger();
    let limit = state.config().max_report_size();
    stats.increment_report_request_count();

    let client = client_identifier(headers);
    if !state.rate_limiter().check(&client) {
        stats.increment_rate_limited_count();
        return Err(ReportRejection::RateLimited(client));
    }

    if !has_report_content_type(headers) {
        return Err(ReportRejection::UnsupportedContentType);
    }

    if let Some(declared) = declared_length(headers) {
        if declared > limit as u64 {
            stats.increment_rejected_report_count();
            logger.warn(
                EVENT_PAYLOAD_TOO_LARGE,
                &TooLargeEvent {
                    reason: "content-length",
                    content_length: Some(declared),
                    bytes_read: None,
                    limit,
                },
            );
            return Err(ReportRejection::DeclaredTooLarge { declared, limit });
        }
    }

    let body = match read_body_limited(body, limit).await {
        Ok(body) => body,
        Err(rejection) => {
            stats.increment_rejected_report_count();
            if let ReportRejection::StreamTooLarge { bytes_read, .. } = rejection {
                logger.warn(
                    EVENT_PAYLOAD_TOO_LARGE,
                    &TooLargeEvent {
                        reason: "stream",
                        content_length: None,
                        bytes_read: Some(bytes_read),
                        limit,
                    },
                );
            }
            return Err(rejection);
        }
    };

    let entries = match parse_report_body(&body) {
        Ok(entries) => entries,
        Err(e) => {
            stats.increment_rejected_report_count();
            logger.warn(
                EVENT_PAYLOAD_INVALID_JSON,
                &InvalidJsonEvent {
                    bytes: body.len(),
                    error: e.to_string(),
                },
            );
            return Err(ReportRejection::InvalidJson(e.to_string()));
        }
    };

    for entry in &entries {
        logger.warn(
            EVENT_CSP_VIOLATION,
            &ViolationEvent {
                entry,
                dedupe_key: entry.dedupe_key(),
            },
        );
    }
    stats.add_violations(entries.len());

    Ok(entries.len())
}

/// Reads `stream` into memory, stopping and dropping the stream as soon as the
/// running total exceeds `limit`.
pub async fn read_body_limited<S, E>(stream: S, limit: usize) -> Result<BytesMut, ReportRejection>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ReportRejection::Payload(e.to_string()))?;
        let bytes_read = body.len() + chunk.len();
        if bytes_read > limit {
            return Err(ReportRejection::StreamTooLarge { bytes_read, limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// First `X-Forwarded-For` hop, then `X-Real-Ip`, else `unknown`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = header_str(headers, HEADER_X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            header_str(headers, HEADER_X_REAL_IP)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or(UNKNOWN_TOKEN)
        .to_owned()
}

pub fn has_report_content_type(headers: &HeaderMap) -> bool {
    header_str(headers, CONTENT_TYPE.as_str()).is_some_and(|value| {
        let value = value.to_ascii_lowercase();
        ACCEPTED_CONTENT_TYPES.iter().any(|ct| value.contains(ct))
    })
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, CONTENT_LENGTH.as_str()).and_then(|v| v.trim().parse().ok())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TooLargeEvent {
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_read: Option<usize>,
    limit: usize,
}

#[derive(Serialize)]
struct InvalidJsonEvent {
    bytes: usize,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViolationEvent<'a> {
    #[serde(flatten)]
    entry: &'a ViolationEntry,
    dedupe_key: String,
}
