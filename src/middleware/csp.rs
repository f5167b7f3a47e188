use crate::constants::{
    HEADER_REPORTING_ENDPOINTS, HEADER_REPORT_TO, HEADER_SEC_FETCH_DEST, HEADER_SEC_FETCH_MODE,
    NONCE_REQUEST_HEADER, REPORT_GROUP, REPORT_TO_MAX_AGE_SECS,
};
use crate::core::policy::{CspMode, CspPolicyBuilder};
use crate::error::SiteError;
use crate::security::nonce::RequestNonce;
use crate::state::SiteState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
        Method,
    },
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use serde::Serialize;
use std::rc::Rc;

/// Attaches a per-request nonce and the CSP / reporting headers to production
/// document navigations.
#[derive(Clone)]
pub struct CspMiddleware {
    state: SiteState,
    policy: CspPolicyBuilder,
}

impl CspMiddleware {
    /// The policy's `report-uri` follows the configured report path.
    pub fn new(state: SiteState) -> Self {
        let policy = CspPolicyBuilder::new().report_uri(state.config().report_path().to_owned());
        Self { state, policy }
    }

    #[inline]
    pub fn with_policy(mut self, policy: CspPolicyBuilder) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn state(&self) -> &SiteState {
        &self.state
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CspMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
            policy: Rc::new(self.policy.clone()),
        }))
    }
}

pub struct CspMiddlewareService<S> {
    service: Rc<S>,
    state: SiteState,
    policy: Rc<CspPolicyBuilder>,
}

impl<S, B> Service<ServiceRequest> for CspMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        // Only the gate may set this header.
        req.headers_mut().remove(NONCE_REQUEST_HEADER);

        let is_production = self.state.config().is_production();
        if !should_apply(req.method(), req.headers(), is_production) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = self.service.clone();
        let state = self.state.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let nonce = state.nonces().generate()?;
            let endpoint = {
                let info = req.connection_info();
                report_endpoint_url(info.scheme(), info.host(), state.config().report_path())
            };
            let headers = PolicyHeaders::build(
                state.config().csp_mode(),
                &policy.build_header_value(&nonce, is_production),
                &endpoint,
            )?;

            req.headers_mut().insert(
                HeaderName::from_static(NONCE_REQUEST_HEADER),
                header_value(&nonce)?,
            );
            req.extensions_mut().insert(RequestNonce(nonce));
            state.stats().increment_gated_request_count();

            let mut res = service.call(req).await?;
            headers.apply(res.headers_mut());
            Ok(res)
        })
    }
}

/// Production navigational GET/HEAD requests only. `Accept` decides when
/// present; `Sec-Fetch-*` is consulted only when it is absent.
pub fn should_apply(method: &Method, headers: &HeaderMap, is_production: bool) -> bool {
    if !is_production || !(*method == Method::GET || *method == Method::HEAD) {
        return false;
    }
    is_document_navigation(headers)
}

pub fn is_document_navigation(headers: &HeaderMap) -> bool {
    if let Some(accept) = headers.get(ACCEPT) {
        return accept
            .to_str()
            .map(|v| v.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
    }

    header_equals(headers, HEADER_SEC_FETCH_DEST, "document")
        || header_equals(headers, HEADER_SEC_FETCH_MODE, "navigate")
}

fn header_equals(headers: &HeaderMap, name: &str, expected: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

pub fn report_endpoint_url(scheme: &str, host: &str, report_path: &str) -> String {
    format!("{scheme}://{host}{report_path}")
}

#[derive(Serialize)]
struct ReportToHeader<'a> {
    group: &'static str,
    max_age: u64,
    endpoints: [ReportToEndpoint<'a>; 1],
}

#[derive(Serialize)]
struct ReportToEndpoint<'a> {
    url: &'a str,
}

/// `Report-To` header value for the violation endpoint.
pub fn report_to_header_value(endpoint: &str) -> Result<String, SiteError> {
    serde_json::to_string(&ReportToHeader {
        group: REPORT_GROUP,
        max_age: REPORT_TO_MAX_AGE_SECS,
        endpoints: [ReportToEndpoint { url: endpoint }],
    })
    .map_err(|e| SiteError::Header(e.to_string()))
}

/// `Reporting-Endpoints` structured-header value.
pub fn reporting_endpoints_header_value(endpoint: &str) -> String {
    format!("{REPORT_GROUP}=\"{endpoint}\"")
}

struct PolicyHeaders {
    mode: CspMode,
    policy: HeaderValue,
    report_to: HeaderValue,
    reporting_endpoints: HeaderValue,
}

impl PolicyHeaders {
    fn build(mode: CspMode, policy: &str, endpoint: &str) -> Result<Self, SiteError> {
        Ok(Self {
            mode,
            policy: header_value(policy)?,
            report_to: header_value(&report_to_header_value(endpoint)?)?,
            reporting_endpoints: header_value(&reporting_endpoints_header_value(endpoint))?,
        })
    }

    fn apply(self, headers: &mut HeaderMap) {
        headers.remove(self.mode.opposite_header_name());
        headers.insert(self.mode.header_name(), self.policy);
        headers.insert(HeaderName::from_static(HEADER_REPORT_TO), self.report_to);
        headers.insert(
            HeaderName::from_static(HEADER_REPORTING_ENDPOINTS),
            self.reporting_endpoints,
        );
    }
}

fn header_value(value: &str) -> Result<HeaderValue, SiteError> {
    HeaderValue::from_str(value).map_err(|e| SiteError::Header(e.to_string()))
}
