pub mod csp;
pub mod extensions;
pub mod reporting;

pub use csp::{should_apply, CspMiddleware, CspMiddlewareService};
pub use extensions::CspExtensions;
pub use reporting::{ingest_report, CspReportingMiddleware, CspReportingMiddlewareService, ReportRejection};
