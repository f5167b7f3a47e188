pub mod rate_limit;
pub mod report;
pub mod stats;

pub use rate_limit::{RateLimitBucket, RateLimiter};
pub use report::{normalize_origin, parse_report_body, ReportPayload, ViolationEntry};
pub use stats::SecurityStats;
