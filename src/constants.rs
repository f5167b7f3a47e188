pub(crate) const HEADER_CSP: &str = "content-security-policy";
pub(crate) const HEADER_CSP_REPORT_ONLY: &str = "content-security-policy-report-only";
pub(crate) const HEADER_REPORT_TO: &str = "report-to";
pub(crate) const HEADER_REPORTING_ENDPOINTS: &str = "reporting-endpoints";
pub(crate) const HEADER_SEC_FETCH_DEST: &str = "sec-fetch-dest";
pub(crate) const HEADER_SEC_FETCH_MODE: &str = "sec-fetch-mode";
pub(crate) const HEADER_X_REAL_IP: &str = "x-real-ip";
pub(crate) const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Request header carrying the per-request nonce to the rendering layer.
pub const NONCE_REQUEST_HEADER: &str = "x-csp-nonce";

pub(crate) const DEFAULT_SRC: &str = "default-src";
pub(crate) const SCRIPT_SRC: &str = "script-src";
pub(crate) const STYLE_SRC: &str = "style-src";
pub(crate) const IMG_SRC: &str = "img-src";
pub(crate) const FONT_SRC: &str = "font-src";
pub(crate) const CONNECT_SRC: &str = "connect-src";
pub(crate) const OBJECT_SRC: &str = "object-src";
pub(crate) const BASE_URI: &str = "base-uri";
pub(crate) const FORM_ACTION: &str = "form-action";
pub(crate) const FRAME_ANCESTORS: &str = "frame-ancestors";
pub(crate) const REPORT_URI: &str = "report-uri";
pub(crate) const REPORT_TO: &str = "report-to";
pub(crate) const UPGRADE_INSECURE_REQUESTS: &str = "upgrade-insecure-requests";

pub(crate) const NONE_SOURCE: &str = "'none'";
pub(crate) const SELF_SOURCE: &str = "'self'";
pub(crate) const UNSAFE_INLINE_SOURCE: &str = "'unsafe-inline'";
pub(crate) const STRICT_DYNAMIC_SOURCE: &str = "'strict-dynamic'";
pub(crate) const NONCE_PREFIX: &str = "'nonce-";
pub(crate) const SUFFIX_QUOTE: &str = "'";
pub(crate) const SEMICOLON_SPACE: &str = "; ";

pub(crate) const ANALYTICS_SCRIPT_ORIGIN: &str = "https://va.vercel-scripts.com";
pub(crate) const ANALYTICS_VITALS_ORIGIN: &str = "https://vitals.vercel-insights.com";

pub const REPORT_PATH: &str = "/api/csp-report";
pub const REPORT_GROUP: &str = "csp-endpoint";
pub(crate) const REPORT_TO_MAX_AGE_SECS: u64 = 86_400;

pub const DRAFT_ENABLE_PATH: &str = "/api/draft/enable";
pub const DRAFT_DISABLE_PATH: &str = "/api/draft/disable";
pub const DRAFT_COOKIE: &str = "__site_draft";
pub(crate) const ARTICLE_PATH_PREFIX: &str = "/articles/";

pub(crate) const NONCE_BYTES: usize = 24;
pub(crate) const MAX_REDIRECT_INPUT_CHARS: usize = 2048;
pub(crate) const DEFAULT_MAX_REPORT_SIZE: usize = 32 * 1024;
pub(crate) const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
pub(crate) const DEFAULT_RATE_LIMIT_MAX: u32 = 60;
pub(crate) const DEFAULT_PRUNE_INTERVAL_MS: u64 = 10_000;
pub(crate) const DEFAULT_MAX_BUCKETS: usize = 1024;

pub(crate) const DEDUPE_SEPARATOR: char = '\u{1f}';
pub(crate) const UNKNOWN_TOKEN: &str = "unknown";
pub(crate) const INVALID_URI_TOKEN: &str = "invalid-uri";

pub(crate) const LOCAL_FALLBACK_ORIGIN: &str = "http://localhost:3000";

pub(crate) const ENV_NODE_ENV: &str = "NODE_ENV";
pub(crate) const ENV_PUBLIC_SITE_URL: &str = "PUBLIC_SITE_URL";
pub(crate) const ENV_LEGACY_SITE_URL: &str = "SITE_URL";
pub(crate) const ENV_DEPLOYMENT_PRODUCTION_HOST: &str = "VERCEL_PROJECT_PRODUCTION_URL";
pub(crate) const ENV_DEPLOYMENT_HOST: &str = "VERCEL_URL";
pub(crate) const ENV_ALLOW_LOCALHOST: &str = "ALLOW_LOCALHOST_SITE_URL";
pub(crate) const ENV_CI: &str = "CI";
pub(crate) const ENV_VERCEL: &str = "VERCEL";
pub(crate) const ENV_CSP_MODE: &str = "CSP_MODE";
pub(crate) const ENV_PREVIEW_SECRET: &str = "PREVIEW_SECRET";
