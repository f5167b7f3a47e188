pub mod constants;
pub mod core;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod monitoring;
pub mod prelude;
pub mod routes;
pub mod security;
pub mod state;

// Re-export commonly used types for convenience
pub use core::{
    build_csp_header_value, resolve_site_url_for_env, CspMode, CspModeResolver, CspPolicy,
    CspPolicyBuilder, EnvVars, RateLimitSettings, SiteConfig, SiteConfigBuilder, SiteOrigin,
    Source,
};
pub use error::{ConfigError, SiteError};
pub use logging::{EventLogger, EventRecord};
pub use middleware::{CspExtensions, CspMiddleware, CspReportingMiddleware};
pub use monitoring::{normalize_origin, RateLimiter, SecurityStats, ViolationEntry};
pub use routes::configure_site;
pub use security::{
    create_csp_nonce, normalize_safe_redirect_path, NonceGenerator, PreviewAccessGuard,
    RequestNonce, SafeRedirectNormalizer,
};
pub use state::SiteState;
