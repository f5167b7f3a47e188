pub use crate::core::{CspMode, EnvVars, SiteConfig, SiteConfigBuilder, SiteOrigin};
pub use crate::logging::EventLogger;
pub use crate::middleware::{CspExtensions, CspMiddleware, CspReportingMiddleware};
pub use crate::routes::configure_site;
pub use crate::security::{normalize_safe_redirect_path, SafeRedirectNormalizer};
pub use crate::state::SiteState;
