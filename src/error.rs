use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

/// Startup-time configuration failures. These abort initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Legacy configuration key {0} is no longer supported; use PUBLIC_SITE_URL")]
    LegacyKey(String),

    #[error("Site URL is required in production: set PUBLIC_SITE_URL or a deployment host")]
    MissingSiteUrl,

    #[error("Invalid site URL: {0}")]
    InvalidSiteUrl(String),

    #[error("Site URL resolves to a loopback host in production: {0}")]
    LoopbackSiteUrl(String),

    #[error("Loopback override is local-only and cannot be combined with {0}")]
    UnsafeLoopbackOverride(String),
}

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Header processing error: {0}")]
    Header(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResponseError for SiteError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
