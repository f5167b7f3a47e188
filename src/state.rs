use crate::core::config::SiteConfig;
use crate::core::env::EnvVars;
use crate::error::ConfigError;
use crate::logging::EventLogger;
use crate::monitoring::{RateLimiter, SecurityStats};
use crate::security::{NonceGenerator, PreviewAccessGuard, SafeRedirectNormalizer};
use std::sync::Arc;

/// Shared state owned by the application root and handed to every middleware
/// and route. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct SiteState {
    config: Arc<SiteConfig>,
    nonces: Arc<NonceGenerator>,
    rate_limiter: Arc<RateLimiter>,
    preview_guard: Arc<PreviewAccessGuard>,
    stats: Arc<SecurityStats>,
    logger: EventLogger,
}

impl SiteState {
    pub fn new(config: SiteConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit());
        let preview_guard = PreviewAccessGuard::new(config.preview_secret().map(str::to_owned));

        Self {
            config: Arc::new(config),
            nonces: Arc::new(NonceGenerator::new()),
            rate_limiter: Arc::new(rate_limiter),
            preview_guard: Arc::new(preview_guard),
            stats: Arc::new(SecurityStats::new()),
            logger: EventLogger::new(),
        }
    }

    pub fn from_env(env: &EnvVars, logger: EventLogger) -> Result<Self, ConfigError> {
        let config = SiteConfig::from_env(env, &logger)?;
        Ok(Self::new(config).with_logger(logger))
    }

    #[inline]
    pub fn with_logger(mut self, logger: EventLogger) -> Self {
        self.logger = logger;
        self
    }

    #[inline]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[inline]
    pub fn nonces(&self) -> &NonceGenerator {
        &self.nonces
    }

    #[inline]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    #[inline]
    pub fn preview_guard(&self) -> &PreviewAccessGuard {
        &self.preview_guard
    }

    #[inline]
    pub fn stats(&self) -> &Arc<SecurityStats> {
        &self.stats
    }

    #[inline]
    pub fn logger(&self) -> &EventLogger {
        &self.logger
    }

    /// Redirect normalizer accepting the site origin plus `request_origin`.
    pub fn redirect_normalizer(&self, request_origin: &str) -> SafeRedirectNormalizer {
        SafeRedirectNormalizer::new([self.config.origin().origin().as_str(), request_origin])
    }
}
