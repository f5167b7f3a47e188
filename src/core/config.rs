use crate::constants::{
    DEFAULT_MAX_BUCKETS, DEFAULT_MAX_REPORT_SIZE, DEFAULT_PRUNE_INTERVAL_MS,
    DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_MS, ENV_CSP_MODE, ENV_PREVIEW_SECRET,
    LOCAL_FALLBACK_ORIGIN, REPORT_PATH,
};
use crate::core::env::EnvVars;
use crate::core::origin::{is_strict_env, resolve_site_url_for_env, SiteOrigin};
use crate::core::policy::{CspMode, CspModeResolver};
use crate::error::ConfigError;
use crate::logging::EventLogger;
use std::borrow::Cow;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: u32,
    pub prune_interval: Duration,
    pub max_buckets: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
            max_requests: DEFAULT_RATE_LIMIT_MAX,
            prune_interval: Duration::from_millis(DEFAULT_PRUNE_INTERVAL_MS),
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }
}

/// Process-wide settings, resolved once before the server accepts traffic.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    origin: SiteOrigin,
    is_production: bool,
    csp_mode: CspMode,
    preview_secret: Option<String>,
    report_path: Cow<'static, str>,
    max_report_size: usize,
    rate_limit: RateLimitSettings,
}

impl SiteConfig {
    pub fn from_env(env: &EnvVars, logger: &EventLogger) -> Result<Self, ConfigError> {
        let origin = resolve_site_url_for_env(env, logger)?;
        let csp_mode = CspModeResolver::new(logger.clone()).resolve(env.get(ENV_CSP_MODE));

        Ok(Self {
            origin,
            is_production: is_strict_env(env),
            csp_mode,
            preview_secret: env.get(ENV_PREVIEW_SECRET).map(str::to_owned),
            report_path: Cow::Borrowed(REPORT_PATH),
            max_report_size: DEFAULT_MAX_REPORT_SIZE,
            rate_limit: RateLimitSettings::default(),
        })
    }

    #[inline]
    pub fn origin(&self) -> &SiteOrigin {
        &self.origin
    }

    #[inline]
    pub fn is_production(&self) -> bool {
        self.is_production
    }

    #[inline]
    pub fn csp_mode(&self) -> CspMode {
        self.csp_mode
    }

    #[inline]
    pub fn preview_secret(&self) -> Option<&str> {
        self.preview_secret.as_deref()
    }

    #[inline]
    pub fn report_path(&self) -> &str {
        &self.report_path
    }

    #[inline]
    pub fn max_report_size(&self) -> usize {
        self.max_report_size
    }

    #[inline]
    pub fn rate_limit(&self) -> RateLimitSettings {
        self.rate_limit
    }
}

#[derive(Debug, Default)]
pub struct SiteConfigBuilder {
    origin: Option<SiteOrigin>,
    is_production: bool,
    csp_mode: CspMode,
    preview_secret: Option<String>,
    report_path: Option<Cow<'static, str>>,
    max_report_size: Option<usize>,
    rate_limit: Option<RateLimitSettings>,
}

impl SiteConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn origin(mut self, origin: SiteOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    #[inline]
    pub fn production(mut self, is_production: bool) -> Self {
        self.is_production = is_production;
        self
    }

    #[inline]
    pub fn csp_mode(mut self, mode: CspMode) -> Self {
        self.csp_mode = mode;
        self
    }

    #[inline]
    pub fn preview_secret(mut self, secret: impl Into<String>) -> Self {
        self.preview_secret = Some(secret.into());
        self
    }

    #[inline]
    pub fn report_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    #[inline]
    pub fn max_report_size(mut self, size: usize) -> Self {
        self.max_report_size = Some(size);
        self
    }

    #[inline]
    pub fn rate_limit(mut self, settings: RateLimitSettings) -> Self {
        self.rate_limit = Some(settings);
        self
    }

    pub fn build(self) -> Result<SiteConfig, ConfigError> {
        let origin = match self.origin {
            Some(origin) => origin,
            None => SiteOrigin::parse(LOCAL_FALLBACK_ORIGIN)?,
        };

        Ok(SiteConfig {
            origin,
            is_production: self.is_production,
            csp_mode: self.csp_mode,
            preview_secret: self.preview_secret,
            report_path: self.report_path.unwrap_or(Cow::Borrowed(REPORT_PATH)),
            max_report_size: self.max_report_size.unwrap_or(DEFAULT_MAX_REPORT_SIZE),
            rate_limit: self.rate_limit.unwrap_or_default(),
        })
    }
}
