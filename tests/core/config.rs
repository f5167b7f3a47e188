use actix_site_guard::{
    CspMode, EnvVars, EventLogger, RateLimitSettings, SiteConfig, SiteConfigBuilder, SiteOrigin,
};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_production() {
        let env = EnvVars::new()
            .set("NODE_ENV", "production")
            .set("PUBLIC_SITE_URL", "https://example.com")
            .set("CSP_MODE", "enforce")
            .set("PREVIEW_SECRET", "s3cret");

        let config = SiteConfig::from_env(&env, &EventLogger::new()).unwrap();

        assert!(config.is_production());
        assert_eq!(config.origin().as_str(), "https://example.com");
        assert_eq!(config.csp_mode(), CspMode::Enforce);
        assert_eq!(config.preview_secret(), Some("s3cret"));
        assert_eq!(config.report_path(), "/api/csp-report");
        assert_eq!(config.max_report_size(), 32 * 1024);
    }

    #[test]
    fn test_from_env_development_defaults() {
        let config = SiteConfig::from_env(&EnvVars::new(), &EventLogger::new()).unwrap();

        assert!(!config.is_production());
        assert_eq!(config.csp_mode(), CspMode::ReportOnly);
        assert_eq!(config.preview_secret(), None);
        assert_eq!(config.rate_limit(), RateLimitSettings::default());
    }

    #[test]
    fn test_from_env_blank_secret_is_unset() {
        let env = EnvVars::new().set("PREVIEW_SECRET", "   ");
        let config = SiteConfig::from_env(&env, &EventLogger::new()).unwrap();

        assert_eq!(config.preview_secret(), None);
    }

    #[test]
    fn test_from_env_propagates_origin_errors() {
        let env = EnvVars::new().set("NODE_ENV", "production");

        assert!(SiteConfig::from_env(&env, &EventLogger::new()).is_err());
    }

    #[test]
    fn test_default_rate_limit_settings() {
        let settings = RateLimitSettings::default();

        assert_eq!(settings.window, Duration::from_secs(60));
        assert_eq!(settings.max_requests, 60);
        assert_eq!(settings.prune_interval, Duration::from_secs(10));
        assert_eq!(settings.max_buckets, 1024);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SiteConfigBuilder::new()
            .origin(SiteOrigin::parse("https://example.com").unwrap())
            .production(true)
            .csp_mode(CspMode::Enforce)
            .preview_secret("secret")
            .report_path("/reports")
            .max_report_size(128)
            .build()
            .unwrap();

        assert_eq!(config.origin().origin(), "https://example.com");
        assert!(config.is_production());
        assert_eq!(config.csp_mode(), CspMode::Enforce);
        assert_eq!(config.report_path(), "/reports");
        assert_eq!(config.max_report_size(), 128);
    }

    #[test]
    fn test_builder_defaults_to_local_origin() {
        let config = SiteConfigBuilder::new().build().unwrap();

        assert_eq!(config.origin().as_str(), "http://localhost:3000");
        assert!(!config.is_production());
    }
}
