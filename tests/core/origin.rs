use actix_site_guard::{resolve_site_url_for_env, ConfigError, EnvVars, EventLogger, EventRecord};
use parking_lot::Mutex;
use std::sync::Arc;

fn recording_logger() -> (EventLogger, Arc<Mutex<Vec<EventRecord>>>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    let logger = EventLogger::with_sink(move |record| sink.lock().push(record.clone()));
    (logger, records)
}

fn env(pairs: &[(&str, &str)]) -> EnvVars {
    EnvVars::from_pairs(pairs.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_explicit_url_strips_trailing_slash() {
        let origin = resolve_site_url_for_env(
            &env(&[("NODE_ENV", "production"), ("PUBLIC_SITE_URL", "https://example.com/")]),
            &EventLogger::new(),
        )
        .unwrap();

        assert_eq!(origin.as_str(), "https://example.com");
        assert_eq!(origin.origin(), "https://example.com");
    }

    #[test]
    fn test_explicit_url_keeps_base_path() {
        let origin = resolve_site_url_for_env(
            &env(&[("PUBLIC_SITE_URL", "https://example.com/blog///")]),
            &EventLogger::new(),
        )
        .unwrap();

        assert_eq!(origin.to_string(), "https://example.com/blog");
        assert_eq!(origin.origin(), "https://example.com");
    }

    #[test]
    fn test_production_without_url_fails() {
        let result = resolve_site_url_for_env(&env(&[("NODE_ENV", "production")]), &EventLogger::new());

        assert_eq!(result.unwrap_err(), ConfigError::MissingSiteUrl);
    }

    #[test]
    fn test_production_infers_deployment_host() {
        let origin = resolve_site_url_for_env(
            &env(&[("NODE_ENV", "production"), ("VERCEL_URL", "my-site.vercel.app")]),
            &EventLogger::new(),
        )
        .unwrap();

        assert_eq!(origin.as_str(), "https://my-site.vercel.app");
    }

    #[test]
    fn test_production_host_preferred_over_deployment_url() {
        let origin = resolve_site_url_for_env(
            &env(&[
                ("NODE_ENV", "production"),
                ("VERCEL_URL", "my-site-abc123.vercel.app"),
                ("VERCEL_PROJECT_PRODUCTION_URL", "www.example.com"),
            ]),
            &EventLogger::new(),
        )
        .unwrap();

        assert_eq!(origin.as_str(), "https://www.example.com");
    }

    #[test]
    fn test_development_defaults_to_localhost() {
        let origin = resolve_site_url_for_env(&EnvVars::new(), &EventLogger::new()).unwrap();

        assert_eq!(origin.as_str(), "http://localhost:3000");
        assert!(origin.is_loopback());
    }

    #[test_case("https://example.com" ; "with value")]
    #[test_case("" ; "empty value")]
    fn test_legacy_key_is_rejected(value: &str) {
        let result = resolve_site_url_for_env(
            &env(&[("SITE_URL", value), ("PUBLIC_SITE_URL", "https://example.com")]),
            &EventLogger::new(),
        );

        assert!(matches!(result, Err(ConfigError::LegacyKey(_))));
    }

    #[test_case("not a url" ; "garbage")]
    #[test_case("ftp://example.com" ; "wrong scheme")]
    #[test_case("/relative/path" ; "relative")]
    fn test_invalid_explicit_url_is_rejected(value: &str) {
        let result = resolve_site_url_for_env(&env(&[("PUBLIC_SITE_URL", value)]), &EventLogger::new());

        assert!(matches!(result, Err(ConfigError::InvalidSiteUrl(_))));
    }

    #[test_case("http://localhost:3000" ; "localhost")]
    #[test_case("http://127.0.0.1:8080" ; "ipv4 loopback")]
    #[test_case("http://[::1]:3000" ; "ipv6 loopback")]
    #[test_case("http://app.localhost" ; "localhost subdomain")]
    fn test_production_loopback_is_rejected(value: &str) {
        let result = resolve_site_url_for_env(
            &env(&[("NODE_ENV", "production"), ("PUBLIC_SITE_URL", value)]),
            &EventLogger::new(),
        );

        assert!(matches!(result, Err(ConfigError::LoopbackSiteUrl(_))));
    }

    #[test]
    fn test_loopback_override_warns_once_and_proceeds() {
        let (logger, records) = recording_logger();
        let origin = resolve_site_url_for_env(
            &env(&[
                ("NODE_ENV", "production"),
                ("PUBLIC_SITE_URL", "http://localhost:3000"),
                ("ALLOW_LOCALHOST_SITE_URL", "1"),
            ]),
            &logger,
        )
        .unwrap();

        assert_eq!(origin.as_str(), "http://localhost:3000");
        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "site_url_localhost_override");
    }

    #[test_case("CI", "true" ; "ci")]
    #[test_case("VERCEL", "1" ; "vercel")]
    fn test_loopback_override_refused_on_ci_and_platform(key: &str, value: &str) {
        let result = resolve_site_url_for_env(
            &env(&[
                ("NODE_ENV", "production"),
                ("PUBLIC_SITE_URL", "http://localhost:3000"),
                ("ALLOW_LOCALHOST_SITE_URL", "true"),
                (key, value),
            ]),
            &EventLogger::new(),
        );

        assert!(matches!(result, Err(ConfigError::UnsafeLoopbackOverride(_))));
    }

    #[test]
    fn test_override_without_production_does_not_warn() {
        let (logger, records) = recording_logger();
        resolve_site_url_for_env(&env(&[("ALLOW_LOCALHOST_SITE_URL", "yes")]), &logger).unwrap();

        assert!(records.lock().is_empty());
    }
}
