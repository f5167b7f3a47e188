use actix_site_guard::{
    build_csp_header_value, CspMode, CspModeResolver, CspPolicyBuilder, EventLogger, EventRecord,
    Source,
};
use parking_lot::Mutex;
use std::sync::Arc;

const NONCE: &str = "abcDEF123_-xyzABCdef456ghiJKL789";

const EXPECTED_DEV: &str = "default-src 'self'; \
script-src 'self' 'nonce-abcDEF123_-xyzABCdef456ghiJKL789' 'strict-dynamic' https://va.vercel-scripts.com; \
style-src 'self' 'unsafe-inline'; \
img-src 'self' data: blob: https:; \
font-src 'self' data:; \
connect-src 'self' https://va.vercel-scripts.com https://vitals.vercel-insights.com; \
object-src 'none'; \
base-uri 'self'; \
form-action 'self'; \
frame-ancestors 'none'; \
report-uri /api/csp-report; \
report-to csp-endpoint";

fn recording_resolver() -> (CspModeResolver, Arc<Mutex<Vec<EventRecord>>>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    let logger = EventLogger::with_sink(move |record| sink.lock().push(record.clone()));
    (CspModeResolver::new(logger), records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_header_value_without_production() {
        assert_eq!(build_csp_header_value(NONCE, false), EXPECTED_DEV);
    }

    #[test]
    fn test_header_value_in_production_upgrades_last() {
        let header = build_csp_header_value(NONCE, true);

        assert_eq!(header, format!("{EXPECTED_DEV}; upgrade-insecure-requests"));
        assert!(header.ends_with("upgrade-insecure-requests"));
    }

    #[test]
    fn test_nonce_appears_exactly_once() {
        let header = build_csp_header_value(NONCE, true);

        assert_eq!(header.matches(&format!("'nonce-{NONCE}'")).count(), 1);
    }

    #[test]
    fn test_policy_structure() {
        let policy = CspPolicyBuilder::new().build(NONCE, false);

        let names: Vec<_> = policy.directives().map(|d| d.name()).collect();
        assert_eq!(
            names,
            [
                "default-src",
                "script-src",
                "style-src",
                "img-src",
                "font-src",
                "connect-src",
                "object-src",
                "base-uri",
                "form-action",
                "frame-ancestors",
            ]
        );

        let script = policy.get_directive("script-src").unwrap();
        assert!(script
            .sources()
            .iter()
            .any(|source| matches!(source, Source::Nonce(n) if n == NONCE)));
        assert_eq!(
            policy.get_directive("object-src").unwrap().sources(),
            [Source::None]
        );
        assert_eq!(policy.report_uri(), Some("/api/csp-report"));
        assert_eq!(policy.report_to(), Some("csp-endpoint"));
        assert!(!policy.upgrades_insecure_requests());
    }

    #[test]
    fn test_custom_report_targets() {
        let header = CspPolicyBuilder::new()
            .report_uri("/reports")
            .report_group("site-reports")
            .build_header_value(NONCE, false);

        assert!(header.contains("; report-uri /reports; report-to site-reports"));
    }

    #[test_case("report-only", CspMode::ReportOnly ; "report only")]
    #[test_case("enforce", CspMode::Enforce ; "enforce")]
    #[test_case("  ENFORCE ", CspMode::Enforce ; "case and whitespace")]
    fn test_mode_parse(raw: &str, expected: CspMode) {
        assert_eq!(CspMode::parse(raw), Some(expected));
    }

    #[test]
    fn test_mode_headers_are_opposites() {
        assert_eq!(
            CspMode::Enforce.header_name().as_str(),
            "content-security-policy"
        );
        assert_eq!(
            CspMode::ReportOnly.header_name().as_str(),
            "content-security-policy-report-only"
        );
        assert_eq!(
            CspMode::Enforce.opposite_header_name(),
            CspMode::ReportOnly.header_name()
        );
        assert!(CspMode::default().is_report_only());
    }

    #[test]
    fn test_unset_mode_defaults_silently() {
        let (resolver, records) = recording_resolver();

        assert_eq!(resolver.resolve(None), CspMode::ReportOnly);
        assert_eq!(resolver.resolve(Some("   ")), CspMode::ReportOnly);
        assert!(records.lock().is_empty());
        assert!(!resolver.has_warned());
    }

    #[test]
    fn test_invalid_mode_warns_once() {
        let (resolver, records) = recording_resolver();

        assert_eq!(resolver.resolve(Some("block")), CspMode::ReportOnly);
        assert_eq!(resolver.resolve(Some("strict")), CspMode::ReportOnly);
        assert_eq!(resolver.resolve(Some("block")), CspMode::ReportOnly);
        assert_eq!(resolver.resolve(Some("enforce")), CspMode::Enforce);

        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "csp_mode_invalid");
        assert_eq!(records[0].level, log::Level::Warn);

        let payload: serde_json::Value = serde_json::from_str(&records[0].payload).unwrap();
        assert_eq!(payload["value"], "block");
        assert_eq!(payload["fallback"], "report-only");
    }
}
