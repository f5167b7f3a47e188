use crate::constants::{
    ANALYTICS_SCRIPT_ORIGIN, ANALYTICS_VITALS_ORIGIN, BASE_URI, CONNECT_SRC, DEFAULT_SRC,
    FONT_SRC, FORM_ACTION, FRAME_ANCESTORS, HEADER_CSP, HEADER_CSP_REPORT_ONLY, IMG_SRC,
    OBJECT_SRC, REPORT_GROUP, REPORT_PATH, REPORT_TO, REPORT_URI, SCRIPT_SRC, SEMICOLON_SPACE,
    STYLE_SRC, UPGRADE_INSECURE_REQUESTS,
};
use crate::core::source::Source;
use crate::logging::{EventLogger, EVENT_CSP_MODE_INVALID};
use actix_web::http::header::HeaderName;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CspMode {
    #[default]
    ReportOnly,
    Enforce,
}

impl CspMode {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("report-only") {
            Some(Self::ReportOnly)
        } else if raw.eq_ignore_ascii_case("enforce") {
            Some(Self::Enforce)
        } else {
            None
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReportOnly => "report-only",
            Self::Enforce => "enforce",
        }
    }

    #[inline]
    pub const fn is_report_only(&self) -> bool {
        matches!(self, Self::ReportOnly)
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        match self {
            Self::ReportOnly => HeaderName::from_static(HEADER_CSP_REPORT_ONLY),
            Self::Enforce => HeaderName::from_static(HEADER_CSP),
        }
    }

    /// The header that must not accompany this mode's header.
    #[inline]
    pub fn opposite_header_name(&self) -> HeaderName {
        match self {
            Self::ReportOnly => HeaderName::from_static(HEADER_CSP),
            Self::Enforce => HeaderName::from_static(HEADER_CSP_REPORT_ONLY),
        }
    }
}

impl fmt::Display for CspMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvalidModeWarning<'a> {
    value: &'a str,
    fallback: &'static str,
}

/// Resolves the configured CSP mode, warning about an invalid value at most
/// once over the resolver's lifetime.
#[derive(Debug, Default)]
pub struct CspModeResolver {
    warned: AtomicBool,
    logger: EventLogger,
}

impl CspModeResolver {
    #[inline]
    pub fn new(logger: EventLogger) -> Self {
        Self {
            warned: AtomicBool::new(false),
            logger,
        }
    }

    pub fn resolve(&self, raw: Option<&str>) -> CspMode {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return CspMode::default();
        };

        if let Some(mode) = CspMode::parse(raw) {
            return mode;
        }

        if !self.warned.swap(true, Ordering::Relaxed) {
            self.logger.warn(
                EVENT_CSP_MODE_INVALID,
                &InvalidModeWarning {
                    value: raw,
                    fallback: CspMode::default().as_str(),
                },
            );
        }

        CspMode::default()
    }

    #[inline]
    pub fn has_warned(&self) -> bool {
        self.warned.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    name: &'static str,
    sources: SmallVec<[Source; 4]>,
}

impl Directive {
    pub fn new<I>(name: &'static str, sources: I) -> Self
    where
        I: IntoIterator<Item = Source>,
    {
        Self {
            name,
            sources: sources.into_iter().collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        self.name.len()
            + self
                .sources
                .iter()
                .map(|source| source.estimated_size() + 1)
                .sum::<usize>()
    }

    fn write_to(&self, buffer: &mut String) {
        buffer.push_str(self.name);
        for source in &self.sources {
            buffer.push(' ');
            source.write_to(buffer);
        }
    }
}

/// One rendered per-request policy. Directive order is insertion order and is
/// part of the header contract.
#[derive(Debug, Clone, Default)]
pub struct CspPolicy {
    directives: IndexMap<&'static str, Directive>,
    report_uri: Option<Cow<'static, str>>,
    report_to: Option<Cow<'static, str>>,
    upgrade_insecure_requests: bool,
    estimated_size: usize,
}

impl CspPolicy {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directive(&mut self, directive: Directive) -> &mut Self {
        self.estimated_size += directive.estimated_size() + SEMICOLON_SPACE.len();
        self.directives.insert(directive.name(), directive);
        self
    }

    #[inline]
    pub fn get_directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    #[inline]
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    #[inline]
    pub fn report_uri(&self) -> Option<&str> {
        self.report_uri.as_deref()
    }

    #[inline]
    pub fn report_to(&self) -> Option<&str> {
        self.report_to.as_deref()
    }

    #[inline]
    pub fn upgrades_insecure_requests(&self) -> bool {
        self.upgrade_insecure_requests
    }

    pub fn header_value(&self) -> String {
        let mut buffer = String::with_capacity(self.estimated_size + 128);
        let mut parts = 0usize;
        let mut separate = |buffer: &mut String| {
            if parts > 0 {
                buffer.push_str(SEMICOLON_SPACE);
            }
            parts += 1;
        };

        for directive in self.directives.values() {
            separate(&mut buffer);
            directive.write_to(&mut buffer);
        }

        if let Some(uri) = &self.report_uri {
            separate(&mut buffer);
            buffer.push_str(REPORT_URI);
            buffer.push(' ');
            buffer.push_str(uri);
        }

        if let Some(group) = &self.report_to {
            separate(&mut buffer);
            buffer.push_str(REPORT_TO);
            buffer.push(' ');
            buffer.push_str(group);
        }

        if self.upgrade_insecure_requests {
            separate(&mut buffer);
            buffer.push_str(UPGRADE_INSECURE_REQUESTS);
        }

        buffer
    }
}

/// Assembles the site's fixed policy around a per-request nonce.
#[derive(Debug, Clone)]
pub struct CspPolicyBuilder {
    report_uri: Cow<'static, str>,
    report_group: Cow<'static, str>,
}

impl Default for CspPolicyBuilder {
    fn default() -> Self {
        Self {
            report_uri: Cow::Borrowed(REPORT_PATH),
            report_group: Cow::Borrowed(REPORT_GROUP),
        }
    }
}

impl CspPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn report_uri(mut self, uri: impl Into<Cow<'static, str>>) -> Self {
        self.report_uri = uri.into();
        self
    }

    #[inline]
    pub fn report_group(mut self, group: impl Into<Cow<'static, str>>) -> Self {
        self.report_group = group.into();
        self
    }

    pub fn build(&self, nonce: &str, is_production: bool) -> CspPolicy {
        let analytics_script = Source::Host(Cow::Borrowed(ANALYTICS_SCRIPT_ORIGIN));

        let mut policy = CspPolicy::new();
        policy
            .add_directive(Directive::new(DEFAULT_SRC, [Source::Self_]))
            .add_directive(Directive::new(
                SCRIPT_SRC,
                [
                    Source::Self_,
                    Source::Nonce(Cow::Owned(nonce.to_owned())),
                    Source::StrictDynamic,
                    analytics_script.clone(),
                ],
            ))
            .add_directive(Directive::new(
                STYLE_SRC,
                [Source::Self_, Source::UnsafeInline],
            ))
            .add_directive(Directive::new(
                IMG_SRC,
                [
                    Source::Self_,
                    Source::Scheme(Cow::Borrowed("data")),
                    Source::Scheme(Cow::Borrowed("blob")),
                    Source::Scheme(Cow::Borrowed("https")),
                ],
            ))
            .add_directive(Directive::new(
                FONT_SRC,
                [Source::Self_, Source::Scheme(Cow::Borrowed("data"))],
            ))
            .add_directive(Directive::new(
                CONNECT_SRC,
                [
                    Source::Self_,
                    analytics_script,
                    Source::Host(Cow::Borrowed(ANALYTICS_VITALS_ORIGIN)),
                ],
            ))
            .add_directive(Directive::new(OBJECT_SRC, [Source::None]))
            .add_directive(Directive::new(BASE_URI, [Source::Self_]))
            .add_directive(Directive::new(FORM_ACTION, [Source::Self_]))
            .add_directive(Directive::new(FRAME_ANCESTORS, [Source::None]));

        policy.report_uri = Some(self.report_uri.clone());
        policy.report_to = Some(self.report_group.clone());
        policy.upgrade_insecure_requests = is_production;
        policy
    }

    #[inline]
    pub fn build_header_value(&self, nonce: &str, is_production: bool) -> String {
        self.build(nonce, is_production).header_value()
    }
}

#[inline]
pub fn build_csp_header_value(nonce: &str, is_production: bool) -> String {
    CspPolicyBuilder::new().build_header_value(nonce, is_production)
}
