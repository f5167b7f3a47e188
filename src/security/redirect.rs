//! Open-redirect prevention for user-supplied return paths.
//!
//! Every gate checks both the raw input and its single percent-decoded form:
//! the raw form catches literal backslash tricks, the decoded form catches
//! encoded `//` and scheme bypasses. Only one decoding level is applied, so
//! triple-encoded input such as `%25255c` is passed through as an ordinary path.

use crate::constants::MAX_REDIRECT_INPUT_CHARS;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::borrow::Cow;
use url::{Origin, Url};

const ROOT: &str = "/";

#[derive(Debug, Clone, Default)]
pub struct SafeRedirectNormalizer {
    allowed_origins: SmallVec<[Origin; 2]>,
}

impl SafeRedirectNormalizer {
    /// Builds a normalizer accepting absolute URLs on any of `origins`.
    /// Entries that do not parse to a tuple origin are ignored.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_origins = origins
            .into_iter()
            .filter_map(|origin| Url::parse(origin.as_ref().trim()).ok())
            .map(|url| url.origin())
            .filter(Origin::is_tuple)
            .collect();

        Self { allowed_origins }
    }

    #[inline]
    pub fn allows(&self, url: &Url) -> bool {
        let origin = url.origin();
        origin.is_tuple() && self.allowed_origins.contains(&origin)
    }

    /// Returns a same-origin relative path, `/` whenever the input is unsafe
    /// or ambiguous.
    pub fn normalize(&self, raw: &str) -> String {
        self.try_normalize(raw).unwrap_or_else(|| ROOT.to_owned())
    }

    fn try_normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let candidate: String = trimmed
            .chars()
            .take(MAX_REDIRECT_INPUT_CHARS)
            .filter(|c| !is_control(*c))
            .collect();
        if candidate.is_empty() {
            return None;
        }

        let decoded: Cow<'_, str> = percent_decode_str(&candidate)
            .decode_utf8()
            .unwrap_or(Cow::Borrowed(candidate.as_str()));
        let forms = [candidate.as_str(), decoded.as_ref()];

        if forms.iter().any(|form| contains_backslash(form)) {
            return None;
        }

        if let Some(absolute) = forms.iter().find(|form| has_scheme(form)) {
            return self.same_origin_path(absolute);
        }

        if forms.iter().any(|form| form.starts_with("//")) {
            return None;
        }

        if candidate.starts_with('/') {
            Some(candidate)
        } else {
            Some(format!("/{candidate}"))
        }
    }

    fn same_origin_path(&self, absolute: &str) -> Option<String> {
        let url = Url::parse(absolute).ok()?;
        if !self.allows(&url) {
            return None;
        }

        let mut path = url.path().to_owned();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            path.push('#');
            path.push_str(fragment);
        }

        if path.starts_with("//") {
            return None;
        }
        Some(path)
    }
}

pub fn normalize_safe_redirect_path(raw: &str, allowed_origins: &[&str]) -> String {
    SafeRedirectNormalizer::new(allowed_origins.iter().copied()).normalize(raw)
}

#[inline]
fn is_control(c: char) -> bool {
    c <= '\u{1f}' || c == '\u{7f}'
}

fn contains_backslash(value: &str) -> bool {
    value.contains('\\')
        || value
            .as_bytes()
            .windows(3)
            .any(|w| w[0] == b'%' && w[1] == b'5' && w[2].eq_ignore_ascii_case(&b'c'))
}

/// `scheme:` prefix per RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ).
fn has_scheme(value: &str) -> bool {
    let mut chars = value.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    for c in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return false,
        }
    }
    false
}
