use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use ring::{constant_time::verify_slices_are_equal, hmac};
use std::fmt;

const DRAFT_TOKEN_CONTEXT: &[u8] = b"site-guard/draft-mode/v1";

/// Shared-secret check gating entry into draft/preview mode.
#[derive(Clone, Default)]
pub struct PreviewAccessGuard {
    secret: Option<String>,
}

impl fmt::Debug for PreviewAccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewAccessGuard")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl PreviewAccessGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn is_valid_secret(&self, candidate: Option<&str>) -> bool {
        let (Some(expected), Some(candidate)) = (self.secret.as_deref(), candidate) else {
            return false;
        };

        if candidate.is_empty() || !candidate.bytes().all(is_printable_ascii) {
            return false;
        }

        // Length is not treated as secret.
        if expected.len() != candidate.len() {
            return false;
        }

        verify_slices_are_equal(expected.as_bytes(), candidate.as_bytes()).is_ok()
    }

    /// Cookie value proving draft mode was entered with the configured secret.
    pub fn draft_token(&self) -> Option<String> {
        let key = self.token_key()?;
        Some(BASE64.encode(hmac::sign(&key, DRAFT_TOKEN_CONTEXT).as_ref()))
    }

    pub fn is_valid_draft_token(&self, token: &str) -> bool {
        let Some(key) = self.token_key() else {
            return false;
        };
        let Ok(tag) = BASE64.decode(token.trim()) else {
            return false;
        };
        hmac::verify(&key, DRAFT_TOKEN_CONTEXT, &tag).is_ok()
    }

    fn token_key(&self) -> Option<hmac::Key> {
        self.secret
            .as_deref()
            .map(|secret| hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()))
    }
}

#[inline]
fn is_printable_ascii(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}
