use crate::constants::DRAFT_COOKIE;
use crate::security::nonce::RequestNonce;
use crate::security::secret::PreviewAccessGuard;
use actix_web::{cookie::Cookie, http::header::COOKIE, HttpMessage};

/// Accessors for handlers rendering pages behind the CSP gate.
pub trait CspExtensions {
    /// Nonce for inline `<script>` / `<style>` tags. `None` unless the gate
    /// ran for this request.
    fn csp_nonce(&self) -> Option<String>;

    /// Whether the request carries a valid draft-mode cookie.
    fn is_draft_mode(&self, guard: &PreviewAccessGuard) -> bool;
}

impl<T> CspExtensions for T
where
    T: HttpMessage,
{
    fn csp_nonce(&self) -> Option<String> {
        self.extensions()
            .get::<RequestNonce>()
            .map(|nonce| nonce.0.clone())
    }

    fn is_draft_mode(&self, guard: &PreviewAccessGuard) -> bool {
        self.headers()
            .get_all(COOKIE)
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| Cookie::parse(pair.trim()).ok())
            .find(|cookie| cookie.name() == DRAFT_COOKIE)
            .is_some_and(|cookie| guard.is_valid_draft_token(cookie.value()))
    }
}
