use crate::constants::NONCE_BYTES;
use crate::error::SiteError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use getrandom::getrandom;
use std::{
    ops::Deref,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Per-request CSP nonces: 24 bytes from the OS CSPRNG, base64url without
/// padding (32 characters).
#[derive(Debug, Default)]
pub struct NonceGenerator {
    generated: AtomicUsize,
}

impl NonceGenerator {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self) -> Result<String, SiteError> {
        let nonce = create_csp_nonce()?;
        self.generated.fetch_add(1, Ordering::Relaxed);
        Ok(nonce)
    }

    #[inline]
    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }
}

pub fn create_csp_nonce() -> Result<String, SiteError> {
    let mut buffer = [0u8; NONCE_BYTES];
    getrandom(&mut buffer).map_err(|e| SiteError::Crypto(e.to_string()))?;
    Ok(BASE64.encode(buffer))
}

/// Nonce attached to the request extensions by the gate middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNonce(pub String);

impl Deref for RequestNonce {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
