pub mod nonce;
pub mod redirect;
pub mod secret;

pub use nonce::{create_csp_nonce, NonceGenerator, RequestNonce};
pub use redirect::{normalize_safe_redirect_path, SafeRedirectNormalizer};
pub use secret::PreviewAccessGuard;
