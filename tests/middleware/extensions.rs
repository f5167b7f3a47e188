use crate::helpers::{site_state, SECRET};
use actix_site_guard::{CspExtensions, CspMode, PreviewAccessGuard, RequestNonce};
use actix_web::test as actix_test;
use actix_web::{cookie::Cookie, http::header::COOKIE, HttpMessage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_comes_from_extension() {
        let req = actix_test::TestRequest::default()
            .insert_header(("x-csp-nonce", "from-header"))
            .to_http_request();
        req.extensions_mut()
            .insert(RequestNonce("from-extension".to_owned()));

        assert_eq!(req.csp_nonce().as_deref(), Some("from-extension"));
    }

    #[test]
    fn test_client_supplied_nonce_header_is_ignored() {
        let req = actix_test::TestRequest::default()
            .insert_header(("x-csp-nonce", "from-client"))
            .to_http_request();

        assert_eq!(req.csp_nonce(), None);
        assert_eq!(actix_test::TestRequest::default().to_http_request().csp_nonce(), None);
    }

    #[test]
    fn test_draft_cookie_among_others() {
        let (state, _) = site_state(false, CspMode::ReportOnly);
        let guard = state.preview_guard();
        let token = guard.draft_token().unwrap();

        let req = actix_test::TestRequest::default()
            .insert_header((COOKIE, format!("theme=dark; __site_draft={token}; lang=en")))
            .to_http_request();
        let srv_req = actix_test::TestRequest::default()
            .insert_header((COOKIE, format!("__site_draft={token}")))
            .to_srv_request();

        assert!(req.is_draft_mode(guard));
        assert!(srv_req.is_draft_mode(guard));
    }

    #[test]
    fn test_draft_mode_cookie() {
        let (state, _) = site_state(false, CspMode::ReportOnly);
        let guard = state.preview_guard();
        let token = guard.draft_token().unwrap();

        let with_token = actix_test::TestRequest::default()
            .cookie(Cookie::new("__site_draft", token))
            .to_http_request();
        let forged = actix_test::TestRequest::default()
            .cookie(Cookie::new("__site_draft", SECRET))
            .to_http_request();
        let without = actix_test::TestRequest::default().to_http_request();

        assert!(with_token.is_draft_mode(guard));
        assert!(!forged.is_draft_mode(guard));
        assert!(!without.is_draft_mode(guard));
        assert!(!with_token.is_draft_mode(&PreviewAccessGuard::new(None)));
    }
}
