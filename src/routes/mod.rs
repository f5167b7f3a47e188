pub mod draft;

pub use draft::{disable_draft, enable_draft, DisableDraftQuery, EnableDraftQuery};

use crate::constants::{DRAFT_DISABLE_PATH, DRAFT_ENABLE_PATH};
use crate::state::SiteState;
use actix_web::web;

/// Registers the shared state and the draft-mode endpoints.
pub fn configure_site(state: SiteState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state))
            .route(DRAFT_ENABLE_PATH, web::get().to(enable_draft))
            .route(DRAFT_DISABLE_PATH, web::get().to(disable_draft));
    }
}
