use actix_site_guard::prelude::*;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use std::io;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

async fn index(req: HttpRequest, state: web::Data<SiteState>) -> HttpResponse {
    let nonce = req.csp_nonce().unwrap_or_default();
    let draft = req.is_draft_mode(state.preview_guard());

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!DOCTYPE html><html><head><script nonce=\"{nonce}\">window.__DRAFT__ = {draft};</script></head>\
             <body><h1>{}</h1></body></html>",
            state.config().origin()
        ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let env = EnvVars::from_process();
    let state = SiteState::from_env(&env, EventLogger::new()).map_err(|e| {
        log::error!("Refusing to start: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let bind_addr = env.get("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR).to_owned();
    log::info!(
        "Serving {} on {} (csp mode: {})",
        state.config().origin(),
        bind_addr,
        state.config().csp_mode()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(CspMiddleware::new(state.clone()))
            .wrap(CspReportingMiddleware::new(state.clone()))
            .configure(configure_site(state.clone()))
            .default_service(web::to(index))
    })
    .bind(bind_addr)?
    .run()
    .await
}
