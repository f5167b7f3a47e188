use crate::constants::{ARTICLE_PATH_PREFIX, DRAFT_COOKIE};
use crate::state::SiteState;
use actix_web::{
    cookie::{Cookie, SameSite},
    http::header::{CACHE_CONTROL, LOCATION},
    web, HttpRequest, HttpResponse,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::{form_urlencoded, Url};

/// One path segment: everything that could end or escape the segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Bytes that may not appear raw in a `Location` header value.
const LOCATION_ESCAPE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

const RELATIVE_BASE: &str = "http://relative.invalid";

/// Query of `/api/draft/enable`. Parsing never fails: unknown keys are
/// ignored and the first occurrence of a repeated key wins.
#[derive(Debug, Default)]
pub struct EnableDraftQuery {
    pub secret: Option<String>,
    pub path: Option<String>,
    pub slug: Option<String>,
    pub draft_key: Option<String>,
    pub content_id: Option<String>,
}

impl EnableDraftQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "secret" => &mut parsed.secret,
                "path" => &mut parsed.path,
                "slug" => &mut parsed.slug,
                "draftKey" => &mut parsed.draft_key,
                "contentId" => &mut parsed.content_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }
}

/// Query of `/api/draft/disable`, parsed like [`EnableDraftQuery`].
#[derive(Debug, Default)]
pub struct DisableDraftQuery {
    pub path: Option<String>,
}

impl DisableDraftQuery {
    pub fn parse(query: &str) -> Self {
        let path = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "path")
            .map(|(_, value)| value.into_owned());
        Self { path }
    }
}

/// `GET /api/draft/enable`
pub async fn enable_draft(req: HttpRequest, state: web::Data<SiteState>) -> HttpResponse {
    let query = EnableDraftQuery::parse(req.query_string());
    let guard = state.preview_guard();
    let token = match guard.draft_token() {
        Some(token) if guard.is_valid_secret(query.secret.as_deref()) => token,
        _ => {
            state.stats().increment_preview_denied_count();
            log::info!("Draft mode request rejected");
            return HttpResponse::Unauthorized()
                .insert_header((CACHE_CONTROL, "no-store"))
                .finish();
        }
    };

    let normalizer = state.redirect_normalizer(&request_origin(&req));
    let target = normalizer.normalize(&requested_target(&query));
    let target = with_draft_params(
        target,
        query.draft_key.as_deref(),
        query.content_id.as_deref(),
    );

    state.stats().increment_preview_granted_count();

    let cookie = Cookie::build(DRAFT_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(state.config().is_production())
        .same_site(SameSite::Lax)
        .finish();

    redirect(&target).cookie(cookie).finish()
}

/// `GET /api/draft/disable`
pub async fn disable_draft(req: HttpRequest, state: web::Data<SiteState>) -> HttpResponse {
    let query = DisableDraftQuery::parse(req.query_string());
    let normalizer = state.redirect_normalizer(&request_origin(&req));
    let target = normalizer.normalize(query.path.as_deref().unwrap_or_default());

    let mut cookie = Cookie::build(DRAFT_COOKIE, "").path("/").finish();
    cookie.make_removal();

    redirect(&target).cookie(cookie).finish()
}

fn redirect(target: &str) -> actix_web::HttpResponseBuilder {
    let location = utf8_percent_encode(target, LOCATION_ESCAPE).to_string();
    let mut builder = HttpResponse::TemporaryRedirect();
    builder
        .insert_header((LOCATION, location))
        .insert_header((CACHE_CONTROL, "no-store"));
    builder
}

fn request_origin(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// `path` wins over `slug`; neither means the home page.
pub fn requested_target(query: &EnableDraftQuery) -> String {
    if let Some(path) = query.path.as_deref().filter(|p| !p.trim().is_empty()) {
        return path.to_owned();
    }

    match query.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => format!("{ARTICLE_PATH_PREFIX}{}", utf8_percent_encode(slug, SEGMENT)),
        None => "/".to_owned(),
    }
}

/// Appends `draftKey` / `contentId` to an already normalized relative path.
pub fn with_draft_params(
    target: String,
    draft_key: Option<&str>,
    content_id: Option<&str>,
) -> String {
    let params: Vec<(&str, &str)> = [("draftKey", draft_key), ("contentId", content_id)]
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
        .collect();
    if params.is_empty() {
        return target;
    }

    let Ok(mut url) = Url::parse(RELATIVE_BASE).and_then(|base| base.join(&target)) else {
        return target;
    };
    url.query_pairs_mut().extend_pairs(params);

    let mut relative = url.path().to_owned();
    if let Some(query) = url.query() {
        relative.push('?');
        relative.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        relative.push('#');
        relative.push_str(fragment);
    }

    if relative.starts_with("//") {
        return "/".to_owned();
    }
    relative
}
