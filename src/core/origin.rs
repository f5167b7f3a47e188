//! Canonical site origin resolution.
//!
//! Production ("strict") mode never silently degrades: a missing, invalid or
//! loopback origin aborts startup. The loopback override exists for running a
//! production build locally and is refused on CI and managed platforms.

use crate::constants::{
    ENV_ALLOW_LOCALHOST, ENV_CI, ENV_DEPLOYMENT_HOST, ENV_DEPLOYMENT_PRODUCTION_HOST,
    ENV_LEGACY_SITE_URL, ENV_NODE_ENV, ENV_PUBLIC_SITE_URL, ENV_VERCEL, LOCAL_FALLBACK_ORIGIN,
};
use crate::core::env::EnvVars;
use crate::error::ConfigError;
use crate::logging::{EventLogger, EVENT_LOCALHOST_OVERRIDE};
use serde::Serialize;
use std::fmt;
use url::{Host, Url};

/// Absolute site URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin {
    url: Url,
    serialized: String,
}

impl SiteOrigin {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidSiteUrl(format!("{raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err(ConfigError::InvalidSiteUrl(raw.to_owned()));
        }

        let serialized = url.as_str().trim_end_matches('/').to_owned();
        Ok(Self { url, serialized })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `scheme://host[:port]`, the form compared against redirect targets.
    #[inline]
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn is_loopback(&self) -> bool {
        match self.url.host() {
            Some(Host::Domain(domain)) => {
                let domain = domain.to_ascii_lowercase();
                domain == "localhost" || domain.ends_with(".localhost")
            }
            Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_unspecified(),
            Some(Host::Ipv6(ip)) => ip.is_loopback() || ip.is_unspecified(),
            None => false,
        }
    }
}

impl fmt::Display for SiteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocalhostOverrideWarning<'a> {
    site_url: &'a str,
    flag: &'static str,
}

/// Whether production strictness applies to this environment.
#[inline]
pub fn is_strict_env(env: &EnvVars) -> bool {
    env.get(ENV_NODE_ENV) == Some("production")
}

pub fn resolve_site_url_for_env(
    env: &EnvVars,
    logger: &EventLogger,
) -> Result<SiteOrigin, ConfigError> {
    if env.contains(ENV_LEGACY_SITE_URL) {
        return Err(ConfigError::LegacyKey(ENV_LEGACY_SITE_URL.to_owned()));
    }

    let allow_loopback = env.flag(ENV_ALLOW_LOCALHOST);
    if allow_loopback {
        if env.flag(ENV_CI) {
            return Err(ConfigError::UnsafeLoopbackOverride(ENV_CI.to_owned()));
        }
        if env.flag(ENV_VERCEL) {
            return Err(ConfigError::UnsafeLoopbackOverride(ENV_VERCEL.to_owned()));
        }
    }

    let strict = is_strict_env(env);

    let origin = if let Some(explicit) = env.get(ENV_PUBLIC_SITE_URL) {
        SiteOrigin::parse(explicit)?
    } else if let Some(host) = deployment_host(env) {
        SiteOrigin::parse(&format!("https://{host}"))?
    } else if strict {
        return Err(ConfigError::MissingSiteUrl);
    } else {
        SiteOrigin::parse(LOCAL_FALLBACK_ORIGIN)?
    };

    if strict && origin.is_loopback() {
        if !allow_loopback {
            return Err(ConfigError::LoopbackSiteUrl(origin.as_str().to_owned()));
        }
        logger.warn(
            EVENT_LOCALHOST_OVERRIDE,
            &LocalhostOverrideWarning {
                site_url: origin.as_str(),
                flag: ENV_ALLOW_LOCALHOST,
            },
        );
    }

    Ok(origin)
}

fn deployment_host(env: &EnvVars) -> Option<&str> {
    env.get(ENV_DEPLOYMENT_PRODUCTION_HOST)
        .or_else(|| env.get(ENV_DEPLOYMENT_HOST))
        .map(|host| {
            host.trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/')
        })
        .filter(|host| !host.is_empty())
}
