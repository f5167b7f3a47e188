pub mod config;
pub mod env;
pub mod origin;
pub mod policy;
pub mod source;

pub use config::{RateLimitSettings, SiteConfig, SiteConfigBuilder};
pub use env::EnvVars;
pub use origin::{resolve_site_url_for_env, SiteOrigin};
pub use policy::{build_csp_header_value, CspMode, CspModeResolver, CspPolicy, CspPolicyBuilder, Directive};
pub use source::Source;
