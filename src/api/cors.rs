//! Cross-origin policy for the public API.
//!
//! Development allows the configured dev origins only. Production allows an
//! explicit origin set plus wildcard subdomain patterns such as
//! `https://*.vercel.app`. Credentials are always allowed, so the allow-list
//! can never be `*`.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header, request::Parts};
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    exact: Vec<String>,
    patterns: Vec<Regex>,
}

impl OriginPolicy {
    pub fn for_server(server: &ServerConfig) -> Result<Self> {
        let exact = server
            .active_origins()
            .iter()
            .map(|origin| {
                let origin = normalize(origin);
                if origin == "*" {
                    anyhow::bail!("A bare '*' origin cannot be combined with credentials");
                }
                HeaderValue::from_str(&origin)
                    .with_context(|| format!("Invalid CORS origin '{origin}'"))?;
                Ok(origin)
            })
            .collect::<Result<Vec<_>>>()?;

        let patterns = server
            .active_origin_patterns()
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { exact, patterns })
    }

    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        let origin = normalize(origin);
        self.exact.iter().any(|allowed| allowed.eq_ignore_ascii_case(&origin))
            || self.patterns.iter().any(|p| p.is_match(&origin))
    }

    #[must_use]
    pub fn into_layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin.to_str().is_ok_and(|o| self.allows(o))
                },
            ))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// `scheme://*.domain` matches one or more DNS labels in place of `*`.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let pattern = normalize(pattern);
    let (prefix, suffix) = pattern
        .split_once('*')
        .with_context(|| format!("Origin pattern '{pattern}' has no '*'"))?;

    if suffix.contains('*') {
        anyhow::bail!("Origin pattern '{pattern}' may contain only one '*'");
    }
    if !prefix.ends_with("://") || !suffix.starts_with('.') {
        anyhow::bail!("Origin pattern '{pattern}' must look like scheme://*.domain");
    }

    let label = "[a-z0-9]([a-z0-9-]*[a-z0-9])?";
    let expr = format!(
        "(?i)^{}{label}(\\.{label})*{}$",
        regex::escape(prefix),
        regex::escape(suffix)
    );

    Regex::new(&expr).with_context(|| format!("Invalid origin pattern '{pattern}'"))
}
