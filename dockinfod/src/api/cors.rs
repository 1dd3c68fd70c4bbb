use axum::http::{HeaderValue, Method};
use regex::Regex;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Origin allow-list. Entries may use `*` as a wildcard; an entry with a
/// scheme also matches on the host part alone.
#[derive(Debug, Clone)]
pub struct OriginMatcher {
    exact: Vec<String>,
    patterns: Vec<OriginPattern>,
}

#[derive(Debug, Clone)]
struct OriginPattern {
    full: Regex,
    host: Option<Regex>,
}

fn wildcard(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    match Regex::new(&format!("^{}$", escaped)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Ignoring CORS origin {}: {}", pattern, e);
            None
        }
    }
}

impl OriginMatcher {
    pub fn new(origins: &[String]) -> Self {
        let mut exact = Vec::new();
        let mut patterns = Vec::new();

        for origin in origins {
            if !origin.contains('*') {
                exact.push(origin.clone());
                continue;
            }
            let Some(full) = wildcard(origin) else {
                continue;
            };
            let host = origin
                .split_once("://")
                .and_then(|(_, host)| wildcard(host));
            patterns.push(OriginPattern { full, host });
        }

        Self { exact, patterns }
    }

    pub fn allows(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        if self.exact.iter().any(|o| o == origin) {
            return true;
        }

        let origin_host = origin.split_once("://").map(|(_, host)| host);
        self.patterns.iter().any(|p| {
            p.full.is_match(origin)
                || matches!((&p.host, origin_host), (Some(host), Some(o)) if host.is_match(o))
        })
    }

    pub fn layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts| {
                    origin.to_str().map(|o| self.allows(o)).unwrap_or(false)
                },
            ))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}
