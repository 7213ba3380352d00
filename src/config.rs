//! Runtime configuration.
//!
//! The backend base URL is resolved once at start, in priority order: the
//! `ANT_ARENA_BACKEND_URL` override, the stored preference, then a guess from
//! the public site origin.

use crate::storage::{load_preferences, resolve_preferences_path};
use std::{env, path::PathBuf, time::Duration};
use tracing::{info, warn};
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SITE_URL: &str = "http://localhost";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const BACKEND_DIR: &str = "jadwal-ant-arena";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub preferences_path: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub async fn load() -> Self {
        let preferences_path = resolve_preferences_path();
        let stored = load_preferences(&preferences_path).await.backend_url;
        let override_url = env::var("ANT_ARENA_BACKEND_URL").ok();
        let site = site_origin();

        let backend_url = resolve_backend_url(override_url.as_deref(), stored.as_deref(), &site);
        info!(backend_url = %backend_url, "resolved backend url");

        Self {
            port: try_load("PORT", DEFAULT_PORT),
            backend_url,
            preferences_path,
            request_timeout: Duration::from_secs(try_load(
                "ANT_ARENA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        }
    }
}

/// Picks the first non-blank candidate, falling back to the site-derived URL.
pub fn resolve_backend_url(override_url: Option<&str>, stored: Option<&str>, site: &Url) -> String {
    [override_url, stored]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(|candidate| candidate.trim_end_matches('/').to_string())
        .unwrap_or_else(|| infer_backend_url(site))
}

pub fn infer_backend_url(site: &Url) -> String {
    let host = site.host_str().unwrap_or("localhost");
    if host == "localhost" || host == "127.0.0.1" {
        format!("http://localhost/{BACKEND_DIR}")
    } else if host.contains(".local") {
        format!("http://{}", host.replace("ant-arena", BACKEND_DIR))
    } else {
        format!("{}://{host}/{BACKEND_DIR}", site.scheme())
    }
}

fn site_origin() -> Url {
    let raw = env::var("ANT_ARENA_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
    Url::parse(&raw).unwrap_or_else(|err| {
        warn!("invalid ANT_ARENA_SITE_URL {raw:?}: {err}, using {DEFAULT_SITE_URL}");
        Url::parse(DEFAULT_SITE_URL).expect("default site url is valid")
    })
}

fn try_load<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid {key} value {raw:?}, using default: {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn override_wins_over_stored_preference() {
        let url = resolve_backend_url(
            Some("https://api.example.com/arena/"),
            Some("http://stored.test"),
            &site("http://localhost"),
        );
        assert_eq!(url, "https://api.example.com/arena");
    }

    #[test]
    fn stored_preference_used_when_no_override() {
        let url = resolve_backend_url(Some("  "), Some("http://stored.test"), &site("http://localhost"));
        assert_eq!(url, "http://stored.test");
    }

    #[test]
    fn localhost_points_at_local_backend() {
        assert_eq!(
            infer_backend_url(&site("http://127.0.0.1:5500/index.html")),
            "http://localhost/jadwal-ant-arena"
        );
    }

    #[test]
    fn dot_local_hosts_swap_in_backend_name() {
        assert_eq!(
            infer_backend_url(&site("http://ant-arena.local")),
            "http://jadwal-ant-arena.local"
        );
    }

    #[test]
    fn production_hosts_keep_scheme() {
        assert_eq!(
            resolve_backend_url(None, None, &site("https://antarena.id/")),
            "https://antarena.id/jadwal-ant-arena"
        );
    }
}
