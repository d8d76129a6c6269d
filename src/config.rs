use std::env;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;

/// Backend address used when the page is served from a development host.
pub const LOCAL_API_URL: &str = "http://localhost:8000";

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub preset_cache_ttl: Duration,
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            preset_cache_ttl: Duration::from_secs(600),
            request_timeout: None,
        }
    }

    /// Resolve the backend for the host the page was loaded from.
    pub fn for_host(page_host: &str, deployed_url: &str) -> Self {
        Self::new(resolve_base_url(page_host, deployed_url))
    }

    /// Reads `SCENE_PAGE_HOST`, `SCENE_API_URL`, `SCENE_PRESET_CACHE_TTL_SECS`
    /// and `SCENE_API_TIMEOUT_SECS`, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let page_host = env::var("SCENE_PAGE_HOST").unwrap_or_else(|_| "localhost".to_string());
        let deployed_url = env::var("SCENE_API_URL").unwrap_or_else(|_| {
            if !is_local_host(&page_host) {
                warn!("SCENE_API_URL not set for host '{}', falling back to {}", page_host, LOCAL_API_URL);
            }
            LOCAL_API_URL.to_string()
        });

        let mut config = Self::for_host(&page_host, &deployed_url);

        if let Ok(raw) = env::var("SCENE_PRESET_CACHE_TTL_SECS") {
            let secs: u64 = raw.parse().with_context(|| format!("SCENE_PRESET_CACHE_TTL_SECS must be a number, got '{raw}'"))?;
            config.preset_cache_ttl = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("SCENE_API_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().with_context(|| format!("SCENE_API_TIMEOUT_SECS must be a number, got '{raw}'"))?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

pub fn is_local_host(host: &str) -> bool {
    let host = host.trim();
    host.is_empty() || LOCAL_HOSTS.contains(&host)
}

/// Development hosts talk to the local backend; anything else goes to the deployed URL.
pub fn resolve_base_url(page_host: &str, deployed_url: &str) -> String {
    let url = if is_local_host(page_host) { LOCAL_API_URL } else { deployed_url };
    url.trim_end_matches('/').to_string()
}
