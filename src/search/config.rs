//! Search engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search engine connection and index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search engine node
    #[serde(default = "default_url")]
    pub url: String,

    /// Name of the product index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Retries per request on connection failures and unavailable nodes
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Startup ping attempts before giving up on the engine
    #[serde(default = "default_ping_retries")]
    pub ping_retries: u32,

    /// Fixed delay between startup ping attempts in milliseconds
    #[serde(default = "default_ping_delay_ms")]
    pub ping_delay_ms: u64,
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ping_delay(&self) -> Duration {
        Duration::from_millis(self.ping_delay_ms)
    }

    /// Node list: the configured URL, plus an IPv4 loopback fallback when it
    /// names `localhost` (which may resolve to IPv6 first).
    pub fn nodes(&self) -> Vec<String> {
        let fallback = default_url();
        let primary = self.url.trim_end_matches('/').to_string();
        let mut nodes = vec![primary.clone()];

        match url::Url::parse(&primary) {
            Ok(parsed) if parsed.host_str() == Some("localhost") => {
                let port = parsed.port().unwrap_or(9200);
                nodes.push(format!("{}://127.0.0.1:{}", parsed.scheme(), port));
            }
            Ok(_) => {}
            Err(_) => nodes.push(fallback),
        }

        nodes.dedup();
        nodes
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index_name: default_index_name(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            ping_retries: default_ping_retries(),
            ping_delay_ms: default_ping_delay_ms(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:9200".to_string()
}

fn default_index_name() -> String {
    "products_v1".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_ping_retries() -> u32 {
    15
}

fn default_ping_delay_ms() -> u64 {
    2000
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn ping_retries(mut self, attempts: u32) -> Self {
        self.config.ping_retries = attempts;
        self
    }

    pub fn ping_delay_ms(mut self, delay: u64) -> Self {
        self.config.ping_delay_ms = delay;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
