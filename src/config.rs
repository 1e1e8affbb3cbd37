//! Configuration for the Reviewdeck core
//!
//! Layered loading: an optional `reviewdeck.toml` next to the process,
//! overridden by `REVIEWDECK_*` environment variables (separator `__`,
//! e.g. `REVIEWDECK_GATEWAY__API_KEY`). Every field has a default so a
//! bare environment still produces a usable config for local development.

use crate::error::Result;
use serde::Deserialize;

/// Persistence gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// REST root of the hosted store
    pub base_url: String,
    /// API key sent as `apikey` and bearer token
    pub api_key: String,
    pub tasks_table: String,
    pub reviews_table: String,
    pub profiles_table: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/rest/v1".to_string(),
            api_key: String::new(),
            tasks_table: "tasks".to_string(),
            reviews_table: "reviews".to_string(),
            profiles_table: "profiles".to_string(),
        }
    }
}

/// Change-feed settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// SSE change-stream URL
    pub stream_url: String,
    /// Hub buffer capacity
    pub buffer: usize,
    pub reconnect_delay_secs: u64,
    pub max_reconnect_delay_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            stream_url: "http://localhost:54321/changes/stream".to_string(),
            buffer: 256,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 60,
        }
    }
}

/// Assist-service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewdeckConfig {
    pub gateway: GatewaySettings,
    pub feed: FeedSettings,
    pub assist: AssistSettings,
}

impl ReviewdeckConfig {
    /// Load from `reviewdeck.toml` (optional) and `REVIEWDECK_*` overrides
    pub fn load() -> Result<Self> {
        Self::load_from("reviewdeck")
    }

    /// Load from a named config file base (without extension) plus
    /// environment overrides
    pub fn load_from(file_base: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file_base).required(false))
            .add_source(
                config::Environment::with_prefix("REVIEWDECK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
