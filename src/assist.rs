//! Chatbot "smart buttons" helper
//!
//! Thin client for the assist service: fetch suggested quick-reply buttons
//! for the current route, and report clicks back. Neither call is allowed
//! to fail the view: suggestions degrade to an empty mapping and click
//! tracking is fire-and-forget, so a dead assist service never breaks a
//! dashboard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the assist client
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// Assist service root, e.g. `https://assist.example.com`
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    user_id: &'a str,
    route: &'a str,
    context: &'a str,
    role: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    buttons: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct TrackRequest<'a> {
    user_id: &'a str,
    button_id: &'a str,
    route: &'a str,
}

/// Client for the assist service
pub struct AssistClient {
    config: AssistConfig,
    client: reqwest::Client,
}

impl AssistClient {
    /// Create a new assist client
    pub fn new(config: AssistConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Fetch suggested buttons for a route.
    ///
    /// Total: any transport or decode failure is logged and yields an
    /// empty mapping.
    pub async fn suggest_buttons(
        &self,
        user_id: &str,
        route: &str,
        context: &str,
        role: &str,
    ) -> BTreeMap<String, String> {
        let url = format!(
            "{}/slm/suggest-buttons",
            self.config.base_url.trim_end_matches('/')
        );
        let request = SuggestRequest {
            user_id,
            route,
            context,
            role,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout())
            .json(&request)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "suggest-buttons returned an error status");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("suggest-buttons request failed: {}", e);
                return BTreeMap::new();
            }
        };

        match response.json::<SuggestResponse>().await {
            Ok(parsed) => parsed.buttons,
            Err(e) => {
                warn!("suggest-buttons response malformed: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Report a button click. Fire-and-forget: failures are logged and
    /// swallowed.
    pub async fn track_button_click(&self, user_id: &str, button_id: &str, route: &str) {
        let url = format!(
            "{}/slm/track-button-click",
            self.config.base_url.trim_end_matches('/')
        );
        let request = TrackRequest {
            user_id,
            button_id,
            route,
        };

        match self
            .client
            .post(&url)
            .timeout(self.timeout())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => {
                debug!(status = %response.status(), "button click tracked");
            }
            Err(e) => {
                debug!("button click tracking dropped: {}", e);
            }
        }
    }
}
