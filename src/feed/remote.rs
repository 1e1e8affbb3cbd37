//! Remote change-feed bridge
//!
//! Subscribes to the hosted store's change stream over Server-Sent Events
//! and republishes each change into the in-process [`ChangeFeed`] hub, so
//! dashboard controllers only ever deal with the hub.
//!
//! # Reconnection
//!
//! Uses exponential backoff for reconnection:
//! - Base: 1 second (configurable)
//! - Doubles per failure, capped at the configured maximum
//! - Resets on successful connection

use crate::error::{ReviewdeckError, Result};
use crate::feed::{ChangeEvent, ChangeFeed, ChangeKind};
use eventsource_client as es;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Remote feed configuration
#[derive(Debug, Clone)]
pub struct RemoteFeedConfig {
    /// SSE stream URL
    pub stream_url: String,
    /// API key sent as the `apikey` header, when the stream requires one
    pub api_key: Option<String>,
    /// Initial reconnection delay
    pub reconnect_delay_secs: u64,
    /// Maximum reconnection delay
    pub max_reconnect_delay_secs: u64,
}

impl Default for RemoteFeedConfig {
    fn default() -> Self {
        Self {
            stream_url: "http://localhost:3000/changes/stream".to_string(),
            api_key: None,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 60,
        }
    }
}

/// Wire shape of one change notification on the stream
#[derive(Debug, Deserialize)]
struct WireChange {
    table: String,
    #[serde(rename = "type")]
    kind: ChangeKind,
    #[serde(default)]
    row_id: Option<String>,
}

/// SSE subscriber that pumps the remote stream into the local hub
pub struct RemoteFeed {
    config: RemoteFeedConfig,
    hub: ChangeFeed,
    shutdown_rx: broadcast::Receiver<()>,
}

impl RemoteFeed {
    /// Create a new remote feed bridge
    pub fn new(
        config: RemoteFeedConfig,
        hub: ChangeFeed,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            hub,
            shutdown_rx,
        }
    }

    /// Run the bridge until the shutdown signal fires.
    ///
    /// Reconnects on failure with exponential backoff.
    pub async fn run(mut self) {
        info!("remote feed starting: {}", self.config.stream_url);

        let mut reconnect_delay = self.config.reconnect_delay_secs;

        loop {
            if self.shutdown_rx.try_recv().is_ok() {
                info!("remote feed: shutdown signal received");
                break;
            }

            let builder = match es::ClientBuilder::for_url(&self.config.stream_url) {
                Ok(builder) => builder,
                Err(e) => {
                    error!("remote feed: failed to build client: {}", e);
                    tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
                    reconnect_delay =
                        (reconnect_delay * 2).min(self.config.max_reconnect_delay_secs);
                    continue;
                }
            };

            let builder = match &self.config.api_key {
                Some(key) => match builder.header("apikey", key) {
                    Ok(builder) => builder,
                    Err(e) => {
                        error!("remote feed: invalid apikey header: {}", e);
                        break;
                    }
                },
                None => builder,
            };

            let reconnect_opts = es::ReconnectOptions::reconnect(true)
                .retry_initial(false) // reconnection is handled here
                .delay(Duration::from_secs(reconnect_delay))
                .build();
            let mut client = builder.reconnect(reconnect_opts).build();

            match self.stream_changes(&mut client).await {
                Ok(_) => {
                    info!("remote feed: stream ended gracefully");
                    reconnect_delay = self.config.reconnect_delay_secs;
                }
                Err(e) => {
                    warn!("remote feed: stream error: {}", e);
                    reconnect_delay =
                        (reconnect_delay * 2).min(self.config.max_reconnect_delay_secs);
                    debug!("remote feed: reconnecting in {} seconds", reconnect_delay);
                    tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
                }
            }

            if self.shutdown_rx.try_recv().is_ok() {
                info!("remote feed: shutdown signal received after error");
                break;
            }
        }

        info!("remote feed stopped");
    }

    /// Stream changes from one SSE connection
    async fn stream_changes(&mut self, client: &mut impl es::Client) -> Result<()> {
        use tokio_stream::StreamExt;

        let mut stream = client.stream();

        loop {
            if self.shutdown_rx.try_recv().is_ok() {
                debug!("remote feed: shutdown during streaming");
                return Ok(());
            }

            // Wake up periodically so shutdown is noticed even on an idle stream
            let event_result =
                tokio::time::timeout(Duration::from_secs(5), stream.next()).await;

            match event_result {
                Ok(Some(Ok(es::SSE::Connected(_)))) => {
                    debug!("remote feed: connected to change stream");
                }
                Ok(Some(Ok(es::SSE::Event(event)))) => {
                    self.publish_wire_event(&event.data);
                }
                Ok(Some(Ok(es::SSE::Comment(_)))) => {
                    debug!("remote feed: keepalive comment");
                }
                Ok(Some(Err(e))) => {
                    return Err(ReviewdeckError::Feed(format!("SSE stream error: {}", e)));
                }
                Ok(None) => {
                    return Ok(());
                }
                Err(_timeout) => {
                    continue;
                }
            }
        }
    }

    /// Parse one wire payload and publish it into the hub.
    ///
    /// Malformed payloads are logged and dropped; the coarse invalidation
    /// policy loses nothing it relies on.
    fn publish_wire_event(&self, data: &str) {
        match serde_json::from_str::<WireChange>(data) {
            Ok(change) => {
                debug!(table = %change.table, "remote feed: change received");
                self.hub
                    .publish(ChangeEvent::new(change.table, change.kind, change.row_id));
            }
            Err(e) => {
                warn!("remote feed: unparseable change payload: {}", e);
            }
        }
    }
}
