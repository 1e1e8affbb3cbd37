//! Change feed: row-level change notifications
//!
//! An in-process pub/sub hub keyed by table name and event kind. Views
//! subscribe with a table and a filter; the subscription's drop is the
//! unsubscribe, so release happens exactly once on every exit path.
//! Delivery is at-least-once, best-effort: a receiver that falls behind
//! logs the gap and keeps going, which the coarse invalidate-and-refetch
//! policy tolerates.

pub mod remote;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Row change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Subscription filter over change kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Wildcard: any change kind
    #[default]
    All,
    /// A single change kind
    Only(ChangeKind),
}

impl EventFilter {
    fn matches(&self, kind: ChangeKind) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(wanted) => *wanted == kind,
        }
    }
}

/// One row-level change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event ID (for deduplication)
    pub id: String,
    /// Table the change happened in
    pub table: String,
    /// What happened
    pub kind: ChangeKind,
    /// Changed row, when the source carries it. The dashboard's coarse
    /// policy does not rely on it; it is the hook for row-scoped
    /// invalidation later.
    #[serde(default)]
    pub row_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new change event
    pub fn new(table: impl Into<String>, kind: ChangeKind, row_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            table: table.into(),
            kind,
            row_id,
            timestamp: Utc::now(),
        }
    }
}

/// Change-feed hub using a tokio broadcast channel
///
/// Shared across all view instances in the process; clones publish and
/// subscribe against the same channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a new hub with the given buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change to all live subscriptions.
    ///
    /// Returns the number of receivers the event reached; 0 with no
    /// subscribers is a valid outcome, not an error.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to changes for one table
    pub fn subscribe(&self, table: impl Into<String>, filter: EventFilter) -> FeedSubscription {
        FeedSubscription {
            rx: self.tx.subscribe(),
            table: table.into(),
            filter,
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One active subscription; dropping it is the unsubscribe
pub struct FeedSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
    table: String,
    filter: EventFilter,
}

impl FeedSubscription {
    /// Next matching change, skipping other tables and filtered kinds.
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.table == self.table && self.filter.matches(event.kind) {
                        return Some(event);
                    }
                    debug!(table = %event.table, "change event skipped by subscription filter");
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, table = %self.table, "change feed subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Table this subscription watches
    pub fn table(&self) -> &str {
        &self.table
    }
}
