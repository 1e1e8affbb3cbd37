//! Session context provider
//!
//! Loads a user profile once and exposes it as a read-only snapshot passed
//! by reference (`Arc`) to whatever needs it, with an explicit refresh
//! entry point instead of ambient mutable global state. The snapshot is
//! immutable; refresh builds a new one and swaps the pointer.

use crate::error::{ReviewdeckError, Result};
use crate::gateway::ReviewStore;
use crate::types::{ProfileRecord, UserId};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Read-only identity snapshot for one session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: UserId,
    pub profile: ProfileRecord,
    pub loaded_at: DateTime<Utc>,
}

/// Provider owning the current session snapshot
pub struct SessionProvider {
    store: Arc<dyn ReviewStore>,
    current: RwLock<Option<Arc<SessionContext>>>,
}

impl SessionProvider {
    /// Create a provider with no active session
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Load the profile for a user and make it the active session
    pub async fn load(&self, user_id: UserId) -> Result<Arc<SessionContext>> {
        let profile = self
            .store
            .fetch_profile(user_id)
            .await?
            .ok_or_else(|| ReviewdeckError::NotFound(format!("profile {}", user_id)))?;

        info!(user = %user_id, "session loaded");
        let context = Arc::new(SessionContext {
            user_id,
            profile,
            loaded_at: Utc::now(),
        });
        *self.current.write().expect("session lock poisoned") = Some(context.clone());
        Ok(context)
    }

    /// Current snapshot, if a session is active
    pub fn current(&self) -> Option<Arc<SessionContext>> {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// Re-fetch the active session's profile and swap in a fresh snapshot
    pub async fn refresh(&self) -> Result<Arc<SessionContext>> {
        let user_id = self
            .current()
            .map(|ctx| ctx.user_id)
            .ok_or_else(|| ReviewdeckError::Other("no active session to refresh".to_string()))?;
        debug!(user = %user_id, "refreshing session");
        self.load(user_id).await
    }

    /// Drop the active session
    pub fn clear(&self) {
        *self.current.write().expect("session lock poisoned") = None;
    }
}
