//! Reviewdeck - Review Dashboard Data Core
//!
//! The data and view-state core of a student task-review dashboard:
//! - Typed gateway to the hosted relational store (tasks, reviews, profiles)
//! - Row-level change feed with an SSE bridge to the hosted stream
//! - Pure aggregation of per-trait soft-skill scores and display rows
//! - Event-loop view-state controller with a race-guarded refresh cycle
//!
//! # Architecture
//!
//! The crate is organized into layers:
//! - **Types**: record shapes and derived UI state (TaskRecord, ReviewRecord, ...)
//! - **Gateway**: the persistence call contract and its HTTP implementation
//! - **Feed**: the change-notification hub and remote bridge
//! - **Aggregate / Controller**: the dashboard core proper
//! - **Session / Assist**: identity snapshot provider and chatbot helper
//!
//! # Example
//!
//! ```ignore
//! use reviewdeck::{spawn_dashboard, ChangeFeed, HttpReviewStore, HttpStoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(HttpReviewStore::new(HttpStoreConfig::new(
//!         "https://db.example.com/rest/v1",
//!         "service-key",
//!     )));
//!     let feed = ChangeFeed::default();
//!
//!     let dashboard = spawn_dashboard(store, &feed, "reviews");
//!     dashboard.set_identity(Some(student_id));
//!
//!     let mut models = dashboard.subscribe_model();
//!     while models.changed().await.is_ok() {
//!         render(&models.borrow());
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod assist;
pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use aggregate::{aggregate_traits, primary_review, DashboardRow, SoftSkillReport, TraitAggregate};
pub use assist::{AssistClient, AssistConfig};
pub use config::ReviewdeckConfig;
pub use controller::{
    spawn_dashboard, DashboardController, DashboardEvent, DashboardHandle, DashboardModel,
    DashboardPhase, NO_TASKS_PLACEHOLDER,
};
pub use error::{ReviewdeckError, Result};
pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, EventFilter, FeedSubscription};
pub use gateway::{http::HttpReviewStore, http::HttpStoreConfig, ReviewStore};
pub use session::{SessionContext, SessionProvider};
pub use types::{
    ProfileRecord, ReviewCategory, ReviewDraft, ReviewId, ReviewKind, ReviewRecord, ReviewerRole,
    TaskId, TaskRecord, UserId, SOFT_SKILL_TRAITS,
};
