//! Persistence gateway for the review dashboard
//!
//! A narrow call contract over the hosted relational store: equality
//! filters, one nested-relation select, and upsert-with-conflict-key.
//! Read failures surface as `Query` and are recovered by callers; write
//! failures surface as `Write` and propagate so the initiating flow can
//! report them. An absent row on a single-row fetch is `Ok(None)`.

pub mod http;

use crate::error::Result;
use crate::types::{ProfileRecord, ReviewDraft, ReviewRecord, TaskId, TaskRecord, UserId};
use async_trait::async_trait;

/// Gateway trait defining all required store operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Fetch one user profile; absent row is a valid `None`
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>>;

    /// Fetch all tasks assigned to a student with their review relation
    /// (left-outer: tasks without reviews come back with an empty list)
    async fn fetch_tasks_with_reviews(&self, student_id: UserId) -> Result<Vec<TaskRecord>>;

    /// Fetch the review for one task; absent row is a valid `None`
    async fn fetch_single_review(&self, task_id: TaskId) -> Result<Option<ReviewRecord>>;

    /// Insert or update a review, resolving conflicts on the draft's key
    async fn upsert_review(&self, draft: &ReviewDraft) -> Result<ReviewRecord>;
}
