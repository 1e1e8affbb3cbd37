//! HTTP gateway implementation
//!
//! Speaks the hosted store's PostgREST-style REST dialect: equality
//! filters as `column=eq.value` query parameters, nested-relation select
//! as `select=*,reviews(*)`, and upsert via `POST` with `on_conflict`
//! columns plus a merge-duplicates `Prefer` header. The `apikey` and
//! bearer headers ride on every request.

use crate::error::{ReviewdeckError, Result};
use crate::gateway::ReviewStore;
use crate::types::{ProfileRecord, ReviewDraft, ReviewRecord, TaskId, TaskRecord, UserId};
use async_trait::async_trait;
use tracing::debug;

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// REST root, e.g. `https://db.example.com/rest/v1`
    pub base_url: String,
    /// API key sent as `apikey` and bearer token
    pub api_key: String,
    pub tasks_table: String,
    pub reviews_table: String,
    pub profiles_table: String,
}

impl HttpStoreConfig {
    /// Config with the standard table names
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            tasks_table: "tasks".to_string(),
            reviews_table: "reviews".to_string(),
            profiles_table: "profiles".to_string(),
        }
    }
}

/// Review store over the hosted REST interface
pub struct HttpReviewStore {
    config: HttpStoreConfig,
    client: reqwest::Client,
}

impl HttpReviewStore {
    /// Create a new store client
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    fn get(&self, table: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Run a filtered select and decode the row set.
    ///
    /// Any transport or non-success outcome maps to `Query`; the read
    /// paths upstream recover from it.
    async fn select_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .get(table)
            .query(query)
            .send()
            .await
            .map_err(|e| ReviewdeckError::Query(format!("{} select failed: {}", table, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewdeckError::Query(format!(
                "{} select returned {}",
                table, status
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| ReviewdeckError::Query(format!("{} select decode failed: {}", table, e)))
    }
}

#[async_trait]
impl ReviewStore for HttpReviewStore {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>> {
        let rows: Vec<ProfileRecord> = self
            .select_rows(
                &self.config.profiles_table,
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_tasks_with_reviews(&self, student_id: UserId) -> Result<Vec<TaskRecord>> {
        debug!(student = %student_id, "fetching tasks with reviews");
        self.select_rows(
            &self.config.tasks_table,
            &[
                ("select", "*,reviews(*)".to_string()),
                ("assigned_to", format!("eq.{}", student_id)),
            ],
        )
        .await
    }

    async fn fetch_single_review(&self, task_id: TaskId) -> Result<Option<ReviewRecord>> {
        let rows: Vec<ReviewRecord> = self
            .select_rows(
                &self.config.reviews_table,
                &[
                    ("select", "*".to_string()),
                    ("task_id", format!("eq.{}", task_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        // Absent row is a distinguished non-error outcome
        Ok(rows.into_iter().next())
    }

    async fn upsert_review(&self, draft: &ReviewDraft) -> Result<ReviewRecord> {
        let response = self
            .client
            .post(self.table_url(&self.config.reviews_table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query(&[("on_conflict", draft.kind.conflict_columns())])
            .json(draft)
            .send()
            .await
            .map_err(|e| ReviewdeckError::Write(format!("review upsert failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewdeckError::Write(format!(
                "review upsert returned {}: {}",
                status, body
            )));
        }

        let rows: Vec<ReviewRecord> = response
            .json()
            .await
            .map_err(|e| ReviewdeckError::Write(format!("review upsert decode failed: {}", e)))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ReviewdeckError::Write("review upsert returned no row".to_string()))
    }
}
