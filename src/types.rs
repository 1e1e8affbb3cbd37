//! Core data types for the Reviewdeck dashboard core
//!
//! This module defines the records exchanged with the persistence gateway
//! (tasks, reviews, profiles), the upsert payloads, and the derived UI
//! state types the controller exposes. Record shapes mirror the hosted
//! store's row shapes; fields the core does not rely on are simply not
//! mapped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The fixed soft-skill trait set scored independently per review.
///
/// Fixed at build time; the aggregator's overall score is the unweighted
/// mean across exactly this list.
pub const SOFT_SKILL_TRAITS: &[&str] = &[
    "communication",
    "teamwork",
    "problem_solving",
    "adaptability",
    "time_management",
];

/// Unique identifier for users (students, reviewers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new random task ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub Uuid);

impl ReviewId {
    /// Create a new random review ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reviewer role, a closed set
///
/// Rank determines which review is authoritative when a task has several
/// (executive outranks manager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Executive,
    Manager,
}

impl ReviewerRole {
    /// Priority for primary-review selection. Higher = more authoritative.
    pub fn rank(&self) -> u8 {
        match self {
            ReviewerRole::Executive => 2,
            ReviewerRole::Manager => 1,
        }
    }

    /// Label shown in the dashboard's "given by" column
    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewerRole::Executive => "Tutor",
            ReviewerRole::Manager => "Manager",
        }
    }
}

impl std::fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewerRole::Executive => write!(f, "executive"),
            ReviewerRole::Manager => write!(f, "manager"),
        }
    }
}

/// A review row as returned by the persistence gateway.
///
/// Trait scores arrive as an untyped JSON mapping; values that are present
/// but non-numeric are ignored by the aggregator, never an error. The
/// score range (0-10) is not validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub task_id: TaskId,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub improvements: Option<String>,
    #[serde(default)]
    pub trait_scores: Option<BTreeMap<String, Value>>,
    pub reviewer_id: UserId,
    pub reviewer_role: ReviewerRole,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Numeric value for one trait, if present and actually numeric
    pub fn trait_score(&self, trait_name: &str) -> Option<f64> {
        self.trait_scores
            .as_ref()
            .and_then(|scores| scores.get(trait_name))
            .and_then(Value::as_f64)
    }
}

/// A task row with its review relation (0..N reviews per task)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
}

/// A user profile row, loaded once per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub role: String,
    #[serde(default)]
    pub cohort: Option<String>,
}

/// Which conflict key an upsert resolves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewKind {
    /// One review per (student, task)
    TaskReview,
    /// One review per (student, reviewer), independent of tasks
    MentorReview,
}

impl ReviewKind {
    /// Conflict columns for the gateway's upsert, in the store's dialect
    pub fn conflict_columns(&self) -> &'static str {
        match self {
            ReviewKind::TaskReview => "student_id,task_id",
            ReviewKind::MentorReview => "student_id,reviewer_id",
        }
    }
}

/// Upsert payload for a review write
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    #[serde(skip)]
    pub kind: ReviewKind,
    pub student_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub reviewer_id: UserId,
    pub reviewer_role: ReviewerRole,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_scores: Option<BTreeMap<String, Value>>,
}

/// Dashboard tab selection, always exactly one of the four
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCategory {
    #[default]
    Score,
    Review,
    Improvements,
    SoftSkills,
}

impl ReviewCategory {
    /// Tab label shown in the dashboard header
    pub fn label(&self) -> &'static str {
        match self {
            ReviewCategory::Score => "Score",
            ReviewCategory::Review => "Review",
            ReviewCategory::Improvements => "Improvements",
            ReviewCategory::SoftSkills => "Soft Skills",
        }
    }
}
