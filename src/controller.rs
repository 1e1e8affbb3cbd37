//! View-state controller for the review dashboard
//!
//! Owns the reactive load/refresh cycle: one fetch per trigger (identity
//! change or change-feed notification), an orthogonal tab-selection axis,
//! and the derived render model. All state transitions run on a single
//! event loop consuming one queue, so visibility ordering is program
//! order; fetches run as spawned tasks that report back through the same
//! queue.
//!
//! Fetch completions arrive in completion order, not issue order. Each
//! fetch is tagged at issue time with a monotonically increasing sequence
//! number and the identity it was issued for; a completion is applied only
//! if the identity still matches and its sequence number is the highest
//! applied so far. Superseded results are logged and discarded, which is
//! the last-writer-wins-by-trigger-order guarantee the refresh policy
//! needs.

use crate::aggregate::{self, DashboardRow, SoftSkillReport};
use crate::error::Result;
use crate::feed::{ChangeEvent, ChangeFeed, EventFilter};
use crate::gateway::ReviewStore;
use crate::types::{ReviewCategory, TaskRecord, UserId, SOFT_SKILL_TRAITS};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Placeholder rendered when a student has no tasks yet
pub const NO_TASKS_PLACEHOLDER: &str = "No tasks assigned yet";

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardPhase {
    /// No identity yet
    #[default]
    Idle,
    /// Fetch in flight
    Loading,
    /// Data present, awaiting selection or feed event
    Ready,
}

/// Everything the controller reacts to
#[derive(Debug)]
pub enum DashboardEvent {
    /// Identity became available, changed, or went away
    IdentityChanged(Option<UserId>),
    /// Row-level change in the reviews table: coarse invalidate-and-refetch
    FeedChanged(ChangeEvent),
    /// Tab selection: pure state update, no network effect
    CategorySelected(ReviewCategory),
    /// A spawned fetch finished
    FetchCompleted {
        seq: u64,
        student: UserId,
        outcome: Result<Vec<TaskRecord>>,
    },
}

/// Derived render model handed to the presentation layer
#[derive(Debug, Clone, Default)]
pub struct DashboardModel {
    pub phase: DashboardPhase,
    pub category: ReviewCategory,
    pub rows: Vec<DashboardRow>,
    pub soft_skills: SoftSkillReport,
}

impl DashboardModel {
    /// Placeholder text, present exactly when Ready with nothing to show
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.phase == DashboardPhase::Ready && self.rows.is_empty() {
            Some(NO_TASKS_PLACEHOLDER)
        } else {
            None
        }
    }
}

/// The dashboard view-state machine
///
/// Exclusively owns the in-memory task list and tab selection for the
/// lifetime of the mounted view; both are discarded with it.
pub struct DashboardController {
    store: Arc<dyn ReviewStore>,
    events_tx: mpsc::UnboundedSender<DashboardEvent>,
    phase: DashboardPhase,
    student: Option<UserId>,
    tasks: Vec<TaskRecord>,
    category: ReviewCategory,
    issued_seq: u64,
    applied_seq: u64,
}

impl DashboardController {
    /// Create a controller that reports fetch completions to `events_tx`
    pub fn new(store: Arc<dyn ReviewStore>, events_tx: mpsc::UnboundedSender<DashboardEvent>) -> Self {
        Self {
            store,
            events_tx,
            phase: DashboardPhase::Idle,
            student: None,
            tasks: Vec::new(),
            category: ReviewCategory::default(),
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    /// Apply one event to the state machine
    pub fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::IdentityChanged(student) => {
                self.student = student;
                match student {
                    Some(student) => {
                        self.phase = DashboardPhase::Loading;
                        self.begin_fetch(student);
                    }
                    None => {
                        self.phase = DashboardPhase::Idle;
                        self.tasks.clear();
                    }
                }
            }
            DashboardEvent::FeedChanged(change) => {
                if let Some(student) = self.student {
                    debug!(table = %change.table, "change feed notification, refetching");
                    self.phase = DashboardPhase::Loading;
                    self.begin_fetch(student);
                }
            }
            DashboardEvent::CategorySelected(category) => {
                self.category = category;
            }
            DashboardEvent::FetchCompleted {
                seq,
                student,
                outcome,
            } => self.apply_fetch(seq, student, outcome),
        }
    }

    fn begin_fetch(&mut self, student: UserId) {
        self.issued_seq += 1;
        let seq = self.issued_seq;
        let store = self.store.clone();
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = store.fetch_tasks_with_reviews(student).await;
            // Receiver gone means the view unmounted; nothing left to notify
            let _ = events_tx.send(DashboardEvent::FetchCompleted {
                seq,
                student,
                outcome,
            });
        });
    }

    fn apply_fetch(&mut self, seq: u64, student: UserId, outcome: Result<Vec<TaskRecord>>) {
        if self.student != Some(student) {
            debug!(%student, "discarding fetch result for superseded identity");
            return;
        }
        if seq <= self.applied_seq {
            debug!(seq, applied = self.applied_seq, "discarding superseded fetch result");
            return;
        }
        self.applied_seq = seq;
        match outcome {
            Ok(tasks) => self.tasks = tasks,
            // A failed read degrades to the previous data set
            Err(e) => warn!("task fetch failed: {}", e),
        }
        // Loading always clears, success or failure
        self.phase = DashboardPhase::Ready;
    }

    /// Recompute the derived model from the current snapshot
    pub fn render_model(&self) -> DashboardModel {
        DashboardModel {
            phase: self.phase,
            category: self.category,
            rows: aggregate::dashboard_rows(&self.tasks, self.category),
            soft_skills: aggregate::aggregate_traits(
                SOFT_SKILL_TRAITS,
                aggregate::flatten_reviews(&self.tasks),
            ),
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> DashboardPhase {
        self.phase
    }

    /// The owned task snapshot
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Currently selected tab
    pub fn category(&self) -> ReviewCategory {
        self.category
    }

    /// Number of fetches issued so far
    pub fn issued_fetches(&self) -> u64 {
        self.issued_seq
    }
}

/// Handle to a running dashboard loop
///
/// Dropping the handle tears the loop down; the feed subscription held by
/// the loop is released exactly once, and in-flight fetch completions have
/// no receiver left, so nothing can mutate state after unmount.
pub struct DashboardHandle {
    events_tx: mpsc::UnboundedSender<DashboardEvent>,
    model_rx: watch::Receiver<DashboardModel>,
    join: JoinHandle<()>,
}

impl DashboardHandle {
    /// Signal that the identity became available or changed
    pub fn set_identity(&self, student: Option<UserId>) {
        let _ = self.events_tx.send(DashboardEvent::IdentityChanged(student));
    }

    /// Select a dashboard tab
    pub fn select_category(&self, category: ReviewCategory) {
        let _ = self
            .events_tx
            .send(DashboardEvent::CategorySelected(category));
    }

    /// Snapshot of the current render model
    pub fn model(&self) -> DashboardModel {
        self.model_rx.borrow().clone()
    }

    /// Watch receiver for render-model updates
    pub fn subscribe_model(&self) -> watch::Receiver<DashboardModel> {
        self.model_rx.clone()
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Spawn the dashboard event loop: one task, one queue, one feed
/// subscription for the lifetime of the view.
pub fn spawn_dashboard(
    store: Arc<dyn ReviewStore>,
    feed: &ChangeFeed,
    reviews_table: impl Into<String>,
) -> DashboardHandle {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (model_tx, model_rx) = watch::channel(DashboardModel::default());
    let mut subscription = feed.subscribe(reviews_table, EventFilter::All);
    let controller_tx = events_tx.clone();

    let join = tokio::spawn(async move {
        let mut controller = DashboardController::new(store, controller_tx);
        let mut feed_open = true;
        loop {
            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(event) => {
                        controller.handle_event(event);
                        let _ = model_tx.send(controller.render_model());
                    }
                    None => break,
                },
                change = subscription.next(), if feed_open => match change {
                    Some(change) => {
                        controller.handle_event(DashboardEvent::FeedChanged(change));
                        let _ = model_tx.send(controller.render_model());
                    }
                    None => feed_open = false,
                },
            }
        }
    });

    DashboardHandle {
        events_tx,
        model_rx,
        join,
    }
}
