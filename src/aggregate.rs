//! Review aggregation: the pure half of the dashboard core
//!
//! Transforms a snapshot of task+review records into per-trait averaged
//! soft-skill scores and per-category display rows. Everything here is a
//! total function over the supplied snapshot: absent or malformed data
//! degrades to zero contribution, never a failure, and iteration order
//! does not affect any result.

use crate::types::{ReviewCategory, ReviewRecord, TaskId, TaskRecord};

/// Placeholder shown when a task has no review yet
pub const PENDING_VALUE: &str = "Pending";

/// Running aggregate for one soft-skill trait
///
/// Recomputed from scratch on every render pass; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitAggregate {
    pub trait_name: String,
    pub sum: f64,
    pub count: usize,
}

impl TraitAggregate {
    fn new(trait_name: &str) -> Self {
        Self {
            trait_name: trait_name.to_string(),
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Average of contributed scores; 0.0 when nothing contributed
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Per-trait averages over one snapshot of reviews
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoftSkillReport {
    /// One aggregate per configured trait, in trait-list order
    pub traits: Vec<TraitAggregate>,
}

impl SoftSkillReport {
    /// Average for a single trait; 0.0 for unknown trait names
    pub fn average_for(&self, trait_name: &str) -> f64 {
        self.traits
            .iter()
            .find(|t| t.trait_name == trait_name)
            .map(TraitAggregate::average)
            .unwrap_or(0.0)
    }

    /// Unweighted mean of the per-trait averages; 0.0 for an empty trait list
    pub fn overall(&self) -> f64 {
        if self.traits.is_empty() {
            return 0.0;
        }
        let total: f64 = self.traits.iter().map(TraitAggregate::average).sum();
        total / self.traits.len() as f64
    }
}

/// Aggregate trait scores across a flat list of reviews.
///
/// A record contributes to a trait only if it carries a numeric value under
/// that trait key; values present but non-numeric are ignored.
pub fn aggregate_traits<'a, I>(trait_names: &[&str], reviews: I) -> SoftSkillReport
where
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let mut traits: Vec<TraitAggregate> =
        trait_names.iter().map(|name| TraitAggregate::new(name)).collect();

    for review in reviews {
        for aggregate in &mut traits {
            if let Some(value) = review.trait_score(&aggregate.trait_name) {
                aggregate.observe(value);
            }
        }
    }

    SoftSkillReport { traits }
}

/// All reviews across a task snapshot, flattened
pub fn flatten_reviews(tasks: &[TaskRecord]) -> impl Iterator<Item = &ReviewRecord> {
    tasks.iter().flat_map(|task| task.reviews.iter())
}

/// Pick the review used for single-value display when a task has several.
///
/// Deterministic priority key: reviewer role rank (executive outranks
/// manager), then recency, newest first. Independent of the order the
/// gateway returned the rows in.
pub fn primary_review(reviews: &[ReviewRecord]) -> Option<&ReviewRecord> {
    reviews
        .iter()
        .max_by_key(|review| (review.reviewer_role.rank(), review.created_at))
}

/// One rendered dashboard row
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    pub task_id: TaskId,
    pub title: String,
    /// "Given by" label of the primary reviewer, or "—" when unreviewed
    pub given_by: String,
    /// Display value for the selected category
    pub value: String,
}

/// Derive the per-task display rows for the selected category.
///
/// Unreviewed tasks render as pending rather than being dropped, so the
/// row count always matches the task count.
pub fn dashboard_rows(tasks: &[TaskRecord], category: ReviewCategory) -> Vec<DashboardRow> {
    tasks
        .iter()
        .map(|task| {
            let primary = primary_review(&task.reviews);
            DashboardRow {
                task_id: task.id,
                title: task.title.clone(),
                given_by: primary
                    .map(|r| r.reviewer_role.display_name().to_string())
                    .unwrap_or_else(|| "—".to_string()),
                value: category_value(primary, category),
            }
        })
        .collect()
}

fn category_value(review: Option<&ReviewRecord>, category: ReviewCategory) -> String {
    let Some(review) = review else {
        return PENDING_VALUE.to_string();
    };
    match category {
        ReviewCategory::Score => format!("{}/10", review.score),
        ReviewCategory::Review => review
            .review
            .clone()
            .unwrap_or_else(|| "—".to_string()),
        ReviewCategory::Improvements => review
            .improvements
            .clone()
            .unwrap_or_else(|| "—".to_string()),
        ReviewCategory::SoftSkills => {
            // Mean of this review's own numeric trait values
            let values: Vec<f64> = review
                .trait_scores
                .iter()
                .flat_map(|scores| scores.values())
                .filter_map(serde_json::Value::as_f64)
                .collect();
            if values.is_empty() {
                "—".to_string()
            } else {
                format!("{:.1}", values.iter().sum::<f64>() / values.len() as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewId, ReviewerRole, UserId, SOFT_SKILL_TRAITS};
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn review(role: ReviewerRole, score: f64) -> ReviewRecord {
        ReviewRecord {
            id: ReviewId::new(),
            task_id: TaskId::new(),
            score,
            review: None,
            improvements: None,
            trait_scores: None,
            reviewer_id: UserId::new(),
            reviewer_role: role,
            created_at: Utc::now(),
        }
    }

    fn review_with_traits(pairs: &[(&str, Value)]) -> ReviewRecord {
        let mut scores = BTreeMap::new();
        for (name, value) in pairs {
            scores.insert(name.to_string(), value.clone());
        }
        ReviewRecord {
            trait_scores: Some(scores),
            ..review(ReviewerRole::Executive, 5.0)
        }
    }

    #[test]
    fn test_trait_average_is_sum_over_contributing_count() {
        let reviews = vec![
            review_with_traits(&[("communication", json!(8))]),
            review_with_traits(&[("communication", json!(6)), ("teamwork", json!(10))]),
            review_with_traits(&[("teamwork", json!(4))]),
        ];
        let report = aggregate_traits(&["communication", "teamwork"], &reviews);

        assert_eq!(report.average_for("communication"), 7.0);
        assert_eq!(report.average_for("teamwork"), 7.0);
    }

    #[test]
    fn test_zero_contributions_average_to_zero() {
        let reviews = vec![review(ReviewerRole::Manager, 5.0)];
        let report = aggregate_traits(SOFT_SKILL_TRAITS, &reviews);
        for name in SOFT_SKILL_TRAITS {
            assert_eq!(report.average_for(name), 0.0);
        }
        assert_eq!(report.overall(), 0.0);
    }

    #[test]
    fn test_non_numeric_values_are_ignored() {
        let reviews = vec![
            review_with_traits(&[("communication", json!("excellent"))]),
            review_with_traits(&[("communication", json!(9))]),
            review_with_traits(&[("communication", json!(null))]),
            review_with_traits(&[("communication", json!(true))]),
        ];
        let report = aggregate_traits(&["communication"], &reviews);
        let aggregate = &report.traits[0];
        assert_eq!(aggregate.count, 1);
        assert_eq!(aggregate.average(), 9.0);
    }

    #[test]
    fn test_overall_is_unweighted_mean_of_trait_averages() {
        // communication averages 8 over two records, teamwork 4 over one;
        // overall must be (8 + 4) / 2, not weighted by contribution count.
        let reviews = vec![
            review_with_traits(&[("communication", json!(7)), ("teamwork", json!(4))]),
            review_with_traits(&[("communication", json!(9))]),
        ];
        let report = aggregate_traits(&["communication", "teamwork"], &reviews);
        assert_eq!(report.overall(), 6.0);
    }

    #[test]
    fn test_empty_trait_list_overall_is_zero() {
        let reviews = vec![review_with_traits(&[("communication", json!(9))])];
        let report = aggregate_traits(&[], &reviews);
        assert_eq!(report.overall(), 0.0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let reviews = vec![
            review_with_traits(&[("communication", json!(7.5))]),
            review_with_traits(&[("teamwork", json!(3))]),
        ];
        let first = aggregate_traits(SOFT_SKILL_TRAITS, &reviews);
        let second = aggregate_traits(SOFT_SKILL_TRAITS, &reviews);
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_order_does_not_affect_averages(scores in proptest::collection::vec(0.0f64..10.0, 1..20)) {
            let reviews: Vec<ReviewRecord> = scores
                .iter()
                .map(|s| review_with_traits(&[("communication", json!(*s))]))
                .collect();
            let mut reversed = reviews.clone();
            reversed.reverse();

            let forward = aggregate_traits(&["communication"], &reviews);
            let backward = aggregate_traits(&["communication"], &reversed);

            prop_assert!((forward.average_for("communication") - backward.average_for("communication")).abs() < 1e-9);
            prop_assert_eq!(forward.traits[0].count, backward.traits[0].count);
        }
    }

    #[test]
    fn test_primary_review_prefers_executive_regardless_of_order() {
        let manager = review(ReviewerRole::Manager, 5.0);
        let executive = review(ReviewerRole::Executive, 8.0);

        let first = [manager.clone(), executive.clone()];
        let picked = primary_review(&first).unwrap();
        assert_eq!(picked.score, 8.0);

        let second = [executive, manager];
        let picked = primary_review(&second).unwrap();
        assert_eq!(picked.score, 8.0);
    }

    #[test]
    fn test_primary_review_breaks_role_ties_by_recency() {
        let older = ReviewRecord {
            created_at: Utc::now() - Duration::hours(2),
            ..review(ReviewerRole::Manager, 4.0)
        };
        let newer = ReviewRecord {
            created_at: Utc::now(),
            ..review(ReviewerRole::Manager, 6.0)
        };
        let records = [older, newer];
        let picked = primary_review(&records).unwrap();
        assert_eq!(picked.score, 6.0);
    }

    #[test]
    fn test_primary_review_empty_is_none() {
        assert!(primary_review(&[]).is_none());
    }

    #[test]
    fn test_dashboard_row_score_example() {
        // Task "A" with an executive review scored 7 on the Score tab
        let mut record = review(ReviewerRole::Executive, 7.0);
        record.review = Some("Good".to_string());
        record.improvements = Some("None".to_string());
        let task = TaskRecord {
            id: TaskId::new(),
            title: "A".to_string(),
            reviews: vec![record],
        };

        let rows = dashboard_rows(&[task], ReviewCategory::Score);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "A");
        assert_eq!(rows[0].given_by, "Tutor");
        assert_eq!(rows[0].value, "7/10");
    }

    #[test]
    fn test_dashboard_row_text_categories() {
        let mut record = review(ReviewerRole::Manager, 5.0);
        record.review = Some("Solid work".to_string());
        let task = TaskRecord {
            id: TaskId::new(),
            title: "B".to_string(),
            reviews: vec![record],
        };

        let rows = dashboard_rows(std::slice::from_ref(&task), ReviewCategory::Review);
        assert_eq!(rows[0].value, "Solid work");
        assert_eq!(rows[0].given_by, "Manager");

        // Improvements absent renders a placeholder, not a panic
        let rows = dashboard_rows(std::slice::from_ref(&task), ReviewCategory::Improvements);
        assert_eq!(rows[0].value, "—");
    }

    #[test]
    fn test_dashboard_row_unreviewed_task_is_pending() {
        let task = TaskRecord {
            id: TaskId::new(),
            title: "C".to_string(),
            reviews: vec![],
        };
        let rows = dashboard_rows(&[task], ReviewCategory::Score);
        assert_eq!(rows[0].value, PENDING_VALUE);
        assert_eq!(rows[0].given_by, "—");
    }

    #[test]
    fn test_dashboard_row_soft_skills_value() {
        let record = review_with_traits(&[
            ("communication", json!(8)),
            ("teamwork", json!(6)),
            ("adaptability", json!("n/a")),
        ]);
        let task = TaskRecord {
            id: TaskId::new(),
            title: "D".to_string(),
            reviews: vec![record],
        };
        let rows = dashboard_rows(&[task], ReviewCategory::SoftSkills);
        assert_eq!(rows[0].value, "7.0");
    }

    #[test]
    fn test_flatten_reviews_spans_all_tasks() {
        let tasks = vec![
            TaskRecord {
                id: TaskId::new(),
                title: "A".to_string(),
                reviews: vec![review(ReviewerRole::Executive, 7.0)],
            },
            TaskRecord {
                id: TaskId::new(),
                title: "B".to_string(),
                reviews: vec![
                    review(ReviewerRole::Manager, 5.0),
                    review(ReviewerRole::Executive, 9.0),
                ],
            },
        ];
        assert_eq!(flatten_reviews(&tasks).count(), 3);
    }
}
