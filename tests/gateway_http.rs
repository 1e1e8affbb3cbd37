//! End-to-end tests for the HTTP gateway against a mock REST server

use reviewdeck::{
    HttpReviewStore, HttpStoreConfig, ReviewDraft, ReviewKind, ReviewStore, ReviewdeckError,
    ReviewerRole, TaskId, UserId,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> HttpReviewStore {
    HttpReviewStore::new(HttpStoreConfig::new(server.uri(), "secret-key"))
}

#[tokio::test]
async fn fetch_tasks_sends_filter_and_nested_select() {
    let server = MockServer::start().await;
    let student = UserId::new();
    let task_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("select", "*,reviews(*)"))
        .and(query_param("assigned_to", format!("eq.{}", student)))
        .and(header("apikey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": task_id,
                "title": "Sorting algorithms",
                "reviews": [
                    {
                        "id": Uuid::new_v4(),
                        "task_id": task_id,
                        "score": 8,
                        "review": "Clear and correct",
                        "reviewer_id": Uuid::new_v4(),
                        "reviewer_role": "executive",
                        "created_at": "2026-03-01T10:00:00Z"
                    }
                ]
            },
            {
                "id": Uuid::new_v4(),
                "title": "Hash maps",
                "reviews": []
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = store_for(&server)
        .fetch_tasks_with_reviews(student)
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Sorting algorithms");
    assert_eq!(tasks[0].reviews.len(), 1);
    assert_eq!(tasks[0].reviews[0].score, 8.0);
    assert_eq!(tasks[0].reviews[0].reviewer_role, ReviewerRole::Executive);
    assert!(tasks[1].reviews.is_empty());
}

#[tokio::test]
async fn fetch_tasks_maps_failure_to_query_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .fetch_tasks_with_reviews(UserId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewdeckError::Query(_)));
}

#[tokio::test]
async fn fetch_single_review_absent_row_is_none() {
    let server = MockServer::start().await;
    let task = TaskId::new();

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .and(query_param("task_id", format!("eq.{}", task)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let review = store_for(&server).fetch_single_review(task).await.unwrap();
    assert!(review.is_none());
}

#[tokio::test]
async fn fetch_single_review_present_row_is_some() {
    let server = MockServer::start().await;
    let task = TaskId::new();

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "task_id": task.0,
                "score": 6.5,
                "reviewer_id": Uuid::new_v4(),
                "reviewer_role": "manager",
                "trait_scores": {"communication": 7},
                "created_at": "2026-03-02T09:30:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let review = store_for(&server)
        .fetch_single_review(task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(review.score, 6.5);
    assert_eq!(review.trait_score("communication"), Some(7.0));
}

#[tokio::test]
async fn upsert_sends_conflict_key_and_returns_row() {
    let server = MockServer::start().await;
    let student = UserId::new();
    let task = TaskId::new();

    Mock::given(method("POST"))
        .and(path("/reviews"))
        .and(query_param("on_conflict", "student_id,task_id"))
        .and(header(
            "Prefer",
            "resolution=merge-duplicates,return=representation",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "task_id": task.0,
                "score": 9,
                "review": "Excellent",
                "reviewer_id": Uuid::new_v4(),
                "reviewer_role": "executive",
                "created_at": "2026-03-03T12:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let draft = ReviewDraft {
        kind: ReviewKind::TaskReview,
        student_id: student,
        task_id: Some(task),
        reviewer_id: UserId::new(),
        reviewer_role: ReviewerRole::Executive,
        score: 9.0,
        review: Some("Excellent".to_string()),
        improvements: None,
        trait_scores: None,
    };
    let stored = store_for(&server).upsert_review(&draft).await.unwrap();
    assert_eq!(stored.score, 9.0);
}

#[tokio::test]
async fn upsert_mentor_review_uses_reviewer_conflict_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reviews"))
        .and(query_param("on_conflict", "student_id,reviewer_id"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "task_id": Uuid::new_v4(),
                "score": 7,
                "reviewer_id": Uuid::new_v4(),
                "reviewer_role": "manager",
                "created_at": "2026-03-03T12:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let draft = ReviewDraft {
        kind: ReviewKind::MentorReview,
        student_id: UserId::new(),
        task_id: None,
        reviewer_id: UserId::new(),
        reviewer_role: ReviewerRole::Manager,
        score: 7.0,
        review: None,
        improvements: None,
        trait_scores: None,
    };
    store_for(&server).upsert_review(&draft).await.unwrap();
}

#[tokio::test]
async fn upsert_failure_propagates_as_write_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string("duplicate key value violates constraint"),
        )
        .mount(&server)
        .await;

    let draft = ReviewDraft {
        kind: ReviewKind::TaskReview,
        student_id: UserId::new(),
        task_id: Some(TaskId::new()),
        reviewer_id: UserId::new(),
        reviewer_role: ReviewerRole::Manager,
        score: 5.0,
        review: None,
        improvements: None,
        trait_scores: None,
    };
    let err = store_for(&server).upsert_review(&draft).await.unwrap_err();
    match err {
        ReviewdeckError::Write(message) => assert!(message.contains("409")),
        other => panic!("expected Write error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_profile_round_trip() {
    let server = MockServer::start().await;
    let user = UserId::new();

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(query_param("user_id", format!("eq.{}", user)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "user_id": user.0,
                "display_name": "Ada Lovelace",
                "role": "student",
                "cohort": "2026-spring"
            }
        ])))
        .mount(&server)
        .await;

    let profile = store_for(&server)
        .fetch_profile(user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.display_name, "Ada Lovelace");
    assert_eq!(profile.cohort.as_deref(), Some("2026-spring"));
}
