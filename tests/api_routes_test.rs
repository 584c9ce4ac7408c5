// ABOUTME: Integration tests for the HTTP API surface
// ABOUTME: Drives the axum router directly: auth, progress, permissions, quizzes, counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{create_test_database, link_mentorship, seed_level};
use emmaus_server::config::ServerConfig;
use emmaus_server::database::Database;
use emmaus_server::models::{
    ActivationPolicy, QuestionKind, Quiz, QuizChoice, QuizQuestion, Stage,
};
use emmaus_server::resources::ServerResources;
use emmaus_server::routes::build_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        jwt_secret: "integration-test-secret".to_owned(),
        jwt_expiry_hours: 1,
        activation_policy: ActivationPolicy::Hybrid,
    }
}

async fn test_app() -> (Router, Arc<Database>) {
    let database = create_test_database().await.expect("db");
    let resources = Arc::new(ServerResources::new(Arc::clone(&database), test_config()));
    (build_router(resources), database)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = if let Some(body) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    } else {
        builder.body(Body::empty()).expect("request")
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register_and_login(app: &Router, prefix: &str) -> (Uuid, String) {
    let email = format!("{prefix}_{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = Uuid::parse_str(body["user_id"].as_str().expect("user_id")).expect("uuid");

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["jwt_token"].as_str().expect("token").to_owned();
    (user_id, token)
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registration_issues_a_referral_code_and_rejects_duplicates() {
    let (app, _db) = test_app().await;
    let email = format!("pilgrim_{}@example.com", Uuid::new_v4());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "long enough secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["referral_code"]
        .as_str()
        .expect("code")
        .starts_with("EMMAUS-"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "long enough secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, "GET", "/api/progress/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "auth_required");
}

#[tokio::test]
async fn lesson_completion_flows_through_to_the_snapshot() {
    let (app, db) = test_app().await;
    let seeded = seed_level(&db, Stage::Seeker, 1, 2).await.expect("seed");
    let (_user_id, token) = register_and_login(&app, "seeker").await;

    let uri = format!("/api/lessons/{}/complete", seeded.lessons[0].id);
    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({"score": "85"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["score"], 85, "string scores are coerced");

    let (status, body) = send(&app, "GET", "/api/progress/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["lessons_completed"], 1);
    assert_eq!(body["summary"]["total_lessons"], 2);
    assert_eq!(body["summary"]["overall_percent"], 50);
    assert_eq!(body["levels"][0]["percent"], 50);

    // A malformed score is absorbed, not rejected
    let uri = format!("/api/lessons/{}/complete", seeded.lessons[1].id);
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({"score": "ninety"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], Value::Null);

    // Unknown lessons are a plain 404
    let uri = format!("/api/lessons/{}/complete", Uuid::new_v4());
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "resource_not_found");
}

#[tokio::test]
async fn mentee_progress_is_mentor_only() {
    let (app, db) = test_app().await;
    seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");
    let (mentor_id, mentor_token) = register_and_login(&app, "mentor").await;
    let (mentee_id, _mentee_token) = register_and_login(&app, "mentee").await;
    let (_stranger_id, stranger_token) = register_and_login(&app, "stranger").await;

    link_mentorship(&db, mentor_id, mentee_id).await.expect("link");

    let uri = format!("/api/progress/mentees/{mentee_id}");
    let (status, body) = send(&app, "GET", &uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "permission_denied");

    let (status, body) = send(&app, "GET", &uri, Some(&mentor_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["lessons_completed"], 0);
}

#[tokio::test]
async fn enrollment_and_journey_listing() {
    let (app, db) = test_app().await;
    let seeded = seed_level(&db, Stage::Seeker, 1, 3).await.expect("seed");
    let (_user_id, token) = register_and_login(&app, "seeker").await;

    let (status, body) = send(&app, "GET", "/api/journeys", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["journeys"][0]["levels"][0]["total_lessons"], 3);

    let uri = format!("/api/journeys/{}/enroll", seeded.path.id);
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress_percentage"], 0);

    // Enrolling twice returns the same row
    let (status, second) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], body["id"]);
}

#[tokio::test]
async fn quiz_round_trip_hides_answers_and_gates_attempts() {
    let (app, db) = test_app().await;
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");
    let lesson_id = seeded.lessons[0].id;

    let mut quiz = Quiz::new(lesson_id, "Checkpoint");
    quiz.max_attempts = 2;
    db.create_quiz(&quiz).await.expect("quiz");
    let question = QuizQuestion {
        id: Uuid::new_v4(),
        quiz_id: quiz.id,
        kind: QuestionKind::TrueFalse,
        question_text: "Grace is a gift.".to_owned(),
        sort_order: 1,
        points: 1,
        created_at: chrono::Utc::now(),
    };
    db.create_quiz_question(&question).await.expect("question");
    let right = QuizChoice {
        id: Uuid::new_v4(),
        question_id: question.id,
        choice_text: "True".to_owned(),
        is_correct: true,
        sort_order: 1,
    };
    let wrong = QuizChoice {
        id: Uuid::new_v4(),
        question_id: question.id,
        choice_text: "False".to_owned(),
        is_correct: false,
        sort_order: 2,
    };
    db.create_quiz_choice(&right).await.expect("choice");
    db.create_quiz_choice(&wrong).await.expect("choice");

    let (_user_id, token) = register_and_login(&app, "seeker").await;

    // Fetching the quiz never leaks correct flags
    let uri = format!("/api/quizzes/lesson/{lesson_id}");
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let choices = body["questions"][0]["choices"].as_array().expect("choices");
    assert_eq!(choices.len(), 2);
    assert!(choices.iter().all(|c| c.get("is_correct").is_none()));

    // A wrong attempt fails and does not complete the lesson
    let uri = format!("/api/quizzes/{}/attempts", quiz.id);
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "answers": { question.id.to_string(): [wrong.id] } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["attempts_remaining"], 1);

    // A correct attempt passes and records the lesson completion
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "answers": { question.id.to_string(): [right.id] } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 100);
    assert_eq!(body["passed"], true);

    let (_status, me) = send(&app, "GET", "/api/progress/me", Some(&token), None).await;
    assert_eq!(me["summary"]["lessons_completed"], 1);

    // The attempt budget is spent
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn counters_read_is_open_but_recompute_is_admin_only() {
    let (app, db) = test_app().await;
    let (_user_id, token) = register_and_login(&app, "member").await;

    let (status, body) = send(&app, "GET", "/api/outreach/counters", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_baptisms"], 0);

    let (status, body) = send(
        &app,
        "GET",
        "/api/outreach/counters?recompute=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "permission_denied");

    // Promote the user and retry
    let (admin_id, admin_token) = register_and_login(&app, "admin").await;
    let mut admin = db.get_user(admin_id).await.expect("query").expect("user");
    admin.is_admin = true;
    db.create_user(&admin).await.expect("promote");

    let (status, _body) = send(
        &app,
        "GET",
        "/api/outreach/counters?recompute=true",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn mission_verification_is_admin_only_and_counts_once() {
    let (app, db) = test_app().await;
    let (_missionary_id, token) = register_and_login(&app, "missionary").await;

    let (status, report) = send(
        &app,
        "POST",
        "/api/outreach/missions",
        Some(&token),
        Some(json!({ "title": "River outreach", "souls_reached": 7, "baptisms_performed": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let report_id = report["id"].as_str().expect("id").to_owned();

    // A non-admin cannot verify
    let uri = format!("/api/outreach/missions/{report_id}/verify");
    let (status, _body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (admin_id, admin_token) = register_and_login(&app, "admin").await;
    let mut admin = db.get_user(admin_id).await.expect("query").expect("user");
    admin.is_admin = true;
    db.create_user(&admin).await.expect("promote");

    let (status, body) = send(&app, "POST", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newly_verified"], true);

    let (status, body) = send(&app, "POST", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newly_verified"], false);

    let (_status, counters) = send(&app, "GET", "/api/outreach/counters", None, None).await;
    assert_eq!(counters["total_souls_reached"], 7);
    assert_eq!(counters["total_baptisms"], 2);
    assert_eq!(counters["total_mission_reports"], 1);
}

#[tokio::test]
async fn referral_attach_via_the_api_links_and_rewards() {
    let (app, db) = test_app().await;
    let (mentor_id, mentor_token) = register_and_login(&app, "mentor").await;

    // Verified email activates the mentor's referral under the hybrid
    // policy
    let (status, body) = send(&app, "POST", "/api/auth/verify-email", Some(&mentor_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newly_verified"], true);
    assert_eq!(body["referral_activated"], true);

    let (status, referral) = send(
        &app,
        "GET",
        "/api/mentorship/referral",
        Some(&mentor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(referral["is_active"], true);
    let code = referral["code"].as_str().expect("code").to_owned();

    // A mentee registering with the code is linked immediately
    let email = format!("mentee_{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "long enough secret", "referral_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let mentee_id = Uuid::parse_str(body["user_id"].as_str().expect("id")).expect("uuid");

    let link = db
        .get_mentorship_by_mentee(mentee_id)
        .await
        .expect("query")
        .expect("linked");
    assert_eq!(link.mentor_id, mentor_id);

    let (status, body) = send(
        &app,
        "GET",
        "/api/mentorship/rewards",
        Some(&mentor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_points"], 10);

    let (status, body) = send(
        &app,
        "GET",
        "/api/mentorship/mentees",
        Some(&mentor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mentees"].as_array().expect("mentees").len(), 1);
}
