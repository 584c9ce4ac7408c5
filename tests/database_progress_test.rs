// ABOUTME: Unit tests for progress ledger database operations
// ABOUTME: Validates upsert semantics, insert-once facts, and the enrollment cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{create_test_database, create_test_user, seed_level};
use emmaus_server::models::{LessonStatus, Stage};

#[tokio::test]
async fn ledger_rows_advance_in_place() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");
    let lesson_id = seeded.lessons[0].id;

    // Starting creates the row in progress
    let started = db
        .mark_lesson_started(user.id, lesson_id, Utc::now())
        .await
        .expect("start");
    assert_eq!(started.status, LessonStatus::InProgress);
    assert!(started.completed_at.is_none());

    // Completion advances the same row and stamps the time
    let completed = db
        .upsert_lesson_completion(user.id, lesson_id, Some(80), Utc::now())
        .await
        .expect("complete");
    assert_eq!(completed.id, started.id);
    assert_eq!(completed.status, LessonStatus::Completed);
    assert_eq!(completed.score, Some(80));
    assert!(completed.completed_at.is_some(), "completed implies a timestamp");

    // Re-starting never demotes a completed row
    let after = db
        .mark_lesson_started(user.id, lesson_id, Utc::now())
        .await
        .expect("restart");
    assert_eq!(after.status, LessonStatus::Completed);
}

#[tokio::test]
async fn completion_upsert_creates_the_row_when_absent() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");

    let progress = db
        .upsert_lesson_completion(user.id, seeded.lessons[0].id, None, Utc::now())
        .await
        .expect("complete");
    assert_eq!(progress.status, LessonStatus::Completed);
    assert_eq!(progress.score, None);
}

#[tokio::test]
async fn level_fact_insert_is_first_writer_wins() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");

    let first = db
        .insert_level_progress_once(user.id, seeded.level.id, Utc::now())
        .await
        .expect("insert");
    let second = db
        .insert_level_progress_once(user.id, seeded.level.id, Utc::now())
        .await
        .expect("re-insert");
    assert!(first);
    assert!(!second, "the unique pair absorbs the duplicate");

    let fact = db
        .get_level_progress(user.id, seeded.level.id)
        .await
        .expect("query")
        .expect("fact");
    assert_eq!(fact.level_id, seeded.level.id);
}

#[tokio::test]
async fn enrollment_is_get_or_create() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 2).await.expect("seed");

    let first = db.enroll(user.id, seeded.path.id).await.expect("enroll");
    let second = db.enroll(user.id, seeded.path.id).await.expect("re-enroll");
    assert_eq!(first.id, second.id);
    assert!(first.is_active);
    assert_eq!(first.progress_percentage, 0);
    assert!(first.current_level_id.is_none());

    let all = db.list_enrollments(user.id).await.expect("list");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn refresh_skips_users_who_never_enrolled() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");

    let refreshed = db
        .refresh_enrollment_progress(user.id, seeded.path.id, Utc::now())
        .await
        .expect("refresh");
    assert!(refreshed.is_none());
}

#[tokio::test]
async fn refresh_stamps_completion_exactly_once() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "seeker").await.expect("user");
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");
    db.enroll(user.id, seeded.path.id).await.expect("enroll");

    db.upsert_lesson_completion(user.id, seeded.lessons[0].id, None, Utc::now())
        .await
        .expect("complete");

    let pct = db
        .refresh_enrollment_progress(user.id, seeded.path.id, Utc::now())
        .await
        .expect("refresh")
        .expect("enrolled");
    assert_eq!(pct, 100);

    let stamped = db
        .get_enrollment(user.id, seeded.path.id)
        .await
        .expect("query")
        .expect("enrollment")
        .completed_at
        .expect("stamped");

    // A later refresh keeps the original completion stamp
    db.refresh_enrollment_progress(user.id, seeded.path.id, Utc::now())
        .await
        .expect("refresh again");
    let unchanged = db
        .get_enrollment(user.id, seeded.path.id)
        .await
        .expect("query")
        .expect("enrollment")
        .completed_at
        .expect("still stamped");
    assert_eq!(stamped, unchanged);
}

#[tokio::test]
async fn counts_ignore_other_users() {
    let db = create_test_database().await.expect("db");
    let a = create_test_user(&db, "a").await.expect("a");
    let b = create_test_user(&db, "b").await.expect("b");
    let seeded = seed_level(&db, Stage::Seeker, 1, 2).await.expect("seed");

    db.upsert_lesson_completion(a.id, seeded.lessons[0].id, None, Utc::now())
        .await
        .expect("complete");

    let (done_a, total_a) = db
        .level_lesson_counts(a.id, seeded.level.id)
        .await
        .expect("counts");
    let (done_b, total_b) = db
        .level_lesson_counts(b.id, seeded.level.id)
        .await
        .expect("counts");
    assert_eq!((done_a, total_a), (1, 2));
    assert_eq!((done_b, total_b), (0, 2));

    assert_eq!(
        db.completed_lesson_ids(a.id).await.expect("ids"),
        vec![seeded.lessons[0].id]
    );
    assert!(db.completed_lesson_ids(b.id).await.expect("ids").is_empty());
}
