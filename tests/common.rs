// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, user, and catalog fixture helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(dead_code)]

//! Shared test utilities for `emmaus_server`
//!
//! Common setup functions to reduce duplication across integration tests.

use anyhow::Result;
use emmaus_server::auth::hash_password;
use emmaus_server::database::Database;
use emmaus_server::models::{
    ActivationPolicy, JourneyPath, Lesson, Level, Stage, User,
};
use emmaus_server::tracker::ProgressTracker;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber_init();
    });
}

fn tracing_subscriber_init() {
    use tracing_subscriber::fmt;
    let _ = fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create a tracker over a database with the given activation policy
pub fn create_tracker(database: &Arc<Database>, policy: ActivationPolicy) -> ProgressTracker {
    ProgressTracker::new(Arc::clone(database), policy)
}

/// Create and store a user with a unique email
pub async fn create_test_user(database: &Database, prefix: &str) -> Result<User> {
    let email = format!("{prefix}_{}@example.com", Uuid::new_v4());
    let user = User::new(
        email,
        hash_password("correct horse battery staple")?,
        Some(prefix.to_owned()),
    );
    database.create_user(&user).await?;
    Ok(user)
}

/// Create and store an admin user
pub async fn create_test_admin(database: &Database, prefix: &str) -> Result<User> {
    let mut user = create_test_user(database, prefix).await?;
    user.is_admin = true;
    database.create_user(&user).await?;
    Ok(user)
}

/// A seeded path with one level and its lessons
pub struct SeededLevel {
    pub path: JourneyPath,
    pub level: Level,
    pub lessons: Vec<Lesson>,
}

/// Seed a path with a single level of `lesson_count` published lessons
pub async fn seed_level(
    database: &Database,
    stage: Stage,
    level_order: i64,
    lesson_count: usize,
) -> Result<SeededLevel> {
    let path = JourneyPath::new(&format!("{stage:?} path {}", Uuid::new_v4()), stage, 1);
    database.create_path(&path).await?;

    let level = Level::new(path.id, &format!("Level {level_order} {}", Uuid::new_v4()), level_order);
    database.create_level(&level).await?;

    let mut lessons = Vec::with_capacity(lesson_count);
    for i in 0..lesson_count {
        let lesson = Lesson::new(level.id, &format!("Lesson {i} {}", Uuid::new_v4()), i as i64 + 1);
        database.create_lesson(&lesson).await?;
        lessons.push(lesson);
    }

    Ok(SeededLevel {
        path,
        level,
        lessons,
    })
}

/// Add another level with lessons to an existing path
pub async fn add_level(
    database: &Database,
    path_id: Uuid,
    level_order: i64,
    lesson_count: usize,
) -> Result<(Level, Vec<Lesson>)> {
    let level = Level::new(
        path_id,
        &format!("Level {level_order} {}", Uuid::new_v4()),
        level_order,
    );
    database.create_level(&level).await?;

    let mut lessons = Vec::with_capacity(lesson_count);
    for i in 0..lesson_count {
        let lesson = Lesson::new(level.id, &format!("Lesson {i} {}", Uuid::new_v4()), i as i64 + 1);
        database.create_lesson(&lesson).await?;
        lessons.push(lesson);
    }
    Ok((level, lessons))
}

/// Link a mentee to a mentor directly (bypassing referral codes)
pub async fn link_mentorship(database: &Database, mentor_id: Uuid, mentee_id: Uuid) -> Result<()> {
    database.create_mentorship(mentor_id, mentee_id).await?;
    Ok(())
}
