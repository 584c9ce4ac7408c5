// ABOUTME: Progress ledger models: per-lesson entries, derived level facts, enrollments
// ABOUTME: LevelProgress is an insert-once snapshot; Enrollment caches a forward-only pointer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificate kind issued on missionary path completion; holders count
/// as active missionaries in the global counters.
pub const MISSIONARY_CERTIFICATE_KIND: &str = "missionary_license";

/// Status of a user's interaction with one lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    /// No interaction recorded yet
    NotStarted,
    /// The lesson has been opened
    InProgress,
    /// The lesson is done; `completed_at` is always set
    Completed,
}

impl LessonStatus {
    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parse the stored string form; unknown values read as not started
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::NotStarted,
        }
    }
}

/// Ledger entry: one user's progress on one lesson.
///
/// Created lazily on first interaction, mutated in place as status
/// advances, never deleted. The (user, lesson) pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    /// Row identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Lesson this entry tracks
    pub lesson_id: Uuid,
    /// Current status; only ever advances
    pub status: LessonStatus,
    /// Optional quiz or self-reported score
    pub score: Option<i64>,
    /// Set exactly when status becomes completed
    pub completed_at: Option<DateTime<Utc>>,
    /// First interaction time
    pub created_at: DateTime<Utc>,
}

/// Derived fact that a user finished every published lesson in a level.
///
/// Created exactly once, the moment the last published lesson completes,
/// and immutable thereafter. It is not re-validated if lessons are later
/// published into the level: completion is a snapshot in time, and the
/// milestone triggers keyed off row creation depend on that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Row identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Completed level
    pub level_id: Uuid,
    /// When the level completed
    pub completed_at: DateTime<Utc>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Per-user membership in a path with cached progress.
///
/// `current_level_id` is a monotonic forward-only ratchet; no code path
/// moves it backward. `completed_at` is stamped the first time the cached
/// percentage reaches 100 and never cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Row identifier
    pub id: Uuid,
    /// Enrolled user
    pub user_id: Uuid,
    /// Path enrolled in
    pub path_id: Uuid,
    /// Most recently completed level, if any
    pub current_level_id: Option<Uuid>,
    /// Cached completion percentage over the path's published lessons
    pub progress_percentage: i64,
    /// Whether the enrollment is active
    pub is_active: bool,
    /// Enrollment time
    pub enrolled_at: DateTime<Utc>,
    /// First time the percentage reached 100
    pub completed_at: Option<DateTime<Utc>>,
}

/// A certificate issued once per (user, kind) milestone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    /// Row identifier
    pub id: Uuid,
    /// Awarded user
    pub user_id: Uuid,
    /// Milestone kind, e.g. `missionary_license`
    pub kind: String,
    /// Display title
    pub title: String,
    /// Unique serial number
    pub serial: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
}
