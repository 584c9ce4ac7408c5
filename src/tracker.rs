// ABOUTME: The progress core: ledger writes, level aggregation, journey projection
// ABOUTME: Runs the completion chain synchronously within a single request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

//! Progress tracking core
//!
//! One call to [`ProgressTracker::complete_lesson`] runs the whole chain
//! in order: ledger write, level aggregation, enrollment projection, and
//! the milestone triggers (mentor rewards, referral activation, the
//! missionary certificate). Everything executes sequentially in-process;
//! idempotence comes from the unique constraints underneath, not from
//! locks or retries.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::mentorship::{activation, rewards};
use crate::models::progress::MISSIONARY_CERTIFICATE_KIND;
use crate::models::{ActivationPolicy, Enrollment, LessonProgress, RewardKind, Stage};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Order value of the milestone level. Completing the order-1 level of
/// any path fires the mentor reward and the activation evaluator.
const MILESTONE_LEVEL_ORDER: i64 = 1;

/// Per-level progress figures for a snapshot
#[derive(Debug, Serialize)]
pub struct LevelSummary {
    /// Level id
    pub id: Uuid,
    /// Level name
    pub name: String,
    /// Level slug
    pub slug: String,
    /// Ordering within the path
    pub sort_order: i64,
    /// Owning path
    pub path: PathSummary,
    /// Published lessons in the level
    pub total_lessons: i64,
    /// Percent of those the user completed
    pub percent: i64,
}

/// Path identification embedded in level summaries
#[derive(Debug, Serialize)]
pub struct PathSummary {
    /// Path id
    pub id: Uuid,
    /// Path name
    pub name: String,
    /// Path stage
    pub stage: Stage,
}

/// Overall completion figures
#[derive(Debug, Serialize)]
pub struct CompletionSummary {
    /// Completed published lessons
    pub lessons_completed: i64,
    /// Total published lessons
    pub total_lessons: i64,
    /// Floor percentage, 0 when the catalog is empty
    pub overall_percent: i64,
}

/// JSON-serializable progress snapshot returned to dashboards and mentors
#[derive(Debug, Serialize)]
pub struct ProgressSnapshot {
    /// Per-level percentages across active levels
    pub levels: Vec<LevelSummary>,
    /// The user's path enrollments with cached figures
    pub enrollments: Vec<Enrollment>,
    /// Overall completion summary
    pub summary: CompletionSummary,
    /// Every lesson the user has completed
    pub completed_lesson_ids: Vec<Uuid>,
}

/// The progress tracking service
#[derive(Clone)]
pub struct ProgressTracker {
    database: Arc<Database>,
    activation_policy: ActivationPolicy,
}

impl ProgressTracker {
    /// Create a tracker over the shared database
    #[must_use]
    pub fn new(database: Arc<Database>, activation_policy: ActivationPolicy) -> Self {
        Self {
            database,
            activation_policy,
        }
    }

    /// Record that a user opened a lesson. The ledger row is created
    /// lazily; completed lessons are never demoted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or unpublished lesson, or any
    /// database failure.
    pub async fn start_lesson(&self, user_id: Uuid, lesson_id: Uuid) -> AppResult<LessonProgress> {
        let lesson = self
            .database
            .get_lesson(lesson_id)
            .await?
            .filter(|l| l.is_published)
            .ok_or_else(|| AppError::not_found(format!("Lesson {lesson_id}")))?;

        self.database
            .mark_lesson_started(user_id, lesson.id, Utc::now())
            .await
    }

    /// Record a lesson completion and run the full chain:
    ///
    /// 1. upsert the ledger row (idempotent; duplicate completion is
    ///    absorbed silently and returns the current record)
    /// 2. if the level just finished, create the level fact once and fire
    ///    the order-1 milestone triggers
    /// 3. refresh the path enrollment cache and pointer; a finished
    ///    missionary path issues the certificate
    /// 4. if every published lesson system-wide is done, award the
    ///    all-levels milestone
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or unpublished lesson, or any
    /// database failure. A missing mentor is not an error; those triggers
    /// are silent no-ops.
    pub async fn complete_lesson(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        score: Option<i64>,
    ) -> AppResult<LessonProgress> {
        let lesson = self
            .database
            .get_lesson(lesson_id)
            .await?
            .filter(|l| l.is_published)
            .ok_or_else(|| AppError::not_found(format!("Lesson {lesson_id}")))?;

        let level = self
            .database
            .get_level(lesson.level_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Level {}", lesson.level_id)))?;

        let now = Utc::now();
        let progress = self
            .database
            .upsert_lesson_completion(user_id, lesson.id, score, now)
            .await?;

        let (done, total) = self.database.level_lesson_counts(user_id, level.id).await?;
        if total > 0 && done == total {
            let created = self
                .database
                .insert_level_progress_once(user_id, level.id, now)
                .await?;

            if created {
                debug!(%user_id, level = %level.slug, "level completed");
                self.database
                    .advance_current_level(user_id, level.path_id, level.id, level.sort_order)
                    .await?;

                // The order-1 milestone is deliberately cross-path: the
                // first level of every path fires it.
                if level.sort_order == MILESTONE_LEVEL_ORDER {
                    rewards::award_for_mentee_event(
                        &self.database,
                        user_id,
                        RewardKind::Level1Complete,
                        None,
                    )
                    .await?;
                    activation::try_activate(
                        &self.database,
                        user_id,
                        self.activation_policy,
                        "level1",
                    )
                    .await?;
                }
            }
        }

        if let Some(percentage) = self
            .database
            .refresh_enrollment_progress(user_id, level.path_id, now)
            .await?
        {
            if percentage >= 100 {
                self.maybe_issue_missionary_certificate(user_id, level.path_id)
                    .await?;
            }
        }

        let (done_all, total_all) = self.database.overall_lesson_counts(user_id).await?;
        if total_all > 0 && done_all == total_all {
            rewards::award_for_mentee_event(
                &self.database,
                user_id,
                RewardKind::AllLevelsComplete,
                None,
            )
            .await?;
        }

        Ok(progress)
    }

    /// Percent of a level's published lessons the user has completed.
    /// An empty level yields 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn level_percent(&self, user_id: Uuid, level_id: Uuid) -> AppResult<i64> {
        let (done, total) = self.database.level_lesson_counts(user_id, level_id).await?;
        Ok(percent(done, total))
    }

    /// (done, total, percent) over every published lesson in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn overall_completion(&self, user_id: Uuid) -> AppResult<(i64, i64, i64)> {
        let (done, total) = self.database.overall_lesson_counts(user_id).await?;
        Ok((done, total, percent(done, total)))
    }

    /// Build the full progress snapshot for dashboards and mentor views
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails
    pub async fn snapshot(&self, user_id: Uuid) -> AppResult<ProgressSnapshot> {
        let levels = self.database.list_all_active_levels().await?;
        let paths = self.database.list_active_paths().await?;

        let mut level_summaries = Vec::with_capacity(levels.len());
        for level in levels {
            let Some(path) = paths.iter().find(|p| p.id == level.path_id) else {
                continue;
            };
            let (done, total) = self.database.level_lesson_counts(user_id, level.id).await?;
            level_summaries.push(LevelSummary {
                id: level.id,
                name: level.name,
                slug: level.slug,
                sort_order: level.sort_order,
                path: PathSummary {
                    id: path.id,
                    name: path.name.clone(),
                    stage: path.stage,
                },
                total_lessons: total,
                percent: percent(done, total),
            });
        }

        let (done, total, overall) = self.overall_completion(user_id).await?;
        let enrollments = self.database.list_enrollments(user_id).await?;
        let completed_lesson_ids = self.database.completed_lesson_ids(user_id).await?;

        Ok(ProgressSnapshot {
            levels: level_summaries,
            enrollments,
            summary: CompletionSummary {
                lessons_completed: done,
                total_lessons: total,
                overall_percent: overall,
            },
            completed_lesson_ids,
        })
    }

    /// Issue the missionary certificate when the finished path is the
    /// missionary-stage one. Insert-once; re-finishing is a no-op.
    async fn maybe_issue_missionary_certificate(
        &self,
        user_id: Uuid,
        path_id: Uuid,
    ) -> AppResult<()> {
        let Some(path) = self.database.get_path(path_id).await? else {
            return Ok(());
        };
        if path.stage != Stage::Missionary {
            return Ok(());
        }
        let serial = format!("EMMAUS-M-{user_id}");
        let issued = self
            .database
            .issue_certificate_once(
                user_id,
                MISSIONARY_CERTIFICATE_KIND,
                "Certified Missionary License",
                &serial,
                Utc::now(),
            )
            .await?;
        if issued {
            debug!(%user_id, "missionary certificate issued");
        }
        Ok(())
    }
}

/// Floor percentage clamped to 0..=100; zero total yields 0
fn percent(done: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (done * 100 / total).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn percent_is_floored_and_clamped() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
        assert_eq!(percent(0, 5), 0);
    }
}
