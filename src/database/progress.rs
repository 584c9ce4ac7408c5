// ABOUTME: Progress ledger database operations and derived completion facts
// ABOUTME: Upsert-style lesson writes, level counts, insert-once level progress, enrollment cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Enrollment, LessonProgress, LessonStatus, LevelProgress};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Get the ledger entry for a (user, lesson) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_lesson_progress(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> AppResult<Option<LessonProgress>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, lesson_id, status, score, completed_at, created_at
            FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get lesson progress: {e}")))?;

        row.map(|row| Self::row_to_lesson_progress(&row)).transpose()
    }

    /// Record a lesson completion: get-or-create the ledger row, then
    /// advance it in place unless it is already completed.
    ///
    /// Idempotent - a repeated call for an already-completed lesson leaves
    /// the persisted row untouched and returns it as-is. The optional
    /// score is stored only on the not-completed to completed transition.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn upsert_lesson_completion(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        score: Option<i64>,
        now: DateTime<Utc>,
    ) -> AppResult<LessonProgress> {
        sqlx::query(
            r"
            INSERT INTO lesson_progress (
                id, user_id, lesson_id, status, score, completed_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(user_id, lesson_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(LessonStatus::Completed.as_str())
        .bind(score)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record lesson completion: {e}")))?;

        // A pre-existing row advances in place; an already-completed row
        // is left untouched (duplicate completion is absorbed silently).
        sqlx::query(
            r"
            UPDATE lesson_progress
            SET status = $1, completed_at = $2, score = COALESCE($3, score)
            WHERE user_id = $4 AND lesson_id = $5 AND status != $1
            ",
        )
        .bind(LessonStatus::Completed.as_str())
        .bind(now)
        .bind(score)
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update lesson progress: {e}")))?;

        self.get_lesson_progress(user_id, lesson_id)
            .await?
            .ok_or_else(|| AppError::internal("Lesson progress row missing after upsert"))
    }

    /// Record that a lesson was opened: get-or-create the ledger row in
    /// the in-progress state. Completed rows are never demoted.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn mark_lesson_started(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<LessonProgress> {
        sqlx::query(
            r"
            INSERT INTO lesson_progress (
                id, user_id, lesson_id, status, score, completed_at, created_at
            ) VALUES ($1, $2, $3, $4, NULL, NULL, $5)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET status = $4
                WHERE lesson_progress.status = $6
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(LessonStatus::InProgress.as_str())
        .bind(now)
        .bind(LessonStatus::NotStarted.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to mark lesson started: {e}")))?;

        self.get_lesson_progress(user_id, lesson_id)
            .await?
            .ok_or_else(|| AppError::internal("Lesson progress row missing after insert"))
    }

    /// Count (completed, total) published lessons in a level for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn level_lesson_counts(
        &self,
        user_id: Uuid,
        level_id: Uuid,
    ) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COUNT(lp.id) AS done
            FROM journey_lessons l
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id AND lp.user_id = $1 AND lp.status = 'completed'
            WHERE l.level_id = $2 AND l.is_published = TRUE
            ",
        )
        .bind(user_id.to_string())
        .bind(level_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count level lessons: {e}")))?;

        Ok((row.get("done"), row.get("total")))
    }

    /// Count (completed, total) published lessons across the whole catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn overall_lesson_counts(&self, user_id: Uuid) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COUNT(lp.id) AS done
            FROM journey_lessons l
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id AND lp.user_id = $1 AND lp.status = 'completed'
            WHERE l.is_published = TRUE
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count lessons: {e}")))?;

        Ok((row.get("done"), row.get("total")))
    }

    /// Count (completed, total) published lessons within one path
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn path_lesson_counts(&self, user_id: Uuid, path_id: Uuid) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COUNT(lp.id) AS done
            FROM journey_lessons l
            JOIN journey_levels lv ON lv.id = l.level_id
            LEFT JOIN lesson_progress lp
                ON lp.lesson_id = l.id AND lp.user_id = $1 AND lp.status = 'completed'
            WHERE lv.path_id = $2 AND l.is_published = TRUE
            ",
        )
        .bind(user_id.to_string())
        .bind(path_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count path lessons: {e}")))?;

        Ok((row.get("done"), row.get("total")))
    }

    /// IDs of every lesson the user has completed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn completed_lesson_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT lesson_id FROM lesson_progress WHERE user_id = $1 AND status = 'completed'",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list completed lessons: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("lesson_id");
                Uuid::parse_str(&id)
                    .map_err(|e| AppError::internal(format!("Invalid lesson id in database: {e}")))
            })
            .collect()
    }

    /// Create the level-completion fact exactly once.
    ///
    /// Returns true only for the call that created the row. Concurrent
    /// duplicates race on the INSERT and the (user, level) unique
    /// constraint resolves the race as one success plus one no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub async fn insert_level_progress_once(
        &self,
        user_id: Uuid,
        level_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO level_progress (id, user_id, level_id, status, completed_at, created_at)
            VALUES ($1, $2, $3, 'completed', $4, $4)
            ON CONFLICT(user_id, level_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(level_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record level completion: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the level-completion fact for a (user, level) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_level_progress(
        &self,
        user_id: Uuid,
        level_id: Uuid,
    ) -> AppResult<Option<LevelProgress>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, level_id, completed_at, created_at
            FROM level_progress WHERE user_id = $1 AND level_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(level_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get level progress: {e}")))?;

        row.map(|row| Self::row_to_level_progress(&row)).transpose()
    }

    /// Whether the user has completed any order-1 level
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn has_completed_order1_level(&self, user_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT EXISTS(
                SELECT 1 FROM level_progress lp
                JOIN journey_levels l ON l.id = lp.level_id
                WHERE lp.user_id = $1 AND l.sort_order = 1
            ) AS found
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check level 1 completion: {e}")))?;

        Ok(row.get("found"))
    }

    /// Enroll a user in a path (get-or-create)
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn enroll(&self, user_id: Uuid, path_id: Uuid) -> AppResult<Enrollment> {
        sqlx::query(
            r"
            INSERT INTO enrollments (
                id, user_id, path_id, current_level_id, progress_percentage,
                is_active, enrolled_at, completed_at
            ) VALUES ($1, $2, $3, NULL, 0, TRUE, $4, NULL)
            ON CONFLICT(user_id, path_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(path_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to enroll: {e}")))?;

        self.get_enrollment(user_id, path_id)
            .await?
            .ok_or_else(|| AppError::internal("Enrollment row missing after insert"))
    }

    /// Get an enrollment by (user, path)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_enrollment(
        &self,
        user_id: Uuid,
        path_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, path_id, current_level_id, progress_percentage,
                   is_active, enrolled_at, completed_at
            FROM enrollments WHERE user_id = $1 AND path_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(path_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get enrollment: {e}")))?;

        row.map(|row| Self::row_to_enrollment(&row)).transpose()
    }

    /// List a user's enrollments
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_enrollments(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, path_id, current_level_id, progress_percentage,
                   is_active, enrolled_at, completed_at
            FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list enrollments: {e}")))?;

        rows.iter().map(Self::row_to_enrollment).collect()
    }

    /// Advance the enrollment's current-level pointer to the given level,
    /// but only forward: the update applies when the pointer is unset or
    /// points at a level whose order is at or below the new level's.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn advance_current_level(
        &self,
        user_id: Uuid,
        path_id: Uuid,
        level_id: Uuid,
        level_order: i64,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE enrollments SET current_level_id = $1
            WHERE user_id = $2 AND path_id = $3
              AND (
                current_level_id IS NULL
                OR (SELECT sort_order FROM journey_levels WHERE id = current_level_id) <= $4
              )
            ",
        )
        .bind(level_id.to_string())
        .bind(user_id.to_string())
        .bind(path_id.to_string())
        .bind(level_order)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to advance current level: {e}")))?;
        Ok(())
    }

    /// Recompute and store the enrollment's cached percentage from the
    /// path's published lessons. Stamps `completed_at` the first time the
    /// percentage reaches 100; never clears it.
    ///
    /// Returns the new percentage, or None when the user is not enrolled
    /// in the path.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn refresh_enrollment_progress(
        &self,
        user_id: Uuid,
        path_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<i64>> {
        if self.get_enrollment(user_id, path_id).await?.is_none() {
            return Ok(None);
        }

        let (done, total) = self.path_lesson_counts(user_id, path_id).await?;
        let percentage = if total == 0 { 0 } else { done * 100 / total };

        sqlx::query(
            r"
            UPDATE enrollments
            SET progress_percentage = $1,
                completed_at = CASE
                    WHEN $1 >= 100 AND completed_at IS NULL THEN $2
                    ELSE completed_at
                END
            WHERE user_id = $3 AND path_id = $4
            ",
        )
        .bind(percentage)
        .bind(now)
        .bind(user_id.to_string())
        .bind(path_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to refresh enrollment: {e}")))?;

        Ok(Some(percentage))
    }

    fn row_to_lesson_progress(row: &SqliteRow) -> AppResult<LessonProgress> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let lesson_id: String = row.get("lesson_id");
        let status: String = row.get("status");
        Ok(LessonProgress {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid progress id in database: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            lesson_id: Uuid::parse_str(&lesson_id)
                .map_err(|e| AppError::internal(format!("Invalid lesson id in database: {e}")))?,
            status: LessonStatus::parse(&status),
            score: row.get("score"),
            completed_at: row.get("completed_at"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_level_progress(row: &SqliteRow) -> AppResult<LevelProgress> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let level_id: String = row.get("level_id");
        Ok(LevelProgress {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid progress id in database: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            level_id: Uuid::parse_str(&level_id)
                .map_err(|e| AppError::internal(format!("Invalid level id in database: {e}")))?,
            completed_at: row.get("completed_at"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_enrollment(row: &SqliteRow) -> AppResult<Enrollment> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let path_id: String = row.get("path_id");
        let current_level_id: Option<String> = row.get("current_level_id");
        Ok(Enrollment {
            id: Uuid::parse_str(&id).map_err(|e| {
                AppError::internal(format!("Invalid enrollment id in database: {e}"))
            })?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            path_id: Uuid::parse_str(&path_id)
                .map_err(|e| AppError::internal(format!("Invalid path id in database: {e}")))?,
            current_level_id: current_level_id
                .map(|s| {
                    Uuid::parse_str(&s).map_err(|e| {
                        AppError::internal(format!("Invalid level id in database: {e}"))
                    })
                })
                .transpose()?,
            progress_percentage: row.get("progress_percentage"),
            is_active: row.get("is_active"),
            enrolled_at: row.get("enrolled_at"),
            completed_at: row.get("completed_at"),
        })
    }
}
