// ABOUTME: Journey catalog database operations for paths, levels, and lessons
// ABOUTME: Slugs are generated on insert when absent; ordering drives the progress math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{slugify, JourneyPath, Lesson, Level, Stage};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create a journey path. An empty slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including stage or slug
    /// uniqueness violations.
    pub async fn create_path(&self, path: &JourneyPath) -> AppResult<Uuid> {
        let slug = if path.slug.is_empty() {
            slugify(&path.name)
        } else {
            path.slug.clone()
        };

        sqlx::query(
            r"
            INSERT INTO journey_paths (
                id, name, stage, slug, description, sort_order, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(path.id.to_string())
        .bind(&path.name)
        .bind(path.stage.as_str())
        .bind(&slug)
        .bind(&path.description)
        .bind(path.sort_order)
        .bind(path.is_active)
        .bind(path.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create path: {e}")))?;

        Ok(path.id)
    }

    /// Create a level. An empty slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_level(&self, level: &Level) -> AppResult<Uuid> {
        let slug = if level.slug.is_empty() {
            slugify(&level.name)
        } else {
            level.slug.clone()
        };

        sqlx::query(
            r"
            INSERT INTO journey_levels (
                id, path_id, name, slug, description, sort_order,
                required_score, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(level.id.to_string())
        .bind(level.path_id.to_string())
        .bind(&level.name)
        .bind(&slug)
        .bind(&level.description)
        .bind(level.sort_order)
        .bind(level.required_score)
        .bind(level.is_active)
        .bind(level.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create level: {e}")))?;

        Ok(level.id)
    }

    /// Create a lesson. An empty slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_lesson(&self, lesson: &Lesson) -> AppResult<Uuid> {
        let slug = if lesson.slug.is_empty() {
            slugify(&lesson.title)
        } else {
            lesson.slug.clone()
        };

        sqlx::query(
            r"
            INSERT INTO journey_lessons (
                id, level_id, title, slug, description, content,
                sort_order, points_value, is_published, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(lesson.id.to_string())
        .bind(lesson.level_id.to_string())
        .bind(&lesson.title)
        .bind(&slug)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(lesson.sort_order)
        .bind(lesson.points_value)
        .bind(lesson.is_published)
        .bind(lesson.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create lesson: {e}")))?;

        Ok(lesson.id)
    }

    /// Get a path by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_path(&self, path_id: Uuid) -> AppResult<Option<JourneyPath>> {
        let row = sqlx::query(
            r"
            SELECT id, name, stage, slug, description, sort_order, is_active, created_at
            FROM journey_paths WHERE id = $1
            ",
        )
        .bind(path_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get path: {e}")))?;

        row.map(|row| Self::row_to_path(&row)).transpose()
    }

    /// List active paths ordered for display
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_active_paths(&self) -> AppResult<Vec<JourneyPath>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, stage, slug, description, sort_order, is_active, created_at
            FROM journey_paths WHERE is_active = TRUE ORDER BY sort_order
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list paths: {e}")))?;

        rows.iter().map(Self::row_to_path).collect()
    }

    /// Get a level by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_level(&self, level_id: Uuid) -> AppResult<Option<Level>> {
        let row = sqlx::query(
            r"
            SELECT id, path_id, name, slug, description, sort_order,
                   required_score, is_active, created_at
            FROM journey_levels WHERE id = $1
            ",
        )
        .bind(level_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get level: {e}")))?;

        row.map(|row| Self::row_to_level(&row)).transpose()
    }

    /// List active levels in a path, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_levels(&self, path_id: Uuid) -> AppResult<Vec<Level>> {
        let rows = sqlx::query(
            r"
            SELECT id, path_id, name, slug, description, sort_order,
                   required_score, is_active, created_at
            FROM journey_levels WHERE path_id = $1 AND is_active = TRUE
            ORDER BY sort_order
            ",
        )
        .bind(path_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list levels: {e}")))?;

        rows.iter().map(Self::row_to_level).collect()
    }

    /// List all active levels across active paths, path order first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_all_active_levels(&self) -> AppResult<Vec<Level>> {
        let rows = sqlx::query(
            r"
            SELECT l.id, l.path_id, l.name, l.slug, l.description, l.sort_order,
                   l.required_score, l.is_active, l.created_at
            FROM journey_levels l
            JOIN journey_paths p ON p.id = l.path_id
            WHERE l.is_active = TRUE AND p.is_active = TRUE
            ORDER BY p.sort_order, l.sort_order
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list levels: {e}")))?;

        rows.iter().map(Self::row_to_level).collect()
    }

    /// Get a lesson by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_lesson(&self, lesson_id: Uuid) -> AppResult<Option<Lesson>> {
        let row = sqlx::query(
            r"
            SELECT id, level_id, title, slug, description, content,
                   sort_order, points_value, is_published, created_at
            FROM journey_lessons WHERE id = $1
            ",
        )
        .bind(lesson_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get lesson: {e}")))?;

        row.map(|row| Self::row_to_lesson(&row)).transpose()
    }

    /// List published lessons in a level, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_published_lessons(&self, level_id: Uuid) -> AppResult<Vec<Lesson>> {
        let rows = sqlx::query(
            r"
            SELECT id, level_id, title, slug, description, content,
                   sort_order, points_value, is_published, created_at
            FROM journey_lessons WHERE level_id = $1 AND is_published = TRUE
            ORDER BY sort_order
            ",
        )
        .bind(level_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list lessons: {e}")))?;

        rows.iter().map(Self::row_to_lesson).collect()
    }

    /// Count published lessons in a level
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn published_lesson_count(&self, level_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM journey_lessons WHERE level_id = $1 AND is_published = TRUE",
        )
        .bind(level_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count lessons: {e}")))?;
        Ok(row.get("n"))
    }

    fn row_to_path(row: &SqliteRow) -> AppResult<JourneyPath> {
        let id: String = row.get("id");
        let stage: String = row.get("stage");
        Ok(JourneyPath {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid path id in database: {e}")))?,
            name: row.get("name"),
            stage: Stage::parse(&stage),
            slug: row.get("slug"),
            description: row.get("description"),
            sort_order: row.get("sort_order"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_level(row: &SqliteRow) -> AppResult<Level> {
        let id: String = row.get("id");
        let path_id: String = row.get("path_id");
        Ok(Level {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid level id in database: {e}")))?,
            path_id: Uuid::parse_str(&path_id)
                .map_err(|e| AppError::internal(format!("Invalid path id in database: {e}")))?,
            name: row.get("name"),
            slug: row.get("slug"),
            description: row.get("description"),
            sort_order: row.get("sort_order"),
            required_score: row.get("required_score"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_lesson(row: &SqliteRow) -> AppResult<Lesson> {
        let id: String = row.get("id");
        let level_id: String = row.get("level_id");
        Ok(Lesson {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid lesson id in database: {e}")))?,
            level_id: Uuid::parse_str(&level_id)
                .map_err(|e| AppError::internal(format!("Invalid level id in database: {e}")))?,
            title: row.get("title"),
            slug: row.get("slug"),
            description: row.get("description"),
            content: row.get("content"),
            sort_order: row.get("sort_order"),
            points_value: row.get("points_value"),
            is_published: row.get("is_published"),
            created_at: row.get("created_at"),
        })
    }
}
