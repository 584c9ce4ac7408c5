// ABOUTME: Mentorship database operations: referrals, mentor links, reward events
// ABOUTME: Reward insertion is get-or-create on the (mentor, mentee, event) triple
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ActivationMethod, Mentorship, Referral, RewardEvent, RewardKind, User,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create an inactive referral row for a user.
    ///
    /// The generated code may collide with an existing one; the unique
    /// constraint rejects the insert and the caller retries with a fresh
    /// code.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails after the retry budget, or on
    /// any other database failure.
    pub async fn create_referral(&self, mentor_id: Uuid) -> AppResult<Referral> {
        // A 6-character alphanumeric suffix collides rarely; a handful of
        // retries is plenty.
        for _ in 0..5 {
            let code = Referral::generate_code();
            let result = sqlx::query(
                r"
                INSERT INTO referrals (id, mentor_id, code, is_active, created_at)
                VALUES ($1, $2, $3, FALSE, $4)
                ON CONFLICT(code) DO NOTHING
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(mentor_id.to_string())
            .bind(&code)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create referral: {e}")))?;

            if result.rows_affected() > 0 {
                return self
                    .get_referral_by_mentor(mentor_id)
                    .await?
                    .ok_or_else(|| AppError::internal("Referral row missing after insert"));
            }
        }
        Err(AppError::internal(
            "Could not generate a unique referral code",
        ))
    }

    /// Get a user's referral row
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_referral_by_mentor(&self, mentor_id: Uuid) -> AppResult<Option<Referral>> {
        let row = sqlx::query(
            r"
            SELECT id, mentor_id, code, is_active, activation_method, activated_at, created_at
            FROM referrals WHERE mentor_id = $1
            ",
        )
        .bind(mentor_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get referral: {e}")))?;

        row.map(|row| Self::row_to_referral(&row)).transpose()
    }

    /// Look up an active referral by its code
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_active_referral_by_code(&self, code: &str) -> AppResult<Option<Referral>> {
        let row = sqlx::query(
            r"
            SELECT id, mentor_id, code, is_active, activation_method, activated_at, created_at
            FROM referrals WHERE code = $1 AND is_active = TRUE
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up referral code: {e}")))?;

        row.map(|row| Self::row_to_referral(&row)).transpose()
    }

    /// Activate a referral, stamping the method and time.
    ///
    /// Returns true if the row was newly activated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn activate_referral(
        &self,
        mentor_id: Uuid,
        method: ActivationMethod,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE referrals
            SET is_active = TRUE, activation_method = $1, activated_at = $2
            WHERE mentor_id = $3 AND is_active = FALSE
            ",
        )
        .bind(method.as_str())
        .bind(now)
        .bind(mentor_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to activate referral: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Create a mentor/mentee link if the mentee has none yet.
    ///
    /// Returns the link, whether newly created or pre-existing. A mentee
    /// who already has a different mentor keeps the existing link.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn create_mentorship(&self, mentor_id: Uuid, mentee_id: Uuid) -> AppResult<Mentorship> {
        sqlx::query(
            r"
            INSERT INTO mentorships (id, mentor_id, mentee_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(mentee_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(mentor_id.to_string())
        .bind(mentee_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create mentorship: {e}")))?;

        self.get_mentorship_by_mentee(mentee_id)
            .await?
            .ok_or_else(|| AppError::internal("Mentorship row missing after insert"))
    }

    /// Get the mentorship link for a mentee, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_mentorship_by_mentee(&self, mentee_id: Uuid) -> AppResult<Option<Mentorship>> {
        let row = sqlx::query(
            r"
            SELECT id, mentor_id, mentee_id, created_at
            FROM mentorships WHERE mentee_id = $1
            ",
        )
        .bind(mentee_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get mentorship: {e}")))?;

        row.map(|row| Self::row_to_mentorship(&row)).transpose()
    }

    /// List a mentor's mentees
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_mentees(&self, mentor_id: Uuid) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.display_name, u.password_hash,
                   u.is_active, u.email_verified, u.is_admin, u.created_at, u.last_active
            FROM mentorships m
            JOIN users u ON u.id = m.mentee_id
            WHERE m.mentor_id = $1
            ORDER BY m.created_at
            ",
        )
        .bind(mentor_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list mentees: {e}")))?;

        rows.iter().map(Self::row_to_user_pub).collect()
    }

    /// Record a reward event exactly once per (mentor, mentee, event).
    ///
    /// Returns true only for the call that created the row, making
    /// re-invocation from a retried request safe.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub async fn insert_reward_event_once(
        &self,
        mentor_id: Uuid,
        mentee_id: Uuid,
        event: RewardKind,
        points: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO reward_events (id, mentor_id, mentee_id, event, points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(mentor_id, mentee_id, event) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(mentor_id.to_string())
        .bind(mentee_id.to_string())
        .bind(event.as_str())
        .bind(points)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record reward event: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// List a mentor's reward events, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_reward_events(&self, mentor_id: Uuid) -> AppResult<Vec<RewardEvent>> {
        let rows = sqlx::query(
            r"
            SELECT id, mentor_id, mentee_id, event, points, created_at
            FROM reward_events WHERE mentor_id = $1 ORDER BY created_at DESC
            ",
        )
        .bind(mentor_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list reward events: {e}")))?;

        rows.iter().map(Self::row_to_reward_event).collect()
    }

    /// Sum of a mentor's reward points
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn total_reward_points(&self, mentor_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(points), 0) AS total FROM reward_events WHERE mentor_id = $1",
        )
        .bind(mentor_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum reward points: {e}")))?;
        Ok(row.get("total"))
    }

    fn row_to_referral(row: &SqliteRow) -> AppResult<Referral> {
        let id: String = row.get("id");
        let mentor_id: String = row.get("mentor_id");
        let method: Option<String> = row.get("activation_method");
        Ok(Referral {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid referral id in database: {e}")))?,
            mentor_id: Uuid::parse_str(&mentor_id)
                .map_err(|e| AppError::internal(format!("Invalid mentor id in database: {e}")))?,
            code: row.get("code"),
            is_active: row.get("is_active"),
            activation_method: method.as_deref().and_then(ActivationMethod::parse),
            activated_at: row.get("activated_at"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_mentorship(row: &SqliteRow) -> AppResult<Mentorship> {
        let id: String = row.get("id");
        let mentor_id: String = row.get("mentor_id");
        let mentee_id: String = row.get("mentee_id");
        Ok(Mentorship {
            id: Uuid::parse_str(&id).map_err(|e| {
                AppError::internal(format!("Invalid mentorship id in database: {e}"))
            })?,
            mentor_id: Uuid::parse_str(&mentor_id)
                .map_err(|e| AppError::internal(format!("Invalid mentor id in database: {e}")))?,
            mentee_id: Uuid::parse_str(&mentee_id)
                .map_err(|e| AppError::internal(format!("Invalid mentee id in database: {e}")))?,
            created_at: row.get("created_at"),
        })
    }

    fn row_to_reward_event(row: &SqliteRow) -> AppResult<RewardEvent> {
        let id: String = row.get("id");
        let mentor_id: String = row.get("mentor_id");
        let mentee_id: String = row.get("mentee_id");
        let event: String = row.get("event");
        Ok(RewardEvent {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid reward id in database: {e}")))?,
            mentor_id: Uuid::parse_str(&mentor_id)
                .map_err(|e| AppError::internal(format!("Invalid mentor id in database: {e}")))?,
            mentee_id: Uuid::parse_str(&mentee_id)
                .map_err(|e| AppError::internal(format!("Invalid mentee id in database: {e}")))?,
            event: RewardKind::parse(&event)
                .ok_or_else(|| AppError::internal(format!("Unknown reward event '{event}'")))?,
            points: row.get("points"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_user_pub(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");
        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            is_active: row.get("is_active"),
            email_verified: row.get("email_verified"),
            is_admin: row.get("is_admin"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }
}
