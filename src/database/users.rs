// ABOUTME: User management database operations
// ABOUTME: Handles registration, lookup, email verification, and activity stamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create a user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already in use by another user
    /// - Database operation fails
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        let existing = self.get_user_by_email(&user.email).await?;
        if let Some(existing_user) = existing {
            if existing_user.id != user.id {
                return Err(AppError::invalid_input(
                    "Email already in use by another user",
                ));
            }
            // Update existing user in place
            sqlx::query(
                r"
                UPDATE users SET
                    display_name = $2,
                    password_hash = $3,
                    is_active = $4,
                    email_verified = $5,
                    is_admin = $6,
                    last_active = $7
                WHERE id = $1
                ",
            )
            .bind(user.id.to_string())
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.email_verified)
            .bind(user.is_admin)
            .bind(user.last_active)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;
        } else {
            sqlx::query(
                r"
                INSERT INTO users (
                    id, email, display_name, password_hash,
                    is_active, email_verified, is_admin, created_at, last_active
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.email_verified)
            .bind(user.is_admin)
            .bind(user.created_at)
            .bind(user.last_active)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;
        }

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let user_id_str = user_id.to_string();
        self.get_user_by_field("id", &user_id_str).await
    }

    /// Get a user by ID, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the user is missing
    pub async fn get_user_required(&self, user_id: Uuid) -> AppResult<User> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with id: {user_id}")))
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_by_field("email", email).await
    }

    /// Update the last-active stamp to now
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(chrono::Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;
        Ok(())
    }

    /// Mark a user's email as verified
    ///
    /// Returns true if the flag was newly set, false if it was already set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn mark_email_verified(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET email_verified = TRUE WHERE id = $1 AND email_verified = FALSE",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to mark email verified: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Internal implementation for getting a user
    async fn get_user_by_field(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, email, display_name, password_hash,
                   is_active, email_verified, is_admin, created_at, last_active
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by {field}: {e}")))?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Convert a database row to a User struct
    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
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
