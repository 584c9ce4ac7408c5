// ABOUTME: Certificate database operations
// ABOUTME: Certificates are issued at most once per (user, kind) milestone
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Certificate;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Issue a certificate exactly once per (user, kind).
    ///
    /// Returns true only for the call that created the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn issue_certificate_once(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        serial: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO certificates (id, user_id, kind, title, serial, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(user_id, kind) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(kind)
        .bind(title)
        .bind(serial)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to issue certificate: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's certificates, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_certificates(&self, user_id: Uuid) -> AppResult<Vec<Certificate>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, kind, title, serial, issued_at
            FROM certificates WHERE user_id = $1 ORDER BY issued_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list certificates: {e}")))?;

        rows.iter().map(Self::row_to_certificate).collect()
    }

    fn row_to_certificate(row: &SqliteRow) -> AppResult<Certificate> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        Ok(Certificate {
            id: Uuid::parse_str(&id).map_err(|e| {
                AppError::internal(format!("Invalid certificate id in database: {e}"))
            })?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            kind: row.get("kind"),
            title: row.get("title"),
            serial: row.get("serial"),
            issued_at: row.get("issued_at"),
        })
    }
}
