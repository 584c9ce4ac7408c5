// ABOUTME: Outreach database operations: mission reports, baptisms, study groups
// ABOUTME: Maintains the singleton global counters row (id = 1)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::progress::MISSIONARY_CERTIFICATE_KIND;
use crate::models::{BaptismRecord, GlobalCounters, MissionReport, StudyGroup};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create a mission report (unverified)
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_mission_report(&self, report: &MissionReport) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO mission_reports (
                id, missionary_id, title, souls_reached, baptisms_performed,
                is_verified, verified_by, report_date, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(report.id.to_string())
        .bind(report.missionary_id.to_string())
        .bind(&report.title)
        .bind(report.souls_reached)
        .bind(report.baptisms_performed)
        .bind(report.is_verified)
        .bind(report.verified_by.map(|id| id.to_string()))
        .bind(report.report_date)
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create mission report: {e}")))?;
        Ok(report.id)
    }

    /// Get a mission report by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_mission_report(&self, report_id: Uuid) -> AppResult<Option<MissionReport>> {
        let row = sqlx::query(
            r"
            SELECT id, missionary_id, title, souls_reached, baptisms_performed,
                   is_verified, verified_by, report_date, created_at
            FROM mission_reports WHERE id = $1
            ",
        )
        .bind(report_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get mission report: {e}")))?;

        row.map(|row| Self::row_to_mission_report(&row)).transpose()
    }

    /// Verify a mission report and apply its totals to the counters.
    ///
    /// Only the first unverified-to-verified transition counts; repeated
    /// verification requests are absorbed as no-ops. Returns true when the
    /// transition happened.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn verify_mission_report(
        &self,
        report_id: Uuid,
        verified_by: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE mission_reports
            SET is_verified = TRUE, verified_by = $1
            WHERE id = $2 AND is_verified = FALSE
            ",
        )
        .bind(verified_by.to_string())
        .bind(report_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to verify mission report: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let report = self
            .get_mission_report(report_id)
            .await?
            .ok_or_else(|| AppError::not_found("Mission report vanished during verification"))?;

        self.ensure_counters_row().await?;
        sqlx::query(
            r"
            UPDATE global_counters
            SET total_souls_reached = total_souls_reached + $1,
                total_baptisms = total_baptisms + $2,
                total_mission_reports = total_mission_reports + 1,
                updated_at = $3
            WHERE id = 1
            ",
        )
        .bind(report.souls_reached)
        .bind(report.baptisms_performed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update counters: {e}")))?;

        Ok(true)
    }

    /// Create a baptism record and bump the counter
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn create_baptism_record(&self, record: &BaptismRecord) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO baptism_records (id, missionary_id, candidate_name, baptism_date, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.missionary_id.to_string())
        .bind(&record.candidate_name)
        .bind(record.baptism_date)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create baptism record: {e}")))?;

        self.ensure_counters_row().await?;
        sqlx::query(
            "UPDATE global_counters SET total_baptisms = total_baptisms + 1, updated_at = $1 WHERE id = 1",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update counters: {e}")))?;

        Ok(record.id)
    }

    /// Create a study group; active groups bump the counter
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn create_study_group(&self, group: &StudyGroup) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO study_groups (id, leader_id, name, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(group.id.to_string())
        .bind(group.leader_id.to_string())
        .bind(&group.name)
        .bind(group.is_active)
        .bind(group.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create study group: {e}")))?;

        if group.is_active {
            self.ensure_counters_row().await?;
            sqlx::query(
                "UPDATE global_counters SET total_study_groups = total_study_groups + 1, updated_at = $1 WHERE id = 1",
            )
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update counters: {e}")))?;
        }

        Ok(group.id)
    }

    /// Read the global counters row, creating it when absent
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn get_counters(&self) -> AppResult<GlobalCounters> {
        self.ensure_counters_row().await?;
        let row = sqlx::query(
            r"
            SELECT total_souls_reached, total_baptisms, total_mission_reports,
                   total_study_groups, active_missionaries, updated_at
            FROM global_counters WHERE id = 1
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read counters: {e}")))?;

        Ok(Self::row_to_counters(&row))
    }

    /// Fully recompute the derived counts from base tables: active
    /// missionaries from issued certificates, study groups from active
    /// group rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails
    pub async fn recompute_counters(&self) -> AppResult<GlobalCounters> {
        self.ensure_counters_row().await?;
        sqlx::query(
            r"
            UPDATE global_counters
            SET active_missionaries = (
                    SELECT COUNT(*) FROM certificates WHERE kind = $1
                ),
                total_study_groups = (
                    SELECT COUNT(*) FROM study_groups WHERE is_active = TRUE
                ),
                updated_at = $2
            WHERE id = 1
            ",
        )
        .bind(MISSIONARY_CERTIFICATE_KIND)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to recompute counters: {e}")))?;

        self.get_counters().await
    }

    /// Get-or-create the singleton counters row
    async fn ensure_counters_row(&self) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO global_counters (
                id, total_souls_reached, total_baptisms, total_mission_reports,
                total_study_groups, active_missionaries, updated_at
            ) VALUES (1, 0, 0, 0, 0, 0, $1)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to initialize counters: {e}")))?;
        Ok(())
    }

    fn row_to_counters(row: &SqliteRow) -> GlobalCounters {
        GlobalCounters {
            total_souls_reached: row.get("total_souls_reached"),
            total_baptisms: row.get("total_baptisms"),
            total_mission_reports: row.get("total_mission_reports"),
            total_study_groups: row.get("total_study_groups"),
            active_missionaries: row.get("active_missionaries"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_mission_report(row: &SqliteRow) -> AppResult<MissionReport> {
        let id: String = row.get("id");
        let missionary_id: String = row.get("missionary_id");
        let verified_by: Option<String> = row.get("verified_by");
        Ok(MissionReport {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid report id in database: {e}")))?,
            missionary_id: Uuid::parse_str(&missionary_id).map_err(|e| {
                AppError::internal(format!("Invalid missionary id in database: {e}"))
            })?,
            title: row.get("title"),
            souls_reached: row.get("souls_reached"),
            baptisms_performed: row.get("baptisms_performed"),
            is_verified: row.get("is_verified"),
            verified_by: verified_by
                .map(|s| {
                    Uuid::parse_str(&s).map_err(|e| {
                        AppError::internal(format!("Invalid verifier id in database: {e}"))
                    })
                })
                .transpose()?,
            report_date: row.get("report_date"),
            created_at: row.get("created_at"),
        })
    }
}
