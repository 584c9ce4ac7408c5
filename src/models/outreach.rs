// ABOUTME: Outreach models: mission reports, baptism records, study groups
// ABOUTME: Includes the singleton global counters aggregate row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A missionary's field report. Verification by an administrator is what
/// feeds the global counters, and only the first unverified-to-verified
/// transition counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    /// Row identifier
    pub id: Uuid,
    /// Reporting missionary
    pub missionary_id: Uuid,
    /// Report title
    pub title: String,
    /// Souls reached during the mission
    pub souls_reached: i64,
    /// Baptisms performed during the mission
    pub baptisms_performed: i64,
    /// Whether an administrator verified the report
    pub is_verified: bool,
    /// Verifying administrator
    pub verified_by: Option<Uuid>,
    /// Date the mission took place
    pub report_date: DateTime<Utc>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// A baptism performed by a missionary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaptismRecord {
    /// Row identifier
    pub id: Uuid,
    /// Officiating missionary
    pub missionary_id: Uuid,
    /// Name of the baptized candidate
    pub candidate_name: String,
    /// Baptism date
    pub baptism_date: DateTime<Utc>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// A study group led by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGroup {
    /// Row identifier
    pub id: Uuid,
    /// Group leader
    pub leader_id: Uuid,
    /// Group name
    pub name: String,
    /// Whether the group is currently meeting
    pub is_active: bool,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Singleton aggregate row (id = 1) of platform-wide outreach totals.
///
/// Incremented by outreach events; `active_missionaries` and
/// `total_study_groups` are also fully recomputable from base tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalCounters {
    /// Sum of souls reached across verified mission reports
    pub total_souls_reached: i64,
    /// Baptisms from verified reports plus individual baptism records
    pub total_baptisms: i64,
    /// Count of verified mission reports
    pub total_mission_reports: i64,
    /// Count of active study groups
    pub total_study_groups: i64,
    /// Users holding a missionary certificate
    pub active_missionaries: i64,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}
