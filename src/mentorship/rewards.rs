// ABOUTME: Mentor reward emission for mentee milestones
// ABOUTME: Idempotent per (mentor, mentee, event); a missing mentor is a silent no-op
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::RewardKind;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Award points to a mentee's mentor for a milestone.
///
/// Looks up the mentee's mentor; without one the trigger is a silent
/// no-op, not an error. Points default per [`RewardKind::default_points`]
/// unless overridden; a non-positive amount skips the award. The
/// (mentor, mentee, event) unique constraint makes re-invocation from a
/// retried request safe.
///
/// Returns true only when a new reward row was created.
///
/// # Errors
///
/// Returns an error if any database operation fails
pub async fn award_for_mentee_event(
    database: &Database,
    mentee_id: Uuid,
    event: RewardKind,
    points: Option<i64>,
) -> AppResult<bool> {
    let Some(mentorship) = database.get_mentorship_by_mentee(mentee_id).await? else {
        debug!(%mentee_id, event = event.as_str(), "no mentor assigned, skipping reward");
        return Ok(false);
    };

    let pts = points.unwrap_or_else(|| event.default_points());
    if pts <= 0 {
        return Ok(false);
    }

    let created = database
        .insert_reward_event_once(mentorship.mentor_id, mentee_id, event, pts, Utc::now())
        .await?;
    if created {
        debug!(
            mentor = %mentorship.mentor_id,
            mentee = %mentee_id,
            event = event.as_str(),
            points = pts,
            "reward event recorded"
        );
    }
    Ok(created)
}
