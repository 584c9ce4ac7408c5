// ABOUTME: Referral code attachment: link a mentee to the mentor behind a code
// ABOUTME: Rejects inactive codes and self-referral; awards the signup milestone
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Mentorship, RewardKind};
use uuid::Uuid;

/// Attach a mentee to the mentor owning an active referral code.
///
/// The code must belong to an active referral and self-referral is
/// rejected. A mentee who already has a mentor keeps the existing link
/// (get-or-create on the unique mentee constraint). The signup reward is
/// awarded to the resulting mentor, idempotently.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown/inactive code or self-referral,
/// or any database failure.
pub async fn attach_referral(
    database: &Database,
    code: &str,
    mentee_id: Uuid,
) -> AppResult<Mentorship> {
    let referral = database
        .get_active_referral_by_code(code)
        .await?
        .ok_or_else(|| AppError::invalid_input("Referral code is invalid or inactive"))?;

    if referral.mentor_id == mentee_id {
        return Err(AppError::invalid_input("You cannot refer yourself"));
    }

    let mentorship = database
        .create_mentorship(referral.mentor_id, mentee_id)
        .await?;

    super::rewards::award_for_mentee_event(database, mentee_id, RewardKind::Signup, None).await?;

    Ok(mentorship)
}
