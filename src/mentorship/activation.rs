// ABOUTME: Referral activation policy evaluator
// ABOUTME: Re-checked on login, email verification, and level-1 completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{ActivationMethod, ActivationPolicy};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Try to activate a user's referral according to the configured policy.
///
/// Criteria:
/// - `AutoEmailAndLevel1`: verified email AND a completed order-1 level
/// - `AutoEmail`: verified email
/// - `Hybrid`: either of the above; the stronger criterion wins when both
///   hold, so the stored activation method reflects what was satisfied
/// - `Manual`: never auto-activates
///
/// Users without a referral row and already-active referrals return
/// false without touching anything.
///
/// # Errors
///
/// Returns an error if any database operation fails
pub async fn try_activate(
    database: &Database,
    user_id: Uuid,
    policy: ActivationPolicy,
    reason: &str,
) -> AppResult<bool> {
    let Some(referral) = database.get_referral_by_mentor(user_id).await? else {
        return Ok(false);
    };
    if referral.is_active {
        return Ok(false);
    }

    let email_ok = database
        .get_user(user_id)
        .await?
        .is_some_and(|u| u.email_verified);
    let level_ok = database.has_completed_order1_level(user_id).await?;

    let method = if email_ok
        && level_ok
        && matches!(
            policy,
            ActivationPolicy::AutoEmailAndLevel1 | ActivationPolicy::Hybrid
        ) {
        Some(ActivationMethod::EmailAndLevel1)
    } else if email_ok
        && matches!(policy, ActivationPolicy::AutoEmail | ActivationPolicy::Hybrid)
    {
        Some(ActivationMethod::Email)
    } else {
        None
    };

    let Some(method) = method else {
        return Ok(false);
    };

    let activated = database
        .activate_referral(user_id, method, Utc::now())
        .await?;
    if activated {
        debug!(%user_id, reason, method = method.as_str(), "referral activated");
    }
    Ok(activated)
}
