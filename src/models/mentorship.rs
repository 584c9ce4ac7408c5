// ABOUTME: Mentorship models: referral codes, mentor links, reward events
// ABOUTME: Reward uniqueness on (mentor, mentee, event) makes re-triggering safe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for generated referral codes
const REFERRAL_CODE_PREFIX: &str = "EMMAUS-";

/// How a referral became active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMethod {
    /// Activated by an administrator
    Manual,
    /// Auto-activated on email verification
    Email,
    /// Auto-activated on email verification plus level-1 completion
    EmailAndLevel1,
}

impl ActivationMethod {
    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Email => "email",
            Self::EmailAndLevel1 => "email+level1",
        }
    }

    /// Parse the stored string form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "email" => Some(Self::Email),
            "email+level1" => Some(Self::EmailAndLevel1),
            _ => None,
        }
    }
}

/// Server-wide policy deciding when referrals auto-activate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPolicy {
    /// Only administrators activate referrals
    Manual,
    /// Verified email is sufficient
    AutoEmail,
    /// Verified email and a completed level 1 are both required
    AutoEmailAndLevel1,
    /// Either of the two automatic criteria suffices
    #[default]
    Hybrid,
}

impl ActivationPolicy {
    /// Parse the configuration value (case-insensitive); unknown values
    /// fall back to the hybrid default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "MANUAL" => Self::Manual,
            "AUTO_EMAIL" => Self::AutoEmail,
            "AUTO_EMAIL_AND_LEVEL1" => Self::AutoEmailAndLevel1,
            _ => Self::Hybrid,
        }
    }
}

/// A mentor's shareable activation code.
///
/// One per user, created inactive at registration; mentees attribute
/// themselves to the mentor by presenting the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    /// Row identifier
    pub id: Uuid,
    /// User owning the code (acting as mentor)
    pub mentor_id: Uuid,
    /// Unique shareable code
    pub code: String,
    /// Whether the code can currently attach mentees
    pub is_active: bool,
    /// How the code became active, if it is
    pub activation_method: Option<ActivationMethod>,
    /// When the code became active
    pub activated_at: Option<DateTime<Utc>>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl Referral {
    /// Generate a candidate referral code. Uniqueness is enforced by the
    /// database; callers retry on collision.
    #[must_use]
    pub fn generate_code() -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect();
        format!("{REFERRAL_CODE_PREFIX}{token}")
    }
}

/// Mentor/mentee link. A mentee has at most one mentor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentorship {
    /// Row identifier
    pub id: Uuid,
    /// The mentor
    pub mentor_id: Uuid,
    /// The mentee (unique)
    pub mentee_id: Uuid,
    /// Link creation time
    pub created_at: DateTime<Utc>,
}

/// Milestone kinds that award points to a mentor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Mentee signed up via the referral code
    Signup,
    /// Mentee completed their first order-1 level
    Level1Complete,
    /// Mentee was baptized
    Baptism,
    /// Mentee completed every published lesson
    AllLevelsComplete,
    /// Mentee became a mentor themselves
    BecomesMentor,
}

impl RewardKind {
    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Level1Complete => "level1_complete",
            Self::Baptism => "baptism",
            Self::AllLevelsComplete => "all_levels_complete",
            Self::BecomesMentor => "becomes_mentor",
        }
    }

    /// Parse the stored string form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(Self::Signup),
            "level1_complete" => Some(Self::Level1Complete),
            "baptism" => Some(Self::Baptism),
            "all_levels_complete" => Some(Self::AllLevelsComplete),
            "becomes_mentor" => Some(Self::BecomesMentor),
            _ => None,
        }
    }

    /// Default points granted for this milestone
    #[must_use]
    pub const fn default_points(self) -> i64 {
        match self {
            Self::Signup => 10,
            Self::Level1Complete => 20,
            Self::Baptism => 50,
            Self::AllLevelsComplete => 100,
            Self::BecomesMentor => 30,
        }
    }
}

/// Idempotent ledger entry granting points to a mentor for a mentee
/// milestone. At most one row per (mentor, mentee, event) ever exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEvent {
    /// Row identifier
    pub id: Uuid,
    /// Mentor receiving the points
    pub mentor_id: Uuid,
    /// Mentee whose milestone triggered the award
    pub mentee_id: Uuid,
    /// Milestone kind
    pub event: RewardKind,
    /// Points granted
    pub points: i64,
    /// Award time
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_carry_prefix_and_length() {
        let code = Referral::generate_code();
        assert!(code.starts_with(REFERRAL_CODE_PREFIX));
        assert_eq!(code.len(), REFERRAL_CODE_PREFIX.len() + 6);
        assert!(code[REFERRAL_CODE_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn activation_policy_parses_known_values() {
        assert_eq!(ActivationPolicy::parse("manual"), ActivationPolicy::Manual);
        assert_eq!(
            ActivationPolicy::parse("AUTO_EMAIL"),
            ActivationPolicy::AutoEmail
        );
        assert_eq!(
            ActivationPolicy::parse("auto_email_and_level1"),
            ActivationPolicy::AutoEmailAndLevel1
        );
        assert_eq!(ActivationPolicy::parse("bogus"), ActivationPolicy::Hybrid);
    }

    #[test]
    fn reward_kind_round_trips_with_points() {
        for kind in [
            RewardKind::Signup,
            RewardKind::Level1Complete,
            RewardKind::Baptism,
            RewardKind::AllLevelsComplete,
            RewardKind::BecomesMentor,
        ] {
            assert_eq!(RewardKind::parse(kind.as_str()), Some(kind));
            assert!(kind.default_points() > 0);
        }
    }
}
