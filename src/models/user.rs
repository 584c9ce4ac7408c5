// ABOUTME: User account model
// ABOUTME: Identity anchor owning progress records, enrollments, and a referral
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across the platform
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account is active
    pub is_active: bool,
    /// Whether the email address has been verified
    pub email_verified: bool,
    /// Whether the user has administrative privileges
    pub is_admin: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last authenticated activity
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new active, unverified, non-admin user
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            is_active: true,
            email_verified: false,
            is_admin: false,
            created_at: now,
            last_active: now,
        }
    }
}
