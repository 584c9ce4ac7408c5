// ABOUTME: Request and response types for authentication routes
// ABOUTME: DTOs for registration, login, and email verification endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use serde::{Deserialize, Serialize};

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User's email address
    pub email: String,
    /// User's password (will be hashed)
    pub password: String,
    /// Optional display name for the user
    pub display_name: Option<String>,
    /// Optional mentor referral code to attribute the signup
    pub referral_code: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Unique identifier for the newly created user
    pub user_id: String,
    /// The user's own (initially inactive) referral code
    pub referral_code: String,
    /// Success message for the registration
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User's email address
    pub email: String,
    /// User's password
    pub password: String,
}

/// User info for login responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Unique identifier for the user
    pub user_id: String,
    /// User's email address
    pub email: String,
    /// User's display name if set
    pub display_name: Option<String>,
    /// Whether the email address has been verified
    pub email_verified: bool,
    /// Whether the user has admin privileges
    pub is_admin: bool,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// JWT authentication token
    pub jwt_token: String,
    /// When the token expires (ISO 8601 format)
    pub expires_at: String,
    /// User information
    pub user: UserInfo,
}

/// Email verification response
#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    /// Whether the flag was newly set by this call
    pub newly_verified: bool,
    /// Whether the caller's referral was activated as a side effect
    pub referral_activated: bool,
}
