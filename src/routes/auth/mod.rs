// ABOUTME: Authentication routes: register, login, email verification
// ABOUTME: Login and verification re-run the referral activation evaluator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

/// Request and response DTOs
pub mod types;

pub use types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo};

use crate::auth::{hash_password, verify_password, AuthResult};
use crate::errors::AppError;
use crate::mentorship::{activation, referrals};
use crate::models::User;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};
use types::VerifyEmailResponse;

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/verify-email", post(Self::handle_verify_email))
            .with_state(resources)
    }

    /// Extract and authenticate the bearer token
    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// Handle user registration.
    ///
    /// Creates the account, its (inactive) referral code, and - when a
    /// mentor's referral code accompanies the signup - the mentorship
    /// link plus the signup reward.
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if request.email.is_empty() || !request.email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if request.password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }

        if resources
            .database
            .get_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::invalid_input(
                "Email already in use by another user",
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(request.email.clone(), password_hash, request.display_name);
        resources.database.create_user(&user).await?;

        // Every user gets a referral row of their own, inactive until the
        // activation policy is satisfied.
        let referral = resources.database.create_referral(user.id).await?;

        // A bad code does not fail the registration; the account already
        // exists and the attribution is best-effort.
        if let Some(code) = request
            .referral_code
            .as_deref()
            .filter(|c| !c.is_empty())
        {
            if let Err(e) = referrals::attach_referral(&resources.database, code, user.id).await {
                warn!(user_id = %user.id, "referral attach skipped: {}", e.message);
            }
        }

        info!(user_id = %user.id, "user registered");

        let response = RegisterResponse {
            user_id: user.id.to_string(),
            referral_code: referral.code,
            message: "Registration successful".to_owned(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle login: verify credentials, stamp activity, issue a token,
    /// and re-run the activation evaluator.
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        resources.database.update_last_active(user.id).await?;
        activation::try_activate(
            &resources.database,
            user.id,
            resources.config.activation_policy,
            "login",
        )
        .await?;

        let (jwt_token, expires_at) = resources.auth.generate_token(&user)?;
        let response = LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                display_name: user.display_name,
                email_verified: user.email_verified,
                is_admin: user.is_admin,
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Mark the caller's email verified and re-run the activation
    /// evaluator. Repeated verification is a no-op.
    async fn handle_verify_email(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let newly_verified = resources.database.mark_email_verified(auth.user_id).await?;
        let referral_activated = activation::try_activate(
            &resources.database,
            auth.user_id,
            resources.config.activation_policy,
            "email",
        )
        .await?;

        let response = VerifyEmailResponse {
            newly_verified,
            referral_activated,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
