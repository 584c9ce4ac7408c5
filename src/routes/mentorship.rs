// ABOUTME: Mentorship routes: referral status, code attachment, mentees, rewards
// ABOUTME: Thin handlers over the mentorship service and database layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::auth::AuthResult;
use crate::errors::AppError;
use crate::mentorship::referrals;
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Attach request body
#[derive(Debug, Deserialize)]
struct AttachRequest {
    /// The mentor's referral code
    code: String,
}

/// Mentorship routes
pub struct MentorshipRoutes;

impl MentorshipRoutes {
    /// Create all mentorship routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/mentorship/referral", get(Self::handle_my_referral))
            .route("/api/mentorship/attach", post(Self::handle_attach))
            .route("/api/mentorship/mentees", get(Self::handle_mentees))
            .route("/api/mentorship/rewards", get(Self::handle_rewards))
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// The caller's own referral code and activation status
    async fn handle_my_referral(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let referral = resources
            .database
            .get_referral_by_mentor(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Referral"))?;
        Ok((StatusCode::OK, Json(referral)).into_response())
    }

    /// Attach the caller to the mentor behind a referral code
    async fn handle_attach(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<AttachRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let mentorship =
            referrals::attach_referral(&resources.database, &request.code, auth.user_id).await?;
        Ok((StatusCode::OK, Json(mentorship)).into_response())
    }

    /// The caller's mentees with overall completion figures
    async fn handle_mentees(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let mentees = resources.database.list_mentees(auth.user_id).await?;

        let mut payload = Vec::with_capacity(mentees.len());
        for mentee in mentees {
            let (done, total, percent) = resources.tracker.overall_completion(mentee.id).await?;
            payload.push(json!({
                "user_id": mentee.id,
                "email": mentee.email,
                "display_name": mentee.display_name,
                "lessons_completed": done,
                "total_lessons": total,
                "overall_percent": percent,
            }));
        }
        Ok((StatusCode::OK, Json(json!({ "mentees": payload }))).into_response())
    }

    /// The caller's reward events and point total
    async fn handle_rewards(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let events = resources.database.list_reward_events(auth.user_id).await?;
        let total_points = resources.database.total_reward_points(auth.user_id).await?;
        Ok((
            StatusCode::OK,
            Json(json!({ "events": events, "total_points": total_points })),
        )
            .into_response())
    }
}
