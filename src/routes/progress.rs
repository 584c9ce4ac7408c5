// ABOUTME: Progress routes: lesson start/complete and progress snapshots
// ABOUTME: Mentee snapshots are gated on the caller being that mentee's mentor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::auth::AuthResult;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Progress routes
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/lessons/:lesson_id/start", post(Self::handle_start))
            .route(
                "/api/lessons/:lesson_id/complete",
                post(Self::handle_complete),
            )
            .route("/api/progress/me", get(Self::handle_my_progress))
            .route(
                "/api/progress/mentees/:mentee_id",
                get(Self::handle_mentee_progress),
            )
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// Mark a lesson opened
    async fn handle_start(
        State(resources): State<Arc<ServerResources>>,
        Path(lesson_id): Path<Uuid>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let progress = resources.tracker.start_lesson(auth.user_id, lesson_id).await?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    /// Mark a lesson complete, running the whole chain. The body is an
    /// optional JSON object with a `score` field; requests without a body
    /// are accepted.
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        Path(lesson_id): Path<Uuid>,
        headers: HeaderMap,
        body: Option<Json<Value>>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let score = body
            .as_ref()
            .and_then(|Json(value)| value.get("score"))
            .and_then(coerce_score);

        let progress = resources
            .tracker
            .complete_lesson(auth.user_id, lesson_id, score)
            .await?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    /// The caller's own progress snapshot
    async fn handle_my_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let snapshot = resources.tracker.snapshot(auth.user_id).await?;
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }

    /// A mentee's progress snapshot, visible only to their mentor
    async fn handle_mentee_progress(
        State(resources): State<Arc<ServerResources>>,
        Path(mentee_id): Path<Uuid>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let is_their_mentor = resources
            .database
            .get_mentorship_by_mentee(mentee_id)
            .await?
            .is_some_and(|m| m.mentor_id == auth.user_id);
        if !is_their_mentor {
            return Err(AppError::forbidden(
                "You are not this user's mentor",
            ));
        }

        resources.database.get_user_required(mentee_id).await?;
        let snapshot = resources.tracker.snapshot(mentee_id).await?;
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }
}

/// Permissive score parsing: an integer (or integer-looking string) in
/// 0..=100 is accepted; anything else reads as absent, leaving any prior
/// stored score untouched.
fn coerce_score(value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.filter(|score| (0..=100).contains(score))
}

#[cfg(test)]
mod tests {
    use super::coerce_score;
    use serde_json::json;

    #[test]
    fn valid_scores_pass_through() {
        assert_eq!(coerce_score(&json!(85)), Some(85));
        assert_eq!(coerce_score(&json!("70")), Some(70));
        assert_eq!(coerce_score(&json!(0)), Some(0));
        assert_eq!(coerce_score(&json!(100)), Some(100));
    }

    #[test]
    fn invalid_scores_read_as_absent() {
        assert_eq!(coerce_score(&json!(-1)), None);
        assert_eq!(coerce_score(&json!(101)), None);
        assert_eq!(coerce_score(&json!("ninety")), None);
        assert_eq!(coerce_score(&json!(null)), None);
        assert_eq!(coerce_score(&json!([85])), None);
        assert_eq!(coerce_score(&json!(85.5)), None);
    }
}
