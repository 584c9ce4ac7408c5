// ABOUTME: Journey catalog and enrollment routes
// ABOUTME: Public catalog listing; authenticated get-or-create enrollment
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
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Journey catalog routes
pub struct JourneyRoutes;

impl JourneyRoutes {
    /// Create all journey routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/journeys", get(Self::handle_list_journeys))
            .route("/api/journeys/:path_id/enroll", post(Self::handle_enroll))
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// List active paths with their levels and published lesson counts
    async fn handle_list_journeys(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let paths = resources.database.list_active_paths().await?;

        let mut payload = Vec::with_capacity(paths.len());
        for path in paths {
            let levels = resources.database.list_levels(path.id).await?;
            let mut level_entries = Vec::with_capacity(levels.len());
            for level in levels {
                let total_lessons = resources.database.published_lesson_count(level.id).await?;
                level_entries.push(json!({
                    "id": level.id,
                    "name": level.name,
                    "slug": level.slug,
                    "description": level.description,
                    "sort_order": level.sort_order,
                    "required_score": level.required_score,
                    "total_lessons": total_lessons,
                }));
            }
            payload.push(json!({
                "id": path.id,
                "name": path.name,
                "stage": path.stage,
                "slug": path.slug,
                "description": path.description,
                "sort_order": path.sort_order,
                "levels": level_entries,
            }));
        }

        Ok((StatusCode::OK, Json(json!({ "journeys": payload }))).into_response())
    }

    /// Enroll the caller in a path (get-or-create)
    async fn handle_enroll(
        State(resources): State<Arc<ServerResources>>,
        Path(path_id): Path<Uuid>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let path = resources
            .database
            .get_path(path_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::not_found(format!("Path {path_id}")))?;

        let enrollment = resources.database.enroll(auth.user_id, path.id).await?;
        Ok((StatusCode::OK, Json(enrollment)).into_response())
    }
}
