// ABOUTME: Outreach routes: mission reports, baptisms, study groups, global counters
// ABOUTME: Verification and recompute are admin-only; the counters read is public
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::auth::AuthResult;
use crate::errors::AppError;
use crate::models::{BaptismRecord, MissionReport, StudyGroup};
use crate::resources::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Mission report submission body
#[derive(Debug, Deserialize)]
struct CreateMissionRequest {
    title: String,
    souls_reached: i64,
    baptisms_performed: i64,
    report_date: Option<DateTime<Utc>>,
}

/// Baptism record submission body
#[derive(Debug, Deserialize)]
struct CreateBaptismRequest {
    candidate_name: String,
    baptism_date: Option<DateTime<Utc>>,
}

/// Study group creation body
#[derive(Debug, Deserialize)]
struct CreateGroupRequest {
    name: String,
}

/// Query parameters for the counters read
#[derive(Debug, Deserialize)]
struct CountersQuery {
    #[serde(default)]
    recompute: bool,
}

/// Outreach routes
pub struct OutreachRoutes;

impl OutreachRoutes {
    /// Create all outreach routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/outreach/missions", post(Self::handle_create_mission))
            .route(
                "/api/outreach/missions/:report_id/verify",
                post(Self::handle_verify_mission),
            )
            .route("/api/outreach/baptisms", post(Self::handle_create_baptism))
            .route("/api/outreach/groups", post(Self::handle_create_group))
            .route("/api/outreach/counters", get(Self::handle_counters))
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// Authenticate and require the admin flag
    async fn require_admin(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth = Self::authenticate(headers, resources)?;
        let user = resources.database.get_user_required(auth.user_id).await?;
        if !user.is_admin {
            return Err(AppError::forbidden("Administrator access required"));
        }
        Ok(auth)
    }

    /// Submit an (unverified) mission report
    async fn handle_create_mission(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateMissionRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        if request.souls_reached < 0 || request.baptisms_performed < 0 {
            return Err(AppError::invalid_input("Counts cannot be negative"));
        }

        let now = Utc::now();
        let report = MissionReport {
            id: Uuid::new_v4(),
            missionary_id: auth.user_id,
            title: request.title,
            souls_reached: request.souls_reached,
            baptisms_performed: request.baptisms_performed,
            is_verified: false,
            verified_by: None,
            report_date: request.report_date.unwrap_or(now),
            created_at: now,
        };
        resources.database.create_mission_report(&report).await?;
        Ok((StatusCode::CREATED, Json(report)).into_response())
    }

    /// Verify a mission report (admin). Only the first verification
    /// applies the report's totals to the counters.
    async fn handle_verify_mission(
        State(resources): State<Arc<ServerResources>>,
        Path(report_id): Path<Uuid>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::require_admin(&headers, &resources).await?;

        resources
            .database
            .get_mission_report(report_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Mission report {report_id}")))?;

        let transitioned = resources
            .database
            .verify_mission_report(report_id, auth.user_id)
            .await?;
        Ok((
            StatusCode::OK,
            Json(json!({ "verified": true, "newly_verified": transitioned })),
        )
            .into_response())
    }

    /// Record a baptism
    async fn handle_create_baptism(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateBaptismRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        if request.candidate_name.trim().is_empty() {
            return Err(AppError::invalid_input("Candidate name is required"));
        }

        let now = Utc::now();
        let record = BaptismRecord {
            id: Uuid::new_v4(),
            missionary_id: auth.user_id,
            candidate_name: request.candidate_name,
            baptism_date: request.baptism_date.unwrap_or(now),
            created_at: now,
        };
        resources.database.create_baptism_record(&record).await?;
        Ok((StatusCode::CREATED, Json(record)).into_response())
    }

    /// Create an active study group
    async fn handle_create_group(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateGroupRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Group name is required"));
        }

        let group = StudyGroup {
            id: Uuid::new_v4(),
            leader_id: auth.user_id,
            name: request.name,
            is_active: true,
            created_at: Utc::now(),
        };
        resources.database.create_study_group(&group).await?;
        Ok((StatusCode::CREATED, Json(group)).into_response())
    }

    /// Read the global counters. `?recompute=true` (admin) re-derives the
    /// recomputable counts from base tables first.
    async fn handle_counters(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<CountersQuery>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let counters = if query.recompute {
            Self::require_admin(&headers, &resources).await?;
            resources.database.recompute_counters().await?
        } else {
            resources.database.get_counters().await?
        };
        Ok((StatusCode::OK, Json(counters)).into_response())
    }
}
