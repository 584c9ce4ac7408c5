// ABOUTME: Route module organization for the Emmaus HTTP API
// ABOUTME: Centralized route definitions organized by domain with thin handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

//! Route module for the Emmaus server
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the database and service layers.

/// Authentication and account routes
pub mod auth;
/// Health check and system status routes
pub mod health;
/// Journey catalog and enrollment routes
pub mod journeys;
/// Mentorship: referral code, attach, mentees, rewards
pub mod mentorship;
/// Outreach records and global counters
pub mod outreach;
/// Progress snapshots and lesson completion
pub mod progress;
/// Quiz retrieval and attempt submission
pub mod quizzes;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use journeys::JourneyRoutes;
pub use mentorship::MentorshipRoutes;
pub use outreach::OutreachRoutes;
pub use progress::ProgressRoutes;
pub use quizzes::QuizRoutes;

use crate::resources::ServerResources;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full application router with tracing and CORS layers
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(JourneyRoutes::routes(Arc::clone(&resources)))
        .merge(ProgressRoutes::routes(Arc::clone(&resources)))
        .merge(MentorshipRoutes::routes(Arc::clone(&resources)))
        .merge(QuizRoutes::routes(Arc::clone(&resources)))
        .merge(OutreachRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
