// ABOUTME: Health check route
// ABOUTME: Unauthenticated liveness endpoint for deployment probes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health routes
    #[must_use]
    pub fn routes() -> Router {
        Router::new().route("/api/health", get(Self::handle_health))
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }
}
