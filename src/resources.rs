// ABOUTME: Shared server resource container passed to every route module
// ABOUTME: Bundles the database, auth manager, tracker, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::tracker::ProgressTracker;
use std::sync::Arc;

/// Dependency bundle handed to route handlers via axum state
pub struct ServerResources {
    /// Shared database pool
    pub database: Arc<Database>,
    /// JWT issuing and validation
    pub auth: AuthManager,
    /// The progress tracking service
    pub tracker: ProgressTracker,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Assemble the resource bundle
    #[must_use]
    pub fn new(database: Arc<Database>, config: ServerConfig) -> Self {
        let auth = AuthManager::new(&config.jwt_secret, config.jwt_expiry_hours);
        let tracker = ProgressTracker::new(Arc::clone(&database), config.activation_policy);
        Self {
            database,
            auth,
            tracker,
            config,
        }
    }
}
