// ABOUTME: Environment-based server configuration with sensible defaults
// ABOUTME: Reads HTTP port, database URL, JWT settings, and the referral activation policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::errors::{AppError, AppResult};
use crate::models::ActivationPolicy;
use std::env;

/// Default HTTP port when `HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default JWT expiry in hours when `JWT_EXPIRY_HOURS` is unset
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP listener binds to
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Secret used to sign JWT tokens
    pub jwt_secret: String,
    /// JWT token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Policy deciding when referral codes auto-activate
    pub activation_policy: ActivationPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults suitable for local
    /// development; malformed numeric values are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if `HTTP_PORT` or `JWT_EXPIRY_HOURS` is set but
    /// not a valid number.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT '{v}': {e}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:emmaus.db".to_owned());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-change-in-production".to_owned());

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(v) => v
                .parse::<i64>()
                .map_err(|e| AppError::config(format!("Invalid JWT_EXPIRY_HOURS '{v}': {e}")))?,
            Err(_) => DEFAULT_JWT_EXPIRY_HOURS,
        };

        let activation_policy = env::var("REFERRAL_ACTIVATION_POLICY")
            .map_or(ActivationPolicy::Hybrid, |v| ActivationPolicy::parse(&v));

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            jwt_expiry_hours,
            activation_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_empty() {
        // Environment variables are process-global; only assert on fields
        // with no matching variable set in the test environment.
        let config = ServerConfig {
            http_port: DEFAULT_HTTP_PORT,
            database_url: "sqlite::memory:".to_owned(),
            jwt_secret: "secret".to_owned(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            activation_policy: ActivationPolicy::Hybrid,
        };
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.jwt_expiry_hours, 24);
    }
}
