// ABOUTME: Main library entry point for the Emmaus discipleship platform API
// ABOUTME: Provides the journey catalog, progress tracking, mentorship rewards, and outreach counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

#![deny(unsafe_code)]

//! # Emmaus Server
//!
//! An HTTP API server for a discipleship-journey platform. Users enroll in
//! ordered paths of levels and lessons, mark lessons complete, and take
//! lesson quizzes; mentors share referral codes and earn idempotent reward
//! points when their mentees hit milestones; a singleton counters row
//! aggregates outreach activity across the platform.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Common data structures for the journey domain
//! - **Database**: `SQLite` persistence with per-domain operation modules
//! - **Tracker**: The progress core - ledger writes, level aggregation,
//!   enrollment projection, and milestone triggers, run synchronously
//!   within a single request
//! - **Mentorship**: Referral attachment, reward emission, and the
//!   activation policy evaluator
//! - **Routes**: Thin `HTTP` handlers organized by domain
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emmaus_server::config::environment::ServerConfig;
//! use emmaus_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Emmaus server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Common data models for the journey domain
pub mod models;

/// Configuration management
pub mod config;

/// Database management and per-domain persistence operations
pub mod database;

/// Authentication and token management
pub mod auth;

/// Progress tracking core: ledger, level aggregation, journey projection
pub mod tracker;

/// Referral attachment, reward emission, and activation policy
pub mod mentorship;

/// Quiz grading
pub mod quiz;

/// `HTTP` routes organized by domain
pub mod routes;

/// Shared server resource container for dependency injection
pub mod resources;

/// Production logging and structured output
pub mod logging;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;
