// ABOUTME: Configuration module organization
// ABOUTME: Environment-driven server configuration lives in environment.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

/// Environment-based server configuration
pub mod environment;

pub use environment::ServerConfig;
