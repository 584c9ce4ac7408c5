// ABOUTME: Production logging setup built on tracing
// ABOUTME: Env-filtered subscriber with optional JSON output for structured collection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set, defaulting to `info` for
/// this crate and `warn` elsewhere. Setting `LOG_FORMAT=json` switches to
/// structured JSON output for log collectors.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,emmaus_server=info"));

    let json_output = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json_output {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
