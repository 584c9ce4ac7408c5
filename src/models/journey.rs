// ABOUTME: Journey catalog models: paths, levels, and lessons
// ABOUTME: Administrator-managed rows; ordering and published flags drive the progress math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spiritual stage a path belongs to. One path exists per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Discover truth
    Seeker,
    /// Understand prophecy
    Scholar,
    /// Live and share the message
    Missionary,
}

impl Stage {
    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seeker => "seeker",
            Self::Scholar => "scholar",
            Self::Missionary => "missionary",
        }
    }

    /// Parse the stored string form; unknown values fall back to Seeker
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "scholar" => Self::Scholar,
            "missionary" => Self::Missionary,
            _ => Self::Seeker,
        }
    }
}

/// A named discipleship track grouping ordered levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyPath {
    /// Unique path identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Stage the path belongs to (unique per stage)
    pub stage: Stage,
    /// URL slug, generated from the name when not supplied
    pub slug: String,
    /// Description shown in the catalog
    pub description: String,
    /// Ordering relative to sibling paths
    pub sort_order: i64,
    /// Whether the path is visible in the catalog
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl JourneyPath {
    /// Create an active path; the slug is derived from the name
    #[must_use]
    pub fn new(name: &str, stage: Stage, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            stage,
            slug: slugify(name),
            description: String::new(),
            sort_order,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// An ordered grouping of lessons within a path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Unique level identifier
    pub id: Uuid,
    /// Owning path
    pub path_id: Uuid,
    /// Display name
    pub name: String,
    /// URL slug, unique within the path
    pub slug: String,
    /// Description shown in the catalog
    pub description: String,
    /// Ordering within the path; order 1 is the milestone level
    pub sort_order: i64,
    /// Completion threshold. Stored and exposed but not consulted by the
    /// aggregator, which counts completed lessons only.
    pub required_score: i64,
    /// Whether the level is visible
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Level {
    /// Create an active level; the slug is derived from the name
    #[must_use]
    pub fn new(path_id: Uuid, name: &str, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            path_id,
            name: name.to_owned(),
            slug: slugify(name),
            description: String::new(),
            sort_order,
            required_score: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A single lesson within a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier
    pub id: Uuid,
    /// Owning level
    pub level_id: Uuid,
    /// Lesson title
    pub title: String,
    /// URL slug, unique within the level
    pub slug: String,
    /// Short description
    pub description: String,
    /// Lesson body
    pub content: String,
    /// Ordering within the level
    pub sort_order: i64,
    /// Points granted on completion
    pub points_value: i64,
    /// Only published lessons count toward completion totals
    pub is_published: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    /// Create a published lesson; the slug is derived from the title
    #[must_use]
    pub fn new(level_id: Uuid, title: &str, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            level_id,
            title: title.to_owned(),
            slug: slugify(title),
            description: String::new(),
            content: String::new(),
            sort_order,
            points_value: 10,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Derive a URL slug from a display name: lowercase alphanumeric runs
/// joined by single dashes.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_dash = true;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Seeker Level 1"), "seeker-level-1");
        assert_eq!(slugify("  Walking -- With God!  "), "walking-with-god");
        assert_eq!(slugify("Élan"), "lan");
    }

    #[test]
    fn stage_round_trips() {
        for stage in [Stage::Seeker, Stage::Scholar, Stage::Missionary] {
            assert_eq!(Stage::parse(stage.as_str()), stage);
        }
        assert_eq!(Stage::parse("unknown"), Stage::Seeker);
    }
}
