// ABOUTME: Quiz models: one quiz per lesson, ordered questions and choices, attempts
// ABOUTME: Answers are stored as a question-id to chosen-choice-ids map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Submitted answers: question id to the set of chosen choice ids
pub type AnswerMap = HashMap<Uuid, Vec<Uuid>>;

/// Question kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// One or more correct choices among several
    MultipleChoice,
    /// Exactly two choices, one correct
    TrueFalse,
}

impl QuestionKind {
    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
        }
    }

    /// Parse the stored string form; unknown values read as multiple choice
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "true_false" => Self::TrueFalse,
            _ => Self::MultipleChoice,
        }
    }
}

/// A quiz attached to exactly one lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Row identifier
    pub id: Uuid,
    /// Owning lesson (unique)
    pub lesson_id: Uuid,
    /// Display title
    pub title: String,
    /// Minimum percent score to pass
    pub passing_score: i64,
    /// Maximum attempts per user
    pub max_attempts: i64,
    /// Whether the quiz accepts attempts
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Create an active quiz with the default thresholds
    #[must_use]
    pub fn new(lesson_id: Uuid, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            lesson_id,
            title: title.to_owned(),
            passing_score: 70,
            max_attempts: 3,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// One question within a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Row identifier
    pub id: Uuid,
    /// Owning quiz
    pub quiz_id: Uuid,
    /// Question kind
    pub kind: QuestionKind,
    /// Question text
    pub question_text: String,
    /// Ordering within the quiz
    pub sort_order: i64,
    /// Points this question is worth
    pub points: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// One selectable choice for a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizChoice {
    /// Row identifier
    pub id: Uuid,
    /// Owning question
    pub question_id: Uuid,
    /// Choice text
    pub choice_text: String,
    /// Whether this choice is part of the correct answer set
    pub is_correct: bool,
    /// Ordering within the question
    pub sort_order: i64,
}

/// One user attempt at a quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Row identifier
    pub id: Uuid,
    /// Attempting user
    pub user_id: Uuid,
    /// Quiz attempted
    pub quiz_id: Uuid,
    /// Percent score earned
    pub score: i64,
    /// Whether the score met the passing threshold
    pub passed: bool,
    /// Answers as submitted
    pub answers: AnswerMap,
    /// Attempt start time
    pub started_at: DateTime<Utc>,
    /// Attempt completion time
    pub completed_at: Option<DateTime<Utc>>,
}
