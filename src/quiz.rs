// ABOUTME: Quiz grading: set-equality comparison of chosen vs correct choices
// ABOUTME: Pure computation; storage and the completion chain live elsewhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::models::{AnswerMap, QuizChoice, QuizQuestion};
use std::collections::HashSet;
use uuid::Uuid;

/// Outcome of grading one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedQuiz {
    /// Floor percent of points earned, 0 for an empty quiz
    pub score: i64,
    /// Whether the score met the passing threshold
    pub passed: bool,
    /// Points earned
    pub earned_points: i64,
    /// Points available
    pub total_points: i64,
}

/// Grade submitted answers against a quiz's questions.
///
/// A question earns its points only when the submitted choice-id set
/// equals the correct choice-id set exactly; partial selections earn
/// nothing. Unanswered questions compare as the empty set.
#[must_use]
pub fn grade(
    questions: &[(QuizQuestion, Vec<QuizChoice>)],
    answers: &AnswerMap,
    passing_score: i64,
) -> GradedQuiz {
    let mut earned = 0;
    let mut total = 0;

    for (question, choices) in questions {
        total += question.points;

        let correct: HashSet<Uuid> = choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.id)
            .collect();
        let chosen: HashSet<Uuid> = answers
            .get(&question.id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        if !correct.is_empty() && chosen == correct {
            earned += question.points;
        }
    }

    let score = if total <= 0 { 0 } else { earned * 100 / total };
    GradedQuiz {
        score,
        passed: score >= passing_score,
        earned_points: earned,
        total_points: total,
    }
}
