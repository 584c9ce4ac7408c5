// ABOUTME: Quiz routes: retrieval (correct flags stripped) and attempt submission
// ABOUTME: A passing attempt records the lesson completion through the tracker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use crate::auth::AuthResult;
use crate::errors::AppError;
use crate::models::{AnswerMap, QuizAttempt};
use crate::quiz::grade;
use crate::resources::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Attempt submission body
#[derive(Debug, Deserialize)]
struct SubmitAttemptRequest {
    /// Question id to chosen choice ids
    answers: AnswerMap,
}

/// Quiz routes
pub struct QuizRoutes;

impl QuizRoutes {
    /// Create all quiz routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/quizzes/lesson/:lesson_id", get(Self::handle_get_quiz))
            .route(
                "/api/quizzes/:quiz_id/attempts",
                post(Self::handle_submit_attempt),
            )
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// Fetch a lesson's quiz with questions and choices. Correct-answer
    /// flags are stripped from the payload.
    async fn handle_get_quiz(
        State(resources): State<Arc<ServerResources>>,
        Path(lesson_id): Path<Uuid>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authenticate(&headers, &resources)?;

        let quiz = resources
            .database
            .get_quiz_by_lesson(lesson_id)
            .await?
            .filter(|q| q.is_active)
            .ok_or_else(|| AppError::not_found(format!("Quiz for lesson {lesson_id}")))?;

        let questions = resources.database.list_quiz_questions(quiz.id).await?;
        let question_payload: Vec<_> = questions
            .iter()
            .map(|(question, choices)| {
                json!({
                    "id": question.id,
                    "kind": question.kind,
                    "question_text": question.question_text,
                    "sort_order": question.sort_order,
                    "points": question.points,
                    "choices": choices.iter().map(|c| json!({
                        "id": c.id,
                        "choice_text": c.choice_text,
                        "sort_order": c.sort_order,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();

        Ok((
            StatusCode::OK,
            Json(json!({
                "id": quiz.id,
                "lesson_id": quiz.lesson_id,
                "title": quiz.title,
                "passing_score": quiz.passing_score,
                "max_attempts": quiz.max_attempts,
                "questions": question_payload,
            })),
        )
            .into_response())
    }

    /// Grade and record an attempt. A passing attempt records the lesson
    /// completion with the attempt score, firing the normal chain.
    async fn handle_submit_attempt(
        State(resources): State<Arc<ServerResources>>,
        Path(quiz_id): Path<Uuid>,
        headers: HeaderMap,
        Json(request): Json<SubmitAttemptRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;

        let quiz = resources
            .database
            .get_quiz(quiz_id)
            .await?
            .filter(|q| q.is_active)
            .ok_or_else(|| AppError::not_found(format!("Quiz {quiz_id}")))?;

        let attempts_used = resources
            .database
            .count_quiz_attempts(auth.user_id, quiz.id)
            .await?;
        if attempts_used >= quiz.max_attempts {
            return Err(AppError::invalid_input(format!(
                "Maximum of {} attempts reached",
                quiz.max_attempts
            )));
        }

        let questions = resources.database.list_quiz_questions(quiz.id).await?;
        let graded = grade(&questions, &request.answers, quiz.passing_score);

        let now = Utc::now();
        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            quiz_id: quiz.id,
            score: graded.score,
            passed: graded.passed,
            answers: request.answers,
            started_at: now,
            completed_at: Some(now),
        };
        resources.database.insert_quiz_attempt(&attempt).await?;

        if graded.passed {
            resources
                .tracker
                .complete_lesson(auth.user_id, quiz.lesson_id, Some(graded.score))
                .await?;
        }

        Ok((
            StatusCode::OK,
            Json(json!({
                "attempt_id": attempt.id,
                "score": graded.score,
                "passed": graded.passed,
                "earned_points": graded.earned_points,
                "total_points": graded.total_points,
                "attempts_remaining": quiz.max_attempts - attempts_used - 1,
            })),
        )
            .into_response())
    }
}
