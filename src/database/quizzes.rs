// ABOUTME: Quiz storage: quizzes, ordered questions and choices, attempts
// ABOUTME: Attempt answers are serialized as JSON in a single column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AnswerMap, QuestionKind, Quiz, QuizAttempt, QuizChoice, QuizQuestion};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create a quiz for a lesson
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including the one-quiz-per-
    /// lesson uniqueness violation.
    pub async fn create_quiz(&self, quiz: &Quiz) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO quizzes (
                id, lesson_id, title, passing_score, max_attempts, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(quiz.id.to_string())
        .bind(quiz.lesson_id.to_string())
        .bind(&quiz.title)
        .bind(quiz.passing_score)
        .bind(quiz.max_attempts)
        .bind(quiz.is_active)
        .bind(quiz.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create quiz: {e}")))?;
        Ok(quiz.id)
    }

    /// Create a quiz question
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_quiz_question(&self, question: &QuizQuestion) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO quiz_questions (
                id, quiz_id, kind, question_text, sort_order, points, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(question.id.to_string())
        .bind(question.quiz_id.to_string())
        .bind(question.kind.as_str())
        .bind(&question.question_text)
        .bind(question.sort_order)
        .bind(question.points)
        .bind(question.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create quiz question: {e}")))?;
        Ok(question.id)
    }

    /// Create a quiz choice
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_quiz_choice(&self, choice: &QuizChoice) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO quiz_choices (id, question_id, choice_text, is_correct, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(choice.id.to_string())
        .bind(choice.question_id.to_string())
        .bind(&choice.choice_text)
        .bind(choice.is_correct)
        .bind(choice.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create quiz choice: {e}")))?;
        Ok(choice.id)
    }

    /// Get a quiz by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_quiz(&self, quiz_id: Uuid) -> AppResult<Option<Quiz>> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, title, passing_score, max_attempts, is_active, created_at
            FROM quizzes WHERE id = $1
            ",
        )
        .bind(quiz_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get quiz: {e}")))?;

        row.map(|row| Self::row_to_quiz(&row)).transpose()
    }

    /// Get the quiz attached to a lesson
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_quiz_by_lesson(&self, lesson_id: Uuid) -> AppResult<Option<Quiz>> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, title, passing_score, max_attempts, is_active, created_at
            FROM quizzes WHERE lesson_id = $1
            ",
        )
        .bind(lesson_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get quiz by lesson: {e}")))?;

        row.map(|row| Self::row_to_quiz(&row)).transpose()
    }

    /// List a quiz's questions in order, each with its choices in order
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails
    pub async fn list_quiz_questions(
        &self,
        quiz_id: Uuid,
    ) -> AppResult<Vec<(QuizQuestion, Vec<QuizChoice>)>> {
        let question_rows = sqlx::query(
            r"
            SELECT id, quiz_id, kind, question_text, sort_order, points, created_at
            FROM quiz_questions WHERE quiz_id = $1 ORDER BY sort_order
            ",
        )
        .bind(quiz_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list quiz questions: {e}")))?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            let question = Self::row_to_question(row)?;
            let choice_rows = sqlx::query(
                r"
                SELECT id, question_id, choice_text, is_correct, sort_order
                FROM quiz_choices WHERE question_id = $1 ORDER BY sort_order
                ",
            )
            .bind(question.id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list quiz choices: {e}")))?;

            let choices = choice_rows
                .iter()
                .map(Self::row_to_choice)
                .collect::<AppResult<Vec<_>>>()?;
            questions.push((question, choices));
        }
        Ok(questions)
    }

    /// Count a user's attempts at a quiz
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_quiz_attempts(&self, user_id: Uuid, quiz_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
        )
        .bind(user_id.to_string())
        .bind(quiz_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count quiz attempts: {e}")))?;
        Ok(row.get("n"))
    }

    /// Store a graded attempt
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails
    pub async fn insert_quiz_attempt(&self, attempt: &QuizAttempt) -> AppResult<Uuid> {
        let answers_json = serde_json::to_string(&attempt.answers)?;
        sqlx::query(
            r"
            INSERT INTO quiz_attempts (
                id, user_id, quiz_id, score, passed, answers, started_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(attempt.id.to_string())
        .bind(attempt.user_id.to_string())
        .bind(attempt.quiz_id.to_string())
        .bind(attempt.score)
        .bind(attempt.passed)
        .bind(answers_json)
        .bind(attempt.started_at)
        .bind(attempt.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store quiz attempt: {e}")))?;
        Ok(attempt.id)
    }

    /// List a user's attempts at a quiz, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_quiz_attempts(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> AppResult<Vec<QuizAttempt>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, quiz_id, score, passed, answers, started_at, completed_at
            FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2
            ORDER BY started_at DESC
            ",
        )
        .bind(user_id.to_string())
        .bind(quiz_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list quiz attempts: {e}")))?;

        rows.iter().map(Self::row_to_attempt).collect()
    }

    fn row_to_quiz(row: &SqliteRow) -> AppResult<Quiz> {
        let id: String = row.get("id");
        let lesson_id: String = row.get("lesson_id");
        Ok(Quiz {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid quiz id in database: {e}")))?,
            lesson_id: Uuid::parse_str(&lesson_id)
                .map_err(|e| AppError::internal(format!("Invalid lesson id in database: {e}")))?,
            title: row.get("title"),
            passing_score: row.get("passing_score"),
            max_attempts: row.get("max_attempts"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_question(row: &SqliteRow) -> AppResult<QuizQuestion> {
        let id: String = row.get("id");
        let quiz_id: String = row.get("quiz_id");
        let kind: String = row.get("kind");
        Ok(QuizQuestion {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid question id in database: {e}")))?,
            quiz_id: Uuid::parse_str(&quiz_id)
                .map_err(|e| AppError::internal(format!("Invalid quiz id in database: {e}")))?,
            kind: QuestionKind::parse(&kind),
            question_text: row.get("question_text"),
            sort_order: row.get("sort_order"),
            points: row.get("points"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_choice(row: &SqliteRow) -> AppResult<QuizChoice> {
        let id: String = row.get("id");
        let question_id: String = row.get("question_id");
        Ok(QuizChoice {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid choice id in database: {e}")))?,
            question_id: Uuid::parse_str(&question_id)
                .map_err(|e| AppError::internal(format!("Invalid question id in database: {e}")))?,
            choice_text: row.get("choice_text"),
            is_correct: row.get("is_correct"),
            sort_order: row.get("sort_order"),
        })
    }

    fn row_to_attempt(row: &SqliteRow) -> AppResult<QuizAttempt> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let quiz_id: String = row.get("quiz_id");
        let answers_json: String = row.get("answers");
        let answers: AnswerMap = serde_json::from_str(&answers_json)
            .map_err(|e| AppError::internal(format!("Invalid answers JSON in database: {e}")))?;
        Ok(QuizAttempt {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Invalid attempt id in database: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::internal(format!("Invalid user id in database: {e}")))?,
            quiz_id: Uuid::parse_str(&quiz_id)
                .map_err(|e| AppError::internal(format!("Invalid quiz id in database: {e}")))?,
            score: row.get("score"),
            passed: row.get("passed"),
            answers,
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
        })
    }
}
