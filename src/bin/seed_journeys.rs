// ABOUTME: Journey catalog seeding utility for the Emmaus server
// ABOUTME: Creates the three stage paths with demo levels, lessons, and quizzes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

//! # Journey Catalog Seeder
//!
//! Seeds a demo catalog: one path per stage, two levels per path, a few
//! lessons per level, and a quiz on the first lesson of each path.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin seed-journeys
//! cargo run --bin seed-journeys -- --database-url sqlite:./data/emmaus.db
//! ```

use clap::Parser;
use emmaus_server::database::Database;
use emmaus_server::errors::AppResult;
use emmaus_server::logging;
use emmaus_server::models::{JourneyPath, Lesson, Level, Quiz, QuizChoice, QuizQuestion, Stage};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "seed-journeys",
    about = "Emmaus journey catalog seeder",
    long_about = "Create demo paths, levels, lessons, and quizzes"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

const PATHS: &[(&str, Stage, &[&str])] = &[
    (
        "Seeker",
        Stage::Seeker,
        &["Who Is God?", "The Story of Scripture", "Prayer Basics"],
    ),
    (
        "Scholar",
        Stage::Scholar,
        &["Reading Prophecy", "The Sanctuary", "History and Hope"],
    ),
    (
        "Missionary",
        Stage::Missionary,
        &["Sharing Your Story", "Leading a Study Group", "Going Out"],
    ),
];

#[tokio::main]
async fn main() -> AppResult<()> {
    logging::init();
    let args = SeedArgs::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:emmaus.db".to_owned());
    let database = Database::new(&database_url).await?;

    for (index, (name, stage, lesson_titles)) in PATHS.iter().enumerate() {
        let path = JourneyPath::new(name, *stage, index as i64 + 1);
        database.create_path(&path).await?;

        for level_order in 1..=2_i64 {
            let level = Level::new(path.id, &format!("{name} Level {level_order}"), level_order);
            database.create_level(&level).await?;

            for (lesson_index, title) in lesson_titles.iter().enumerate() {
                let lesson = Lesson::new(
                    level.id,
                    &format!("{title} (part {level_order})"),
                    lesson_index as i64 + 1,
                );
                database.create_lesson(&lesson).await?;

                // One quiz per path, on the very first lesson
                if level_order == 1 && lesson_index == 0 {
                    seed_quiz(&database, lesson.id, name).await?;
                }
            }
        }
        info!(path = *name, "seeded path");
    }

    info!("journey catalog seeded");
    Ok(())
}

async fn seed_quiz(database: &Database, lesson_id: Uuid, path_name: &str) -> AppResult<()> {
    let quiz = Quiz::new(lesson_id, &format!("{path_name} checkpoint"));
    database.create_quiz(&quiz).await?;

    let question = QuizQuestion {
        id: Uuid::new_v4(),
        quiz_id: quiz.id,
        kind: emmaus_server::models::QuestionKind::TrueFalse,
        question_text: "God cares about every person.".to_owned(),
        sort_order: 1,
        points: 1,
        created_at: chrono::Utc::now(),
    };
    database.create_quiz_question(&question).await?;

    for (order, (text, correct)) in [("True", true), ("False", false)].iter().enumerate() {
        let choice = QuizChoice {
            id: Uuid::new_v4(),
            question_id: question.id,
            choice_text: (*text).to_owned(),
            is_correct: *correct,
            sort_order: order as i64 + 1,
        };
        database.create_quiz_choice(&choice).await?;
    }
    Ok(())
}
