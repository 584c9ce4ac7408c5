// ABOUTME: Domain model types shared across database, tracker, and route layers
// ABOUTME: Re-exports journey catalog, progress, mentorship, quiz, and outreach types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

/// Journey catalog: paths, levels, lessons
pub mod journey;
/// Referrals, mentorships, and reward events
pub mod mentorship;
/// Outreach records and the global counters row
pub mod outreach;
/// Progress ledger entries and derived completion facts
pub mod progress;
/// Lesson quizzes
pub mod quiz;
/// User accounts
pub mod user;

pub use journey::{slugify, JourneyPath, Lesson, Level, Stage};
pub use mentorship::{
    ActivationMethod, ActivationPolicy, Mentorship, Referral, RewardEvent, RewardKind,
};
pub use outreach::{BaptismRecord, GlobalCounters, MissionReport, StudyGroup};
pub use progress::{Certificate, Enrollment, LessonProgress, LessonStatus, LevelProgress};
pub use quiz::{AnswerMap, QuestionKind, Quiz, QuizAttempt, QuizChoice, QuizQuestion};
pub use user::User;
