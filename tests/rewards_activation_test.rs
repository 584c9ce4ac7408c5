// ABOUTME: Integration tests for reward emission and referral activation policy
// ABOUTME: Covers the policy matrix, idempotence, and the missing-mentor no-op
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_database, create_test_user, create_tracker, link_mentorship, seed_level};
use emmaus_server::mentorship::{activation, rewards};
use emmaus_server::models::{ActivationMethod, ActivationPolicy, RewardKind, Stage};

#[tokio::test]
async fn rewards_are_idempotent_per_triple() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");
    link_mentorship(&db, mentor.id, mentee.id).await.expect("link");

    let first = rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Baptism, None)
        .await
        .expect("award");
    let second = rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Baptism, None)
        .await
        .expect("re-award");
    assert!(first);
    assert!(!second, "second award is absorbed");

    let events = db.list_reward_events(mentor.id).await.expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].points, 50);
    assert_eq!(
        db.total_reward_points(mentor.id).await.expect("points"),
        50
    );
}

#[tokio::test]
async fn different_events_accumulate_separately() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");
    link_mentorship(&db, mentor.id, mentee.id).await.expect("link");

    rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Signup, None)
        .await
        .expect("signup");
    rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Level1Complete, None)
        .await
        .expect("level1");
    rewards::award_for_mentee_event(&db, mentee.id, RewardKind::AllLevelsComplete, None)
        .await
        .expect("all");

    assert_eq!(
        db.total_reward_points(mentor.id).await.expect("points"),
        10 + 20 + 100
    );
}

#[tokio::test]
async fn reward_without_mentor_is_a_noop() {
    let db = create_test_database().await.expect("db");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");

    let awarded = rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Signup, None)
        .await
        .expect("no error");
    assert!(!awarded);
}

#[tokio::test]
async fn non_positive_point_overrides_skip_the_award() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");
    link_mentorship(&db, mentor.id, mentee.id).await.expect("link");

    let awarded = rewards::award_for_mentee_event(&db, mentee.id, RewardKind::Signup, Some(0))
        .await
        .expect("no error");
    assert!(!awarded);
    assert!(db.list_reward_events(mentor.id).await.expect("events").is_empty());
}

async fn verified_user_with_referral(
    db: &std::sync::Arc<emmaus_server::database::Database>,
) -> emmaus_server::models::User {
    let user = create_test_user(db, "mentor").await.expect("user");
    db.create_referral(user.id).await.expect("referral");
    db.mark_email_verified(user.id).await.expect("verify");
    user
}

#[tokio::test]
async fn manual_policy_never_auto_activates() {
    let db = create_test_database().await.expect("db");
    let user = verified_user_with_referral(&db).await;

    let activated = activation::try_activate(&db, user.id, ActivationPolicy::Manual, "login")
        .await
        .expect("evaluate");
    assert!(!activated);
    let referral = db
        .get_referral_by_mentor(user.id)
        .await
        .expect("query")
        .expect("referral");
    assert!(!referral.is_active);
}

#[tokio::test]
async fn auto_email_policy_activates_on_verified_email() {
    let db = create_test_database().await.expect("db");
    let user = verified_user_with_referral(&db).await;

    let activated = activation::try_activate(&db, user.id, ActivationPolicy::AutoEmail, "email")
        .await
        .expect("evaluate");
    assert!(activated);

    let referral = db
        .get_referral_by_mentor(user.id)
        .await
        .expect("query")
        .expect("referral");
    assert!(referral.is_active);
    assert_eq!(referral.activation_method, Some(ActivationMethod::Email));
    assert!(referral.activated_at.is_some());
}

#[tokio::test]
async fn auto_email_policy_waits_for_verification() {
    let db = create_test_database().await.expect("db");
    let user = create_test_user(&db, "mentor").await.expect("user");
    db.create_referral(user.id).await.expect("referral");

    let activated = activation::try_activate(&db, user.id, ActivationPolicy::AutoEmail, "login")
        .await
        .expect("evaluate");
    assert!(!activated);
}

#[tokio::test]
async fn email_and_level1_policy_requires_both() {
    let db = create_test_database().await.expect("db");
    let tracker = create_tracker(&db, ActivationPolicy::AutoEmailAndLevel1);
    let user = verified_user_with_referral(&db).await;

    // Email alone is not enough under this policy
    let activated =
        activation::try_activate(&db, user.id, ActivationPolicy::AutoEmailAndLevel1, "email")
            .await
            .expect("evaluate");
    assert!(!activated);

    // Completing the order-1 level fires the evaluator from the tracker
    let seeded = seed_level(&db, Stage::Seeker, 1, 1).await.expect("seed");
    tracker
        .complete_lesson(user.id, seeded.lessons[0].id, None)
        .await
        .expect("complete");

    let referral = db
        .get_referral_by_mentor(user.id)
        .await
        .expect("query")
        .expect("referral");
    assert!(referral.is_active);
    assert_eq!(
        referral.activation_method,
        Some(ActivationMethod::EmailAndLevel1)
    );
}

#[tokio::test]
async fn hybrid_policy_accepts_email_alone_and_prefers_the_stronger_method() {
    let db = create_test_database().await.expect("db");
    let tracker = create_tracker(&db, ActivationPolicy::Hybrid);

    // Email alone activates with the email method
    let email_only = verified_user_with_referral(&db).await;
    activation::try_activate(&db, email_only.id, ActivationPolicy::Hybrid, "email")
        .await
        .expect("evaluate");
    let referral = db
        .get_referral_by_mentor(email_only.id)
        .await
        .expect("query")
        .expect("referral");
    assert_eq!(referral.activation_method, Some(ActivationMethod::Email));

    // Email + level1 satisfied together records the stronger method
    let both = create_test_user(&db, "mentor2").await.expect("user");
    db.create_referral(both.id).await.expect("referral");
    let seeded = seed_level(&db, Stage::Scholar, 1, 1).await.expect("seed");
    tracker
        .complete_lesson(both.id, seeded.lessons[0].id, None)
        .await
        .expect("complete");
    db.mark_email_verified(both.id).await.expect("verify");

    let activated = activation::try_activate(&db, both.id, ActivationPolicy::Hybrid, "login")
        .await
        .expect("evaluate");
    assert!(activated);
    let referral = db
        .get_referral_by_mentor(both.id)
        .await
        .expect("query")
        .expect("referral");
    assert_eq!(
        referral.activation_method,
        Some(ActivationMethod::EmailAndLevel1)
    );
}

#[tokio::test]
async fn activation_is_a_noop_for_active_or_missing_referrals() {
    let db = create_test_database().await.expect("db");

    // No referral row at all
    let bare = create_test_user(&db, "bare").await.expect("user");
    assert!(
        !activation::try_activate(&db, bare.id, ActivationPolicy::Hybrid, "login")
            .await
            .expect("evaluate")
    );

    // Already active: evaluator returns false and leaves the method alone
    let user = verified_user_with_referral(&db).await;
    activation::try_activate(&db, user.id, ActivationPolicy::Hybrid, "email")
        .await
        .expect("first");
    let again = activation::try_activate(&db, user.id, ActivationPolicy::Hybrid, "login")
        .await
        .expect("second");
    assert!(!again);
}
