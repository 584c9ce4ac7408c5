// ABOUTME: Integration tests for referral code attachment
// ABOUTME: Covers code validation, self-referral, single-mentor rule, signup reward
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_database, create_test_user};
use emmaus_server::errors::ErrorCode;
use emmaus_server::mentorship::referrals;
use emmaus_server::models::{ActivationMethod, RewardKind};
use chrono::Utc;

#[tokio::test]
async fn attaching_links_the_mentee_and_awards_signup() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");

    let referral = db.create_referral(mentor.id).await.expect("referral");
    db.activate_referral(mentor.id, ActivationMethod::Manual, Utc::now())
        .await
        .expect("activate");

    let mentorship = referrals::attach_referral(&db, &referral.code, mentee.id)
        .await
        .expect("attach");
    assert_eq!(mentorship.mentor_id, mentor.id);
    assert_eq!(mentorship.mentee_id, mentee.id);

    let events = db.list_reward_events(mentor.id).await.expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, RewardKind::Signup);
    assert_eq!(events[0].points, 10);
}

#[tokio::test]
async fn inactive_or_unknown_codes_are_rejected() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");

    // Referral exists but was never activated
    let referral = db.create_referral(mentor.id).await.expect("referral");
    let err = referrals::attach_referral(&db, &referral.code, mentee.id)
        .await
        .expect_err("inactive code");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = referrals::attach_referral(&db, "EMMAUS-NOSUCH", mentee.id)
        .await
        .expect_err("unknown code");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn self_referral_is_rejected() {
    let db = create_test_database().await.expect("db");
    let mentor = create_test_user(&db, "mentor").await.expect("mentor");

    let referral = db.create_referral(mentor.id).await.expect("referral");
    db.activate_referral(mentor.id, ActivationMethod::Manual, Utc::now())
        .await
        .expect("activate");

    let err = referrals::attach_referral(&db, &referral.code, mentor.id)
        .await
        .expect_err("self referral");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn a_mentee_keeps_their_first_mentor() {
    let db = create_test_database().await.expect("db");
    let first = create_test_user(&db, "first").await.expect("first");
    let second = create_test_user(&db, "second").await.expect("second");
    let mentee = create_test_user(&db, "mentee").await.expect("mentee");

    for mentor in [&first, &second] {
        db.create_referral(mentor.id).await.expect("referral");
        db.activate_referral(mentor.id, ActivationMethod::Manual, Utc::now())
            .await
            .expect("activate");
    }

    let first_code = db
        .get_referral_by_mentor(first.id)
        .await
        .expect("query")
        .expect("referral")
        .code;
    let second_code = db
        .get_referral_by_mentor(second.id)
        .await
        .expect("query")
        .expect("referral")
        .code;

    let link = referrals::attach_referral(&db, &first_code, mentee.id)
        .await
        .expect("first attach");
    assert_eq!(link.mentor_id, first.id);

    // Presenting a second code keeps the existing link
    let link = referrals::attach_referral(&db, &second_code, mentee.id)
        .await
        .expect("second attach");
    assert_eq!(link.mentor_id, first.id, "single mentor per mentee");

    // The signup reward went to the actual mentor only
    assert_eq!(
        db.list_reward_events(first.id).await.expect("events").len(),
        1
    );
    assert!(db
        .list_reward_events(second.id)
        .await
        .expect("events")
        .is_empty());
}

#[tokio::test]
async fn referral_codes_are_unique_per_user() {
    let db = create_test_database().await.expect("db");
    let a = create_test_user(&db, "a").await.expect("a");
    let b = create_test_user(&db, "b").await.expect("b");

    let ra = db.create_referral(a.id).await.expect("referral a");
    let rb = db.create_referral(b.id).await.expect("referral b");
    assert_ne!(ra.code, rb.code);
    assert!(ra.code.starts_with("EMMAUS-"));
    assert!(!ra.is_active, "referrals start inactive");
}
