// ABOUTME: Mentorship service layer: rewards, activation policy, referral attachment
// ABOUTME: Cross-cutting triggers invoked from the tracker, login, and verification events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

/// Referral activation policy evaluator
pub mod activation;
/// Referral code attachment
pub mod referrals;
/// Mentor reward emission
pub mod rewards;
