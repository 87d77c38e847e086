// ABOUTME: Readiness scoring and training load algorithms for the daily coaching pipeline
// ABOUTME: Pure, side-effect-free functions safe for unrestricted concurrent reuse
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coach Intelligence
//!
//! Deterministic scoring for the coaching pipeline:
//!
//! - **readiness**: 0-100 readiness score from sleep, stress, body battery and
//!   optional SpO2 / sleep respiration readings
//! - **trimp**: Banister training impulse for a single activity
//! - **`training_load`**: 7-day rolling average TRIMP with a per-activity log
//!
//! None of these functions fail: missing inputs degrade through defaults and
//! weight redistribution.

/// Readiness score (0-100) with weight redistribution for missing readings
pub mod readiness;

/// Banister TRIMP for single activities
pub mod trimp;

/// Rolling 7-day training load accumulation
pub mod training_load;

pub use readiness::{ReadinessBreakdown, ReadinessScorer, ScoreWeights};
pub use training_load::{ActivityLoadEntry, TrainingLoadAccumulator, TrainingLoadSummary};
pub use trimp::banister_trimp;
