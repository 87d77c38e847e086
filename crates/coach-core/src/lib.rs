// ABOUTME: Core types and constants for the daily coaching pipeline
// ABOUTME: Foundation crate with error handling, telemetry models, and physiological defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coach Core
//!
//! Foundation crate providing shared types for the daily coaching pipeline.
//! This crate is designed to change infrequently so the scoring engine and the
//! pipeline crate can compile against a stable set of models.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **models**: Daily biometric snapshot, activity records, and telemetry bundles
//! - **constants**: Physiological defaults shared by scoring and parsing

/// Unified error handling system with standard error codes
pub mod errors;

/// Daily telemetry models (biometrics, sleep, activities)
pub mod models;

/// Physiological defaults and scoring constants
pub mod constants;

pub use errors::{AppError, AppResult, ErrorCode};
pub use models::{
    ActivityRecord, BiometricSnapshot, DailyTelemetry, RespirationSummary, SleepStages,
    Spo2Summary,
};
