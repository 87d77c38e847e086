// ABOUTME: Telemetry provider boundary supplying daily biometrics and recent activities
// ABOUTME: Garmin Connect payload parsing and a file-backed provider over exported day bundles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Telemetry Providers
//!
//! The coaching pipeline only needs one thing from a wearable platform: the
//! day's [`DailyTelemetry`] for a user, including activities from the trailing
//! training-load window. Providers translate platform payloads into that model;
//! missing fields degrade to absent values rather than errors.

pub mod file_provider;
pub mod garmin;

pub use file_provider::FileTelemetryProvider;
pub use garmin::GarminDailyExport;

use async_trait::async_trait;
use chrono::NaiveDate;
use coach_core::errors::AppResult;
use coach_core::models::DailyTelemetry;

use crate::users::UserProfile;

/// Source of daily wearable telemetry
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// Provider identifier for logging
    fn name(&self) -> &'static str;

    /// Telemetry for `user` on `date`, with activities covering the
    /// trailing training-load window that ends on `date`
    ///
    /// # Errors
    ///
    /// Returns an error when the data cannot be fetched or parsed.
    async fn fetch_daily(&self, user: &UserProfile, date: NaiveDate) -> AppResult<DailyTelemetry>;
}
