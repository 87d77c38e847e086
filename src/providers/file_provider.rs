// ABOUTME: Telemetry provider reading exported Garmin day bundles from a directory tree
// ABOUTME: Layout is <root>/<user-slug>/<YYYY-MM-DD>.json with summary, sleep, spo2, respiration, activities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use coach_core::errors::{AppError, AppResult};
use coach_core::models::DailyTelemetry;
use tracing::{debug, instrument};

use super::garmin::GarminDailyExport;
use super::TelemetryProvider;
use crate::users::UserProfile;

/// Reads one JSON export bundle per user and day
#[derive(Debug, Clone)]
pub struct FileTelemetryProvider {
    root: PathBuf,
}

impl FileTelemetryProvider {
    /// Provider rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the bundle for `user` on `date`
    #[must_use]
    pub fn bundle_path(&self, user: &UserProfile, date: NaiveDate) -> PathBuf {
        self.root
            .join(user.slug())
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl TelemetryProvider for FileTelemetryProvider {
    fn name(&self) -> &'static str {
        "garmin-export"
    }

    #[instrument(skip_all, fields(user = %user.name, %date))]
    async fn fetch_daily(&self, user: &UserProfile, date: NaiveDate) -> AppResult<DailyTelemetry> {
        let path = self.bundle_path(user, date);
        debug!(path = %path.display(), "Reading telemetry bundle");

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Telemetry bundle {}", path.display()))
            } else {
                AppError::storage(format!("Failed to read {}: {e}", path.display()))
            }
        })?;

        Ok(GarminDailyExport::from_json(&contents)?.into_telemetry(date))
    }
}
