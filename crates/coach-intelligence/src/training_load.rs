// ABOUTME: Rolling 7-day training load from Banister TRIMP with a per-activity log
// ABOUTME: Averages over calendar days (not active days) and tracks a noise-filtered max HR
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{Duration, NaiveDate};
use coach_core::constants::heart_rate::{
    DEFAULT_MAX_HR, DEFAULT_RESTING_HR, MIN_PLAUSIBLE_MAX_HR, MIN_PLAUSIBLE_RESTING_HR,
};
use coach_core::constants::training_load::{LOG_TRIMP_THRESHOLD, WINDOW_DAYS};
use coach_core::ActivityRecord;
use serde::{Deserialize, Serialize};

use crate::trimp::banister_trimp;

/// Training load over the trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
    /// Total TRIMP divided by the window length in calendar days
    pub average_daily_load: f64,
    /// Sum of TRIMP over every activity in the window
    pub total_trimp: f64,
    /// Max heart rate in effect after the last activity was processed
    pub effective_max_hr: f64,
    /// Resting heart rate used for every activity
    pub resting_hr: f64,
    /// Activities above the materiality threshold, oldest first
    pub per_activity_log: Vec<ActivityLoadEntry>,
}

/// One line of the human-readable activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLoadEntry {
    /// Local start date
    pub date: NaiveDate,
    /// Activity display name
    pub name: String,
    /// Duration in minutes
    pub duration_minutes: f64,
    /// Peak heart rate recorded by the activity
    pub max_hr: f64,
    /// Banister TRIMP
    pub trimp: f64,
}

impl fmt::Display for ActivityLoadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {}: {} ({} min) | MaxHR {} | TRIMP {}",
            self.date,
            self.name,
            self.duration_minutes.trunc() as i64,
            self.max_hr.trunc() as i64,
            self.trimp.trunc() as i64
        )
    }
}

/// Accumulator for the rolling training load
#[derive(Debug, Clone, Copy)]
pub struct TrainingLoadAccumulator {
    window_days: i64,
    log_threshold: f64,
}

impl Default for TrainingLoadAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingLoadAccumulator {
    /// Create an accumulator with the standard 7-day window and log threshold
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            log_threshold: LOG_TRIMP_THRESHOLD,
        }
    }

    /// Override the TRIMP threshold for the human-readable log
    #[must_use]
    pub const fn with_log_threshold(mut self, log_threshold: f64) -> Self {
        self.log_threshold = log_threshold;
        self
    }

    /// Window length in calendar days
    #[must_use]
    pub const fn window_days(&self) -> i64 {
        self.window_days
    }

    /// First calendar day of the window ending on `today`
    #[must_use]
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.window_days - 1)
    }

    /// Resting heart rate to use: the measured value when plausible, else the default
    #[must_use]
    pub fn effective_resting_hr(resting_hr: Option<u32>) -> f64 {
        resting_hr
            .map(f64::from)
            .filter(|rhr| *rhr > MIN_PLAUSIBLE_RESTING_HR)
            .unwrap_or(DEFAULT_RESTING_HR)
    }

    /// Accumulate TRIMP over the window `[today - 6, today]`
    ///
    /// Activities outside the window are ignored. The remaining ones are
    /// processed oldest first; the max heart rate starts at 185 bpm and is
    /// replaced by each new running peak that exceeds 160 bpm, so earlier
    /// activities are scored against the peak known at that point. The sum is
    /// divided by the window length regardless of how many days had activity.
    /// Activities whose TRIMP does not exceed the log threshold still count
    /// toward the sum but are left out of `per_activity_log`.
    #[must_use]
    pub fn accumulate(
        &self,
        activities: &[ActivityRecord],
        resting_hr: Option<u32>,
        today: NaiveDate,
    ) -> TrainingLoadSummary {
        let rhr = Self::effective_resting_hr(resting_hr);
        let window_start = self.window_start(today);

        let mut in_window: Vec<&ActivityRecord> = activities
            .iter()
            .filter(|activity| activity.start_date >= window_start && activity.start_date <= today)
            .collect();
        in_window.sort_by_key(|activity| activity.start_date);

        let mut observed_peak = 0.0_f64;
        let mut max_hr = DEFAULT_MAX_HR;
        let mut total_trimp = 0.0;
        let mut per_activity_log = Vec::new();

        for activity in in_window {
            if activity.max_hr > observed_peak {
                observed_peak = activity.max_hr;
                if activity.max_hr > MIN_PLAUSIBLE_MAX_HR {
                    max_hr = activity.max_hr;
                }
            }

            let trimp = banister_trimp(activity.duration_minutes, activity.avg_hr, rhr, max_hr);
            total_trimp += trimp;

            if trimp > self.log_threshold {
                per_activity_log.push(ActivityLoadEntry {
                    date: activity.start_date,
                    name: activity.name.clone(),
                    duration_minutes: activity.duration_minutes,
                    max_hr: activity.max_hr,
                    trimp,
                });
            }
        }

        TrainingLoadSummary {
            average_daily_load: total_trimp / self.window_days as f64,
            total_trimp,
            effective_max_hr: max_hr,
            resting_hr: rhr,
            per_activity_log,
        }
    }
}
