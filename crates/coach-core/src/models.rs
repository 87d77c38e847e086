// ABOUTME: Daily telemetry models consumed by readiness scoring and training load
// ABOUTME: BiometricSnapshot, ActivityRecord, sleep stages, SpO2 and respiration summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of biometrics used to compute the readiness score
///
/// `stress` and `body_battery` are optional because wearables frequently
/// report nothing for a day that was not synced. Scoring substitutes a neutral
/// stress and a zero body battery for missing readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiometricSnapshot {
    /// Actual sleep (deep + light + REM) in hours, awake time excluded
    pub sleep_hours: f64,
    /// Average stress level (0-100, lower is better)
    pub stress: Option<u32>,
    /// Most recent body battery value (0-100)
    pub body_battery: Option<u32>,
    /// Average blood oxygen saturation (%)
    pub avg_spo2: Option<f64>,
    /// Average respiration rate while asleep (breaths per minute)
    pub avg_sleep_resp: Option<f64>,
    /// Measured resting heart rate (bpm)
    pub resting_hr: Option<u32>,
}

impl BiometricSnapshot {
    /// Create a snapshot with the three mandatory readings
    #[must_use]
    pub const fn new(sleep_hours: f64, stress: u32, body_battery: u32) -> Self {
        Self {
            sleep_hours,
            stress: Some(stress),
            body_battery: Some(body_battery),
            avg_spo2: None,
            avg_sleep_resp: None,
            resting_hr: None,
        }
    }

    /// Attach an average SpO2 reading
    #[must_use]
    pub const fn with_spo2(mut self, avg_spo2: f64) -> Self {
        self.avg_spo2 = Some(avg_spo2);
        self
    }

    /// Attach an average sleep respiration reading
    #[must_use]
    pub const fn with_sleep_respiration(mut self, avg_sleep_resp: f64) -> Self {
        self.avg_sleep_resp = Some(avg_sleep_resp);
        self
    }

    /// Attach a resting heart rate reading
    #[must_use]
    pub const fn with_resting_hr(mut self, resting_hr: u32) -> Self {
        self.resting_hr = Some(resting_hr);
        self
    }
}

/// A single recorded workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Activity display name
    pub name: String,
    /// Duration in minutes
    pub duration_minutes: f64,
    /// Average heart rate (bpm)
    pub avg_hr: f64,
    /// Peak heart rate (bpm)
    pub max_hr: f64,
    /// Local calendar date the activity started on
    pub start_date: NaiveDate,
}

impl ActivityRecord {
    /// Create a new activity record
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        duration_minutes: f64,
        avg_hr: f64,
        max_hr: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            duration_minutes,
            avg_hr,
            max_hr,
            start_date,
        }
    }
}

/// Sleep stage durations in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStages {
    /// Deep sleep
    pub deep_seconds: u64,
    /// Light sleep
    pub light_seconds: u64,
    /// REM sleep
    pub rem_seconds: u64,
    /// Time awake during the sleep window
    pub awake_seconds: u64,
}

impl SleepStages {
    /// Actual sleep time, awake time excluded
    #[must_use]
    pub const fn asleep_seconds(&self) -> u64 {
        self.deep_seconds + self.light_seconds + self.rem_seconds
    }

    /// Actual sleep time in hours
    #[must_use]
    pub fn asleep_hours(&self) -> f64 {
        self.asleep_seconds() as f64 / 3600.0
    }
}

/// Blood oxygen readings for the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spo2Summary {
    /// Average SpO2 (%)
    pub average: Option<f64>,
    /// Lowest SpO2 (%)
    pub lowest: Option<f64>,
    /// Most recent SpO2 (%)
    pub latest: Option<f64>,
}

/// Respiration readings for the day (breaths per minute)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RespirationSummary {
    /// Average while awake
    pub avg_waking: Option<f64>,
    /// Average while asleep
    pub avg_sleep: Option<f64>,
    /// Lowest reading
    pub lowest: Option<f64>,
    /// Highest reading
    pub highest: Option<f64>,
}

/// Everything the telemetry collaborator returns for one user and one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTelemetry {
    /// Day the telemetry describes
    pub date: NaiveDate,
    /// Inputs to the readiness score
    pub snapshot: BiometricSnapshot,
    /// Sleep stage breakdown, when the night was synced
    pub sleep_stages: Option<SleepStages>,
    /// Total daytime nap duration in seconds
    pub nap_seconds: u64,
    /// Detailed SpO2 readings
    pub spo2: Spo2Summary,
    /// Detailed respiration readings
    pub respiration: RespirationSummary,
    /// Activities from the trailing training load window
    pub activities: Vec<ActivityRecord>,
}

impl DailyTelemetry {
    /// Create an empty telemetry bundle for a date
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            snapshot: BiometricSnapshot::default(),
            sleep_stages: None,
            nap_seconds: 0,
            spo2: Spo2Summary::default(),
            respiration: RespirationSummary::default(),
            activities: Vec::new(),
        }
    }

    /// Activities that started on the telemetry date itself
    pub fn activities_today(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.activities
            .iter()
            .filter(move |activity| activity.start_date == self.date)
    }
}
