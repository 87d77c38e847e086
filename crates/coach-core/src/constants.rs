// ABOUTME: Physiological defaults and thresholds shared by scoring and telemetry parsing
// ABOUTME: Resting/max heart rate fallbacks, training load window, and neutral readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Heart rate defaults used when measured values are missing or implausible
pub mod heart_rate {
    /// Resting heart rate assumed when the day's measurement is missing or implausible (bpm)
    pub const DEFAULT_RESTING_HR: f64 = 55.0;

    /// A measured resting heart rate must exceed this to be trusted (bpm)
    pub const MIN_PLAUSIBLE_RESTING_HR: f64 = 30.0;

    /// Max heart rate assumed until a plausible observed peak replaces it (bpm)
    pub const DEFAULT_MAX_HR: f64 = 185.0;

    /// An observed peak must exceed this to override the default max (rejects sensor noise)
    pub const MIN_PLAUSIBLE_MAX_HR: f64 = 160.0;
}

/// Training load window and logging defaults
pub mod training_load {
    /// Trailing calendar days in the acute load window (inclusive of today)
    pub const WINDOW_DAYS: i64 = 7;

    /// Activities at or below this TRIMP are left out of the human-readable log
    pub const LOG_TRIMP_THRESHOLD: f64 = 10.0;
}

/// Readiness input defaults
pub mod readiness {
    /// Stress level assumed when no reading exists (neutral)
    pub const NEUTRAL_STRESS: u32 = 50;

    /// Body battery assumed when no reading exists
    pub const MISSING_BODY_BATTERY: u32 = 0;

    /// Body battery below which the final score is capped
    pub const LOW_BODY_BATTERY: u32 = 20;

    /// Cap applied to the final score when body battery is depleted
    pub const DEPLETED_SCORE_CAP: f64 = 30.0;
}
