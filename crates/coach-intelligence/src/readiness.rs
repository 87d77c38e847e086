// ABOUTME: Readiness score (0-100) from sleep, stress, body battery, SpO2, and sleep respiration
// ABOUTME: Step-function sub-scores, four weight sets, and a depleted-body-battery cap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Readiness Scorer
//!
//! Combines up to five sub-scores into a single 0-100 readiness index:
//!
//! | Input | Sub-score |
//! |-------|-----------|
//! | sleep hours | `<5h → 30`, `<6.5h → 50`, `<7.5h → 75`, else `100` |
//! | stress (lower is better) | `≤25 → 100`, `≤35 → 80`, `≤50 → 50`, else `20` |
//! | body battery | raw 0-100 value |
//! | SpO2 (optional) | `≥95 → 100`, `≥92 → 80`, `≥90 → 60`, else `30` |
//! | sleep respiration (optional) | `12-16 → 100`, `10-12 / 16-20 → 80`, else `40` |
//!
//! The weight set depends on which optional readings exist and always sums
//! to 1.0. A body battery below 20 caps the final score at 30 regardless of
//! every other input.

use coach_core::constants::readiness::{
    DEPLETED_SCORE_CAP, LOW_BODY_BATTERY, MISSING_BODY_BATTERY, NEUTRAL_STRESS,
};
use coach_core::BiometricSnapshot;
use serde::{Deserialize, Serialize};

/// Absorbs binary representation error (e.g. `93.999_999_999`) before truncation
const FLOAT_TOLERANCE: f64 = 1e-9;

/// Weights applied to each sub-score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Sleep duration weight
    pub sleep: f64,
    /// Body battery weight
    pub body_battery: f64,
    /// Stress weight
    pub stress: f64,
    /// SpO2 weight
    pub spo2: f64,
    /// Sleep respiration weight
    pub respiration: f64,
}

impl ScoreWeights {
    /// Both optional readings present
    pub const WITH_SPO2_AND_RESPIRATION: Self = Self {
        sleep: 0.30,
        body_battery: 0.30,
        stress: 0.20,
        spo2: 0.10,
        respiration: 0.10,
    };

    /// Only sleep respiration present
    pub const WITH_RESPIRATION: Self = Self {
        sleep: 0.30,
        body_battery: 0.30,
        stress: 0.20,
        spo2: 0.0,
        respiration: 0.20,
    };

    /// Only SpO2 present
    pub const WITH_SPO2: Self = Self {
        sleep: 0.30,
        body_battery: 0.30,
        stress: 0.20,
        spo2: 0.20,
        respiration: 0.0,
    };

    /// Neither optional reading present
    pub const BASE: Self = Self {
        sleep: 0.40,
        body_battery: 0.40,
        stress: 0.20,
        spo2: 0.0,
        respiration: 0.0,
    };

    /// Select the weight set for the available optional readings
    #[must_use]
    pub const fn select(has_spo2: bool, has_respiration: bool) -> Self {
        match (has_spo2, has_respiration) {
            (true, true) => Self::WITH_SPO2_AND_RESPIRATION,
            (false, true) => Self::WITH_RESPIRATION,
            (true, false) => Self::WITH_SPO2,
            (false, false) => Self::BASE,
        }
    }

    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sleep + self.body_battery + self.stress + self.spo2 + self.respiration
    }
}

/// Every intermediate value behind a readiness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessBreakdown {
    /// Sleep duration sub-score
    pub sleep_score: f64,
    /// Stress sub-score
    pub stress_score: f64,
    /// Body battery sub-score (raw value)
    pub body_battery_score: f64,
    /// SpO2 sub-score, when a reading exists
    pub spo2_score: Option<f64>,
    /// Sleep respiration sub-score, when a reading exists
    pub respiration_score: Option<f64>,
    /// Weight set used
    pub weights: ScoreWeights,
    /// Weighted sum before the depleted-battery cap
    pub weighted_sum: f64,
    /// Whether the depleted-battery cap lowered the result
    pub depleted_cap_applied: bool,
    /// Final readiness score (0-100)
    pub score: u8,
}

/// Readiness scorer
pub struct ReadinessScorer;

impl ReadinessScorer {
    /// Compute the 0-100 readiness score for a day
    #[must_use]
    pub fn score(snapshot: &BiometricSnapshot) -> u8 {
        Self::breakdown(snapshot).score
    }

    /// Compute the readiness score along with every intermediate value
    #[must_use]
    pub fn breakdown(snapshot: &BiometricSnapshot) -> ReadinessBreakdown {
        let sleep_score = Self::score_sleep(snapshot.sleep_hours);
        let stress_score = Self::score_stress(snapshot.stress.unwrap_or(NEUTRAL_STRESS));
        let body_battery_score =
            f64::from(snapshot.body_battery.unwrap_or(MISSING_BODY_BATTERY).min(100));
        let spo2_score = snapshot.avg_spo2.map(Self::score_spo2);
        let respiration_score = snapshot.avg_sleep_resp.map(Self::score_respiration);

        let weights = ScoreWeights::select(spo2_score.is_some(), respiration_score.is_some());

        let weighted_sum = weights.sleep * sleep_score
            + weights.stress * stress_score
            + weights.body_battery * body_battery_score
            + weights.spo2 * spo2_score.unwrap_or(0.0)
            + weights.respiration * respiration_score.unwrap_or(0.0);

        let depleted = body_battery_score < f64::from(LOW_BODY_BATTERY);
        let final_value = if depleted {
            weighted_sum.min(DEPLETED_SCORE_CAP)
        } else {
            weighted_sum
        };

        ReadinessBreakdown {
            sleep_score,
            stress_score,
            body_battery_score,
            spo2_score,
            respiration_score,
            weights,
            weighted_sum,
            depleted_cap_applied: depleted && weighted_sum > DEPLETED_SCORE_CAP,
            score: Self::truncate_to_score(final_value),
        }
    }

    /// Sleep duration step function
    #[must_use]
    pub fn score_sleep(hours: f64) -> f64 {
        if hours < 5.0 {
            30.0
        } else if hours < 6.5 {
            50.0
        } else if hours < 7.5 {
            75.0
        } else {
            100.0
        }
    }

    /// Stress step function (lower stress scores higher)
    #[must_use]
    pub const fn score_stress(stress: u32) -> f64 {
        match stress {
            0..=25 => 100.0,
            26..=35 => 80.0,
            36..=50 => 50.0,
            _ => 20.0,
        }
    }

    /// SpO2 step function
    #[must_use]
    pub fn score_spo2(avg_spo2: f64) -> f64 {
        if avg_spo2 >= 95.0 {
            100.0
        } else if avg_spo2 >= 92.0 {
            80.0
        } else if avg_spo2 >= 90.0 {
            60.0
        } else {
            30.0
        }
    }

    /// Sleep respiration band function (breaths per minute)
    #[must_use]
    pub fn score_respiration(brpm: f64) -> f64 {
        if (12.0..=16.0).contains(&brpm) {
            100.0
        } else if (10.0..12.0).contains(&brpm) || (brpm > 16.0 && brpm <= 20.0) {
            80.0
        } else {
            40.0
        }
    }

    /// Truncate toward zero into the 0-100 range
    fn truncate_to_score(value: f64) -> u8 {
        if !value.is_finite() {
            return 0;
        }
        (value + FLOAT_TOLERANCE).trunc().clamp(0.0, 100.0) as u8
    }
}
