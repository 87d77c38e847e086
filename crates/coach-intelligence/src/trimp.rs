// ABOUTME: Banister Training Impulse (TRIMP) calculation for a single activity
// ABOUTME: Heart-rate-reserve weighted exponential load with guards for implausible inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Banister TRIMP
//!
//! Formula: `duration_minutes × HR_reserve_fraction × 0.64 × exp(1.92 × HR_reserve_fraction)`
//!
//! Where `HR_reserve_fraction = (avg_hr - resting_hr) / (max_hr - resting_hr)`
//!
//! # Scientific References
//!
//! - Bannister, E.W. (1991). "Modeling elite athletic performance." *Physiological Testing of Elite Athletes*.

/// Bannister exponential factor
const EXPONENTIAL_FACTOR: f64 = 1.92;

/// Bannister base multiplier
const BASE_MULTIPLIER: f64 = 0.64;

/// Calculate Banister TRIMP for one activity
///
/// Returns `0.0` when `max_hr <= resting_hr` or `avg_hr <= resting_hr`, which
/// covers both a zero/negative heart rate reserve and an activity that never
/// raised the heart rate above rest. Non-finite or negative durations also
/// yield `0.0`, so the result is always finite and non-negative.
#[must_use]
pub fn banister_trimp(duration_minutes: f64, avg_hr: f64, resting_hr: f64, max_hr: f64) -> f64 {
    if max_hr <= resting_hr || avg_hr <= resting_hr {
        return 0.0;
    }
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return 0.0;
    }

    let hr_ratio = heart_rate_reserve_fraction(avg_hr, resting_hr, max_hr);
    let trimp = duration_minutes * hr_ratio * BASE_MULTIPLIER * (EXPONENTIAL_FACTOR * hr_ratio).exp();

    if trimp.is_finite() {
        trimp
    } else {
        0.0
    }
}

/// Fraction of heart rate reserve used: `(avg - rest) / (max - rest)`
///
/// Callers must ensure `max_hr > resting_hr`.
fn heart_rate_reserve_fraction(avg_hr: f64, resting_hr: f64, max_hr: f64) -> f64 {
    (avg_hr - resting_hr) / (max_hr - resting_hr)
}
