// ABOUTME: Garmin Connect payload parsing into the daily telemetry model
// ABOUTME: Handles user summary, sleep DTO, SpO2, respiration, and activity list shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use coach_core::errors::{AppError, AppResult};
use coach_core::models::{
    ActivityRecord, BiometricSnapshot, DailyTelemetry, RespirationSummary, SleepStages,
    Spo2Summary,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Body battery event type that marks a daytime nap
const NAP_EVENT_TYPE: &str = "NAP";

/// Garmin user summary statistics
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminStats {
    resting_heart_rate: Option<f64>,
    average_stress_level: Option<f64>,
    body_battery_most_recent_value: Option<f64>,
    body_battery_activity_event_list: Option<Vec<GarminBodyBatteryEvent>>,
}

/// Body battery event (naps, sleep, activities)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminBodyBatteryEvent {
    event_type: Option<String>,
    duration_in_milliseconds: Option<f64>,
}

/// User summary as returned by Garmin Connect
///
/// Some endpoints nest the statistics under `stats`, others return them at
/// the top level; body battery may also live under `stats_and_body`.
#[derive(Debug, Default, Deserialize)]
struct GarminUserSummary {
    stats: Option<GarminStats>,
    stats_and_body: Option<GarminStatsAndBody>,
    #[serde(flatten)]
    top_level: GarminStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminStatsAndBody {
    body_battery_most_recent_value: Option<f64>,
}

/// Sleep data wrapper
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminSleepData {
    #[serde(rename = "dailySleepDTO")]
    daily_sleep_dto: Option<GarminSleepDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminSleepDto {
    deep_sleep_seconds: Option<f64>,
    light_sleep_seconds: Option<f64>,
    rem_sleep_seconds: Option<f64>,
    awake_sleep_seconds: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminSpo2 {
    #[serde(rename = "averageSpO2")]
    average: Option<f64>,
    #[serde(rename = "lowestSpO2")]
    lowest: Option<f64>,
    #[serde(rename = "latestSpO2")]
    latest: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminRespiration {
    avg_waking_respiration_value: Option<f64>,
    avg_sleep_respiration_value: Option<f64>,
    lowest_respiration_value: Option<f64>,
    highest_respiration_value: Option<f64>,
}

/// Activity entry from the activities-by-date listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminActivity {
    activity_name: Option<String>,
    /// Seconds
    duration: Option<f64>,
    #[serde(rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(rename = "maxHR")]
    max_hr: Option<f64>,
    start_time_local: Option<String>,
}

/// One day of exported Garmin Connect data
///
/// Each section mirrors the payload of the corresponding Garmin Connect
/// endpoint; any section may be missing or `null`.
#[derive(Debug, Default, Deserialize)]
pub struct GarminDailyExport {
    #[serde(default)]
    summary: Option<GarminUserSummary>,
    #[serde(default)]
    sleep: Option<GarminSleepData>,
    #[serde(default)]
    spo2: Option<GarminSpo2>,
    #[serde(default)]
    respiration: Option<GarminRespiration>,
    #[serde(default)]
    activities: Option<Vec<GarminActivity>>,
}

impl GarminDailyExport {
    /// Parse an export bundle from JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the JSON is malformed or a section
    /// has the wrong shape.
    pub fn from_json(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|e| AppError::serialization(format!("Invalid Garmin export: {e}")))
    }

    /// Convert into the telemetry model for `date`
    #[must_use]
    pub fn into_telemetry(self, date: NaiveDate) -> DailyTelemetry {
        let summary = self.summary.unwrap_or_default();
        let stats_and_body_battery = summary
            .stats_and_body
            .and_then(|body| body.body_battery_most_recent_value);
        let stats = summary.stats.unwrap_or(summary.top_level);

        let body_battery = stats_and_body_battery
            .or(stats.body_battery_most_recent_value)
            .and_then(non_negative);
        // Garmin reports 0 (or negative sentinels) when there was no stress reading
        let stress = stats.average_stress_level.and_then(positive);
        let resting_hr = stats.resting_heart_rate.and_then(positive);
        let nap_seconds = stats
            .body_battery_activity_event_list
            .unwrap_or_default()
            .iter()
            .filter(|event| event.event_type.as_deref() == Some(NAP_EVENT_TYPE))
            .filter_map(|event| event.duration_in_milliseconds)
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| (ms / 1000.0) as u64)
            .sum();

        let sleep_stages = self
            .sleep
            .and_then(|sleep| sleep.daily_sleep_dto)
            .and_then(convert_sleep_dto);

        let spo2 = self.spo2.map_or_else(Spo2Summary::default, |spo2| Spo2Summary {
            average: spo2.average.and_then(positive_f64),
            lowest: spo2.lowest.and_then(positive_f64),
            latest: spo2.latest.and_then(positive_f64),
        });

        let respiration = self
            .respiration
            .map_or_else(RespirationSummary::default, |resp| RespirationSummary {
                avg_waking: resp.avg_waking_respiration_value.and_then(positive_f64),
                avg_sleep: resp.avg_sleep_respiration_value.and_then(positive_f64),
                lowest: resp.lowest_respiration_value.and_then(positive_f64),
                highest: resp.highest_respiration_value.and_then(positive_f64),
            });

        let activities: Vec<ActivityRecord> = self
            .activities
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_activity)
            .collect();

        let snapshot = BiometricSnapshot {
            sleep_hours: sleep_stages.map_or(0.0, |stages| stages.asleep_hours()),
            stress,
            body_battery,
            avg_spo2: spo2.average,
            avg_sleep_resp: respiration.avg_sleep,
            resting_hr,
        };

        debug!(
            %date,
            activities = activities.len(),
            has_sleep = sleep_stages.is_some(),
            "Parsed Garmin export"
        );

        DailyTelemetry {
            date,
            snapshot,
            sleep_stages,
            nap_seconds,
            spo2,
            respiration,
            activities,
        }
    }
}

/// Parse a Garmin export bundle straight into telemetry for `date`
///
/// # Errors
///
/// Returns a serialization error for malformed JSON.
pub fn parse_daily_export(contents: &str, date: NaiveDate) -> AppResult<DailyTelemetry> {
    Ok(GarminDailyExport::from_json(contents)?.into_telemetry(date))
}

fn convert_sleep_dto(dto: GarminSleepDto) -> Option<SleepStages> {
    if dto.deep_sleep_seconds.is_none()
        && dto.light_sleep_seconds.is_none()
        && dto.rem_sleep_seconds.is_none()
        && dto.awake_sleep_seconds.is_none()
    {
        return None;
    }
    let seconds = |value: Option<f64>| value.and_then(non_negative_f64).map_or(0, |s| s as u64);
    Some(SleepStages {
        deep_seconds: seconds(dto.deep_sleep_seconds),
        light_seconds: seconds(dto.light_sleep_seconds),
        rem_seconds: seconds(dto.rem_sleep_seconds),
        awake_seconds: seconds(dto.awake_sleep_seconds),
    })
}

fn convert_activity(activity: GarminActivity) -> Option<ActivityRecord> {
    let name = activity
        .activity_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_owned());
    let start = activity.start_time_local.unwrap_or_default();
    let Some(start_date) = start
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    else {
        warn!(activity = %name, start = %start, "Skipping activity without a valid start date");
        return None;
    };

    Some(ActivityRecord::new(
        name,
        activity.duration.and_then(non_negative_f64).unwrap_or(0.0) / 60.0,
        activity.average_hr.and_then(non_negative_f64).unwrap_or(0.0),
        activity.max_hr.and_then(non_negative_f64).unwrap_or(0.0),
        start_date,
    ))
}

fn positive(value: f64) -> Option<u32> {
    positive_f64(value).map(|v| v.round() as u32)
}

fn non_negative(value: f64) -> Option<u32> {
    non_negative_f64(value).map(|v| v.round() as u32)
}

fn positive_f64(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

fn non_negative_f64(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}
