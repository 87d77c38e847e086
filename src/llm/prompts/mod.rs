// ABOUTME: Coaching prompt templates and placeholder rendering for daily, sleep and workout reports
// ABOUTME: Built-in markdown templates loaded at compile time, overridable per mode from JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Coaching Prompts
//!
//! Built-in templates are loaded at compile time from markdown files. A
//! template may reference `{placeholder}` names filled from the athlete
//! profile, the day's telemetry, the readiness score and the training load:
//!
//! `user_label`, `goal`, `injury`, `note`, `current_now`, `r_score`,
//! `avg_daily_load_int`, `activities_text`, `nap_text`, `spo2_text`,
//! `resp_text`, `sleep_text`, `body_battery`, `stress`, `rhr`,
//! `activities_json`.
//!
//! `activities_json` holds only the activities that started on the report
//! day, serialized as a JSON array.
//!
//! Unknown placeholders are left in the output verbatim.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use coach_core::errors::{AppError, AppResult};
use coach_core::models::{DailyTelemetry, RespirationSummary, SleepStages, Spo2Summary};
use coach_intelligence::TrainingLoadSummary;
use serde::{Deserialize, Serialize};

use super::GenerationRequest;
use crate::users::UserProfile;

/// System prompt for the evening training report
pub const DAILY_SYSTEM_PROMPT: &str = include_str!("daily_system.md");

/// User template for the evening training report
pub const DAILY_USER_TEMPLATE: &str = include_str!("daily_user.md");

/// System prompt for the morning sleep report
pub const SLEEP_SYSTEM_PROMPT: &str = include_str!("sleep_system.md");

/// User template for the morning sleep report
pub const SLEEP_USER_TEMPLATE: &str = include_str!("sleep_user.md");

/// System prompt for the per-session workout analysis
pub const WORKOUT_SYSTEM_PROMPT: &str = include_str!("workout_system.md");

/// User template for the per-session workout analysis
pub const WORKOUT_USER_TEMPLATE: &str = include_str!("workout_user.md");

/// Activity log text when nothing crossed the materiality threshold
pub const NO_ACTIVITY_TEXT: &str = "No significant activity.";

/// Shown for SpO2/respiration when the device reported nothing
pub const NO_DATA_TEXT: &str = "No data";

/// Sleep text when no sleep stages were synced
pub const NO_SLEEP_TEXT: &str = "No detailed sleep data (not synced yet).";

const TIMESTAMP_FORMAT: &str = "%H:%M:%S, %d/%m/%Y";

/// Which report to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingMode {
    /// Evening report: readiness, load, and tomorrow's session
    Daily,
    /// Morning report focused on last night's sleep
    SleepAnalysis,
    /// Detailed analysis of the sessions recorded on the report day
    WorkoutAnalysis,
}

impl CoachingMode {
    /// Canonical name as accepted on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::SleepAnalysis => "sleep-analysis",
            Self::WorkoutAnalysis => "workout-analysis",
        }
    }
}

impl fmt::Display for CoachingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoachingMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "sleep-analysis" | "sleep_analysis" | "sleep" => Ok(Self::SleepAnalysis),
            "workout-analysis" | "workout_analysis" | "workout" => Ok(Self::WorkoutAnalysis),
            other => Err(AppError::invalid_input(format!(
                "Unknown coaching mode '{other}' (expected daily, sleep-analysis or workout-analysis)"
            ))),
        }
    }
}

/// System prompt, user template and optional model for one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// System instruction, rendered with the same placeholders
    #[serde(default)]
    pub system_prompt: String,
    /// User content template
    pub user_template: String,
    /// Model override for this mode
    #[serde(default)]
    pub model: Option<String>,
}

impl PromptTemplate {
    /// Compiled-in template for `mode`
    #[must_use]
    pub fn builtin(mode: CoachingMode) -> Self {
        let (system_prompt, user_template) = match mode {
            CoachingMode::Daily => (DAILY_SYSTEM_PROMPT, DAILY_USER_TEMPLATE),
            CoachingMode::SleepAnalysis => (SLEEP_SYSTEM_PROMPT, SLEEP_USER_TEMPLATE),
            CoachingMode::WorkoutAnalysis => (WORKOUT_SYSTEM_PROMPT, WORKOUT_USER_TEMPLATE),
        };
        Self {
            system_prompt: system_prompt.trim().to_owned(),
            user_template: user_template.trim().to_owned(),
            model: None,
        }
    }
}

/// Everything a template can draw on for one athlete and day
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Athlete profile
    pub user: &'a UserProfile,
    /// The day's telemetry
    pub telemetry: &'a DailyTelemetry,
    /// Readiness score, 0-100
    pub readiness_score: u8,
    /// Rolling training load
    pub load: &'a TrainingLoadSummary,
    /// Local time the report is generated
    pub generated_at: NaiveDateTime,
}

/// Renders generation requests from templates
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    overrides: HashMap<CoachingMode, PromptTemplate>,
}

impl PromptBuilder {
    /// Builder using only the compiled-in templates
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the template for one mode
    #[must_use]
    pub fn with_template(mut self, mode: CoachingMode, template: PromptTemplate) -> Self {
        self.overrides.insert(mode, template);
        self
    }

    /// Builder with overrides from a JSON object keyed by mode name
    ///
    /// ```json
    /// { "daily": { "system_prompt": "...", "user_template": "...", "model": "gemini-2.5-pro" } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or an unknown mode key.
    pub fn from_json(contents: &str) -> AppResult<Self> {
        let raw: HashMap<String, PromptTemplate> = serde_json::from_str(contents)
            .map_err(|e| AppError::serialization(format!("Invalid prompt templates: {e}")))?;
        raw.into_iter()
            .try_fold(Self::new(), |builder, (key, template)| {
                Ok(builder.with_template(key.parse()?, template))
            })
    }

    /// Effective template for `mode`
    #[must_use]
    pub fn template(&self, mode: CoachingMode) -> PromptTemplate {
        self.overrides
            .get(&mode)
            .cloned()
            .unwrap_or_else(|| PromptTemplate::builtin(mode))
    }

    /// Render the generation request for one athlete
    #[must_use]
    pub fn build(&self, mode: CoachingMode, context: &PromptContext<'_>) -> GenerationRequest {
        let template = self.template(mode);
        let values = placeholder_values(context);
        let request = GenerationRequest::new(
            render_template(&template.system_prompt, &values),
            render_template(&template.user_template, &values),
        );
        match template.model {
            Some(model) if !model.trim().is_empty() => request.with_model(model),
            _ => request,
        }
    }
}

/// Placeholder values for a context
#[must_use]
pub fn placeholder_values(context: &PromptContext<'_>) -> BTreeMap<&'static str, String> {
    let telemetry = context.telemetry;
    let snapshot = &telemetry.snapshot;
    let activities_text = if context.load.per_activity_log.is_empty() {
        NO_ACTIVITY_TEXT.to_owned()
    } else {
        context
            .load
            .per_activity_log
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    };

    BTreeMap::from([
        ("user_label", context.user.name.clone()),
        ("goal", context.user.goal.clone()),
        ("injury", context.user.injury.clone()),
        ("note", context.user.note.clone()),
        (
            "current_now",
            context.generated_at.format(TIMESTAMP_FORMAT).to_string(),
        ),
        ("r_score", context.readiness_score.to_string()),
        (
            "avg_daily_load_int",
            whole(context.load.average_daily_load).to_string(),
        ),
        ("activities_text", activities_text),
        ("nap_text", nap_text(telemetry.nap_seconds)),
        ("spo2_text", spo2_text(&telemetry.spo2)),
        ("resp_text", respiration_text(&telemetry.respiration)),
        ("sleep_text", sleep_text(telemetry.sleep_stages.as_ref())),
        ("body_battery", snapshot.body_battery.unwrap_or(0).to_string()),
        (
            "stress",
            snapshot
                .stress
                .map_or_else(|| "n/a".to_owned(), |stress| stress.to_string()),
        ),
        ("rhr", snapshot.resting_hr.unwrap_or(0).to_string()),
        ("activities_json", activities_json(telemetry)),
    ])
}

/// Today's activities as a pretty-printed JSON array
#[must_use]
pub fn activities_json(telemetry: &DailyTelemetry) -> String {
    let today: Vec<_> = telemetry.activities_today().collect();
    serde_json::to_string_pretty(&today).unwrap_or_else(|_| "[]".to_owned())
}

/// Replace `{name}` placeholders with their values
///
/// Braces that do not enclose a known name are copied through unchanged.
#[must_use]
pub fn render_template(template: &str, values: &BTreeMap<&'static str, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let replacement = after_open
            .find('}')
            .and_then(|close| values.get(&after_open[..close]).map(|value| (close, value)));

        if let Some((close, value)) = replacement {
            output.push_str(value);
            rest = &after_open[close + 1..];
        } else {
            output.push('{');
            rest = after_open;
        }
    }
    output.push_str(rest);
    output
}

/// Compact duration: `"7h 5m"`, `"45m"`, or `"0m"`
#[must_use]
pub fn format_seconds_short(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Sleep breakdown for prompts
#[must_use]
pub fn sleep_text(stages: Option<&SleepStages>) -> String {
    let Some(stages) = stages else {
        return NO_SLEEP_TEXT.to_owned();
    };
    format!(
        "Actual sleep: {} (awake time excluded).\n   - Deep: {}\n   - Light: {}\n   - REM: {}\n   - Awake: {}",
        format_seconds_short(stages.asleep_seconds()),
        format_seconds_short(stages.deep_seconds),
        format_seconds_short(stages.light_seconds),
        format_seconds_short(stages.rem_seconds),
        format_seconds_short(stages.awake_seconds),
    )
}

fn nap_text(nap_seconds: u64) -> String {
    if nap_seconds == 0 {
        String::new()
    } else {
        format!("+ Nap: {} min", nap_seconds / 60)
    }
}

fn spo2_text(spo2: &Spo2Summary) -> String {
    let Some(average) = spo2.average else {
        return NO_DATA_TEXT.to_owned();
    };
    format!(
        "Avg {}% | Min {}% | Last {}%",
        whole(average),
        optional_whole(spo2.lowest),
        optional_whole(spo2.latest)
    )
}

fn respiration_text(respiration: &RespirationSummary) -> String {
    let Some(waking) = respiration.avg_waking else {
        return NO_DATA_TEXT.to_owned();
    };
    format!(
        "Waking Avg {} brpm | Sleep Avg {} brpm | Min {} - Max {}",
        whole(waking),
        optional_whole(respiration.avg_sleep),
        optional_whole(respiration.lowest),
        optional_whole(respiration.highest)
    )
}

fn whole(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

fn optional_whole(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| whole(v).to_string())
}
