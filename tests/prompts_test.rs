// ABOUTME: Tests for prompt rendering, placeholder values, and template overrides
// ABOUTME: Exercises the built-in daily, sleep and workout templates against realistic telemetry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::BTreeMap;

use coach_intelligence::{TrainingLoadAccumulator, TrainingLoadSummary};
use common::date;
use daily_coach::llm::prompts::{
    activities_json, format_seconds_short, placeholder_values, render_template, sleep_text, CoachingMode,
    PromptBuilder, PromptContext, PromptTemplate, NO_ACTIVITY_TEXT, NO_DATA_TEXT, NO_SLEEP_TEXT,
};
use daily_coach::models::{
    ActivityRecord, BiometricSnapshot, DailyTelemetry, SleepStages, Spo2Summary,
};
use daily_coach::users::UserProfile;

fn athlete() -> UserProfile {
    UserProfile::new("Linh")
        .with_goal("Sub-50 10k")
        .with_injury("Left knee")
        .with_note("Prefers mornings")
}

fn telemetry() -> DailyTelemetry {
    let mut telemetry = DailyTelemetry::empty(date(2025, 6, 14));
    telemetry.snapshot = BiometricSnapshot::new(7.5, 22, 81).with_resting_hr(50);
    telemetry.sleep_stages = Some(SleepStages {
        deep_seconds: 5400,
        light_seconds: 14_400,
        rem_seconds: 7200,
        awake_seconds: 900,
    });
    telemetry.nap_seconds = 1500;
    telemetry.spo2 = Spo2Summary {
        average: Some(96.6),
        lowest: Some(90.0),
        latest: None,
    };
    telemetry.activities = vec![ActivityRecord::new(
        "Tempo Run",
        40.0,
        155.0,
        178.0,
        date(2025, 6, 13),
    )];
    telemetry
}

fn load_for(telemetry: &DailyTelemetry) -> TrainingLoadSummary {
    TrainingLoadAccumulator::new().accumulate(
        &telemetry.activities,
        telemetry.snapshot.resting_hr,
        telemetry.date,
    )
}

fn generated_at() -> chrono::NaiveDateTime {
    date(2025, 6, 14).and_hms_opt(19, 5, 9).unwrap()
}

#[test]
fn test_format_seconds_short() {
    assert_eq!(format_seconds_short(0), "0m");
    assert_eq!(format_seconds_short(59), "0m");
    assert_eq!(format_seconds_short(2700), "45m");
    assert_eq!(format_seconds_short(3600), "1h 0m");
    assert_eq!(format_seconds_short(25_500), "7h 5m");
}

#[test]
fn test_sleep_text_lists_stages() {
    let stages = SleepStages {
        deep_seconds: 3600,
        light_seconds: 10_800,
        rem_seconds: 5400,
        awake_seconds: 600,
    };
    let text = sleep_text(Some(&stages));
    assert!(text.starts_with("Actual sleep: 5h 30m"));
    assert!(text.contains("Deep: 1h 0m"));
    assert!(text.contains("Awake: 10m"));
    assert_eq!(sleep_text(None), NO_SLEEP_TEXT);
}

#[test]
fn test_render_keeps_unknown_placeholders() {
    let values = BTreeMap::from([("name", "Linh".to_owned())]);
    assert_eq!(
        render_template("Hi {name}, {unknown} stays; {name}!", &values),
        "Hi Linh, {unknown} stays; Linh!"
    );
    assert_eq!(render_template("json {\"a\": 1} {name", &values), "json {\"a\": 1} {name");
}

#[test]
fn test_placeholder_values_from_context() {
    let user = athlete();
    let telemetry = telemetry();
    let load = load_for(&telemetry);
    let values = placeholder_values(&PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 83,
        load: &load,
        generated_at: generated_at(),
    });

    assert_eq!(values["user_label"], "Linh");
    assert_eq!(values["goal"], "Sub-50 10k");
    assert_eq!(values["current_now"], "19:05:09, 14/06/2025");
    assert_eq!(values["r_score"], "83");
    assert_eq!(values["body_battery"], "81");
    assert_eq!(values["stress"], "22");
    assert_eq!(values["rhr"], "50");
    assert_eq!(values["nap_text"], "+ Nap: 25 min");
    assert_eq!(values["spo2_text"], "Avg 96% | Min 90% | Last n/a%");
    assert_eq!(values["resp_text"], NO_DATA_TEXT);
    assert!(values["activities_text"].contains("Tempo Run (40 min) | MaxHR 178"));
    assert_eq!(
        values["avg_daily_load_int"],
        (load.average_daily_load.trunc() as i64).to_string()
    );
}

#[test]
fn test_missing_readings_render_neutral_text() {
    let user = UserProfile::new("Minh");
    let telemetry = DailyTelemetry::empty(date(2025, 6, 14));
    let load = load_for(&telemetry);
    let values = placeholder_values(&PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 0,
        load: &load,
        generated_at: generated_at(),
    });

    assert_eq!(values["activities_text"], NO_ACTIVITY_TEXT);
    assert_eq!(values["nap_text"], "");
    assert_eq!(values["stress"], "n/a");
    assert_eq!(values["body_battery"], "0");
    assert_eq!(values["sleep_text"], NO_SLEEP_TEXT);
    assert_eq!(values["goal"], "Maintain general fitness");
}

#[test]
fn test_builtin_daily_prompt_is_fully_rendered() {
    let user = athlete();
    let telemetry = telemetry();
    let load = load_for(&telemetry);
    let context = PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 83,
        load: &load,
        generated_at: generated_at(),
    };

    let request = PromptBuilder::new().build(CoachingMode::Daily, &context);

    assert!(!request.system_prompt.is_empty());
    assert!(request.user_prompt.contains("athlete: Linh"));
    assert!(request.user_prompt.contains("83/100"));
    assert!(request.user_prompt.contains("Left knee"));
    assert!(!request.user_prompt.contains("{r_score}"));
    assert!(!request.user_prompt.contains("{activities_text}"));
    assert_eq!(request.model, None);

    let sleep = PromptBuilder::new().build(CoachingMode::SleepAnalysis, &context);
    assert!(sleep.user_prompt.contains("Deep: 1h 30m"));
    assert_ne!(sleep.user_prompt, request.user_prompt);
}

#[test]
fn test_custom_template_and_model() {
    let user = athlete();
    let telemetry = telemetry();
    let load = load_for(&telemetry);
    let context = PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 64,
        load: &load,
        generated_at: generated_at(),
    };
    let builder = PromptBuilder::new().with_template(
        CoachingMode::Daily,
        PromptTemplate {
            system_prompt: "You coach {user_label}.".to_owned(),
            user_template: "Score {r_score}, stress {stress}.".to_owned(),
            model: Some("gemini-2.5-pro".to_owned()),
        },
    );

    let request = builder.build(CoachingMode::Daily, &context);
    assert_eq!(request.system_prompt, "You coach Linh.");
    assert_eq!(request.user_prompt, "Score 64, stress 22.");
    assert_eq!(request.model.as_deref(), Some("gemini-2.5-pro"));

    // Other modes keep the built-in template
    assert_eq!(
        builder.template(CoachingMode::SleepAnalysis),
        PromptTemplate::builtin(CoachingMode::SleepAnalysis)
    );
}

#[test]
fn test_templates_from_json() {
    let builder = PromptBuilder::from_json(
        r#"{
            "sleep-analysis": { "user_template": "Sleep {sleep_text}", "model": " " },
            "daily": { "system_prompt": "sys", "user_template": "day" }
        }"#,
    )
    .unwrap();

    let sleep = builder.template(CoachingMode::SleepAnalysis);
    assert_eq!(sleep.user_template, "Sleep {sleep_text}");
    assert_eq!(sleep.system_prompt, "");
    assert_eq!(builder.template(CoachingMode::Daily).system_prompt, "sys");

    assert!(PromptBuilder::from_json(r#"{"weekly": {"user_template": "x"}}"#).is_err());
    assert!(PromptBuilder::from_json("[]").is_err());
}

#[test]
fn test_mode_names() {
    assert_eq!("daily".parse::<CoachingMode>().unwrap(), CoachingMode::Daily);
    assert_eq!(
        "sleep_analysis".parse::<CoachingMode>().unwrap(),
        CoachingMode::SleepAnalysis
    );
    assert_eq!(CoachingMode::SleepAnalysis.to_string(), "sleep-analysis");
    assert_eq!(
        "workout".parse::<CoachingMode>().unwrap(),
        CoachingMode::WorkoutAnalysis
    );
    assert_eq!(
        "workout_analysis".parse::<CoachingMode>().unwrap(),
        CoachingMode::WorkoutAnalysis
    );
    assert_eq!(CoachingMode::WorkoutAnalysis.to_string(), "workout-analysis");
    assert!("monthly".parse::<CoachingMode>().is_err());
}

#[test]
fn test_activities_json_holds_only_todays_sessions() {
    let mut telemetry = telemetry();
    assert_eq!(activities_json(&telemetry), "[]");

    telemetry.activities.push(ActivityRecord::new(
        "Track 6x800",
        52.0,
        164.0,
        184.0,
        date(2025, 6, 14),
    ));
    let parsed: serde_json::Value = serde_json::from_str(&activities_json(&telemetry)).unwrap();
    let sessions = parsed.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["name"], "Track 6x800");
    assert_eq!(sessions[0]["start_date"], "2025-06-14");
    assert_eq!(sessions[0]["max_hr"], 184.0);
}

#[test]
fn test_workout_template_renders_sessions_and_goal() {
    let user = athlete();
    let mut telemetry = telemetry();
    telemetry.activities.push(ActivityRecord::new(
        "Track 6x800",
        52.0,
        164.0,
        184.0,
        date(2025, 6, 14),
    ));
    let load = load_for(&telemetry);
    let context = PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 70,
        load: &load,
        generated_at: generated_at(),
    };

    let request = PromptBuilder::new().build(CoachingMode::WorkoutAnalysis, &context);

    assert!(request.system_prompt.contains("sports data scientist"));
    assert!(request.user_prompt.contains("by: Linh"));
    assert!(request.user_prompt.contains("ATHLETE GOAL: Sub-50 10k"));
    assert!(request.user_prompt.contains("19:05:09, 14/06/2025"));
    assert!(request.user_prompt.contains("\"name\": \"Track 6x800\""));
    assert!(!request.user_prompt.contains("Tempo Run"));
    assert!(request.user_prompt.contains("*📊 DETAILED WORKOUT ANALYSIS*"));
    assert!(!request.user_prompt.contains("{activities_json}"));
}
