// ABOUTME: Criterion benchmarks for readiness scoring, training load, prompts, and the executor
// ABOUTME: Measures the per-user hot path of a coaching run
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the coaching hot path.
//!
//! A run processes every user once, so these stay small; the interesting
//! number is the training load accumulation as activity history grows.

#![allow(clippy::missing_docs_in_private_items, clippy::unwrap_used, missing_docs)]

use chrono::{Duration, NaiveDate};
use coach_intelligence::{ReadinessScorer, TrainingLoadAccumulator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use daily_coach::credentials::KeyPool;
use daily_coach::llm::prompts::{CoachingMode, PromptBuilder, PromptContext};
use daily_coach::models::{ActivityRecord, BiometricSnapshot, DailyTelemetry};
use daily_coach::resilience::{Outcome, ResilientExecutor};
use daily_coach::users::UserProfile;
use tokio::runtime::Runtime;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn generate_activities(count: usize) -> Vec<ActivityRecord> {
    (0..count)
        .map(|index| {
            ActivityRecord::new(
                format!("Benchmark Activity {index}"),
                30.0 + (index % 60) as f64,
                125.0 + ((index * 17) % 40) as f64,
                155.0 + ((index * 13) % 35) as f64,
                today() - Duration::days((index % 10) as i64),
            )
        })
        .collect()
}

fn bench_readiness(c: &mut Criterion) {
    let snapshots = [
        ("complete", BiometricSnapshot::new(7.4, 24, 78).with_spo2(96.0).with_sleep_respiration(14.0)),
        ("depleted", BiometricSnapshot::new(4.5, 70, 12)),
        ("sparse", BiometricSnapshot::default()),
    ];

    let mut group = c.benchmark_group("readiness");
    for (name, snapshot) in &snapshots {
        group.bench_with_input(BenchmarkId::new("score", name), snapshot, |b, snapshot| {
            b.iter(|| ReadinessScorer::score(black_box(snapshot)));
        });
    }
    group.finish();
}

fn bench_training_load(c: &mut Criterion) {
    let accumulator = TrainingLoadAccumulator::new();

    let mut group = c.benchmark_group("training_load");
    for count in [5, 50, 500] {
        let activities = generate_activities(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("accumulate", count), &activities, |b, activities| {
            b.iter(|| accumulator.accumulate(black_box(activities), Some(52), today()));
        });
    }
    group.finish();
}

fn bench_prompt_build(c: &mut Criterion) {
    let user = UserProfile::new("Benchmark Athlete").with_goal("Half marathon");
    let mut telemetry = DailyTelemetry::empty(today());
    telemetry.snapshot = BiometricSnapshot::new(7.0, 30, 65).with_resting_hr(50);
    telemetry.activities = generate_activities(20);
    let load = TrainingLoadAccumulator::new().accumulate(&telemetry.activities, Some(50), today());
    let builder = PromptBuilder::new();
    let context = PromptContext {
        user: &user,
        telemetry: &telemetry,
        readiness_score: 72,
        load: &load,
        generated_at: today().and_hms_opt(19, 0, 0).unwrap(),
    };

    c.bench_function("prompt_build_daily", |b| {
        b.iter(|| builder.build(CoachingMode::Daily, black_box(&context)));
    });
}

fn bench_executor(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let executor = ResilientExecutor::new(KeyPool::new(["k0", "k1", "k2", "k3"]));

    c.bench_function("executor_first_attempt_success", |b| {
        b.to_async(&runtime).iter(|| async {
            executor
                .execute(|_| async { Outcome::Success(black_box(1_u32)) }, 0)
                .await
        });
    });
}

criterion_group!(
    benches,
    bench_readiness,
    bench_training_load,
    bench_prompt_build,
    bench_executor
);
criterion_main!(benches);
