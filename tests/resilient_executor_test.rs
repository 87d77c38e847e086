// ABOUTME: Tests for the resilient executor's rotation, retry budget, cooldowns, and fallback
// ABOUTME: Uses a recording delay so no test waits on the wall clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{RecordingDelay, ScriptedGenerator};
use daily_coach::credentials::KeyPool;
use daily_coach::llm::{GenerationError, GenerationProvider, GenerationRequest};
use daily_coach::resilience::{
    ExecutionFailure, Outcome, ResilientExecutor, RetryPolicy, RetryState,
};

const FALLBACK: &str = "coaching unavailable";

fn executor(keys: &[&str], delay: &Arc<RecordingDelay>) -> ResilientExecutor {
    ResilientExecutor::new(KeyPool::new(keys.iter().copied())).with_delay(delay.clone())
}

#[tokio::test]
async fn test_success_on_first_attempt_rotates_once() {
    let delay = RecordingDelay::new();
    let executor = executor(&["k0", "k1", "k2"], &delay);
    let calls = AtomicU32::new(0);

    let value = executor
        .execute(
            |credential| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Outcome::Success(credential.expose().to_owned()) }
            },
            FALLBACK.to_owned(),
        )
        .await;

    assert_eq!(value, "k0");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(executor.cursor(), 1);
    assert!(delay.waits().is_empty());
}

#[tokio::test]
async fn test_quota_failures_exhaust_after_two_passes() {
    for size in 1..=4 {
        let delay = RecordingDelay::new();
        let keys: Vec<String> = (0..size).map(|i| format!("k{i}")).collect();
        let executor = ResilientExecutor::new(KeyPool::new(keys)).with_delay(delay.clone());
        let calls = AtomicU32::new(0);

        let value = executor
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Outcome::<String>::QuotaExceeded("429 Too Many Requests".into()) }
                },
                FALLBACK.to_owned(),
            )
            .await;

        assert_eq!(value, FALLBACK);
        assert_eq!(calls.load(Ordering::SeqCst), 2 * size);
        // Cooldown between attempts, none after the last
        assert_eq!(delay.waits().len(), (2 * size - 1) as usize);
        assert!(delay.waits().iter().all(|d| *d == Duration::from_secs(1)));
        // Every attempt rotated, so two full passes land back on the start
        assert_eq!(executor.cursor(), 0);
    }
}

#[tokio::test]
async fn test_succeeds_on_third_attempt_when_only_index_two_works() {
    let delay = RecordingDelay::new();
    let executor = executor(&["k0", "k1", "k2"], &delay);
    let seen = Mutex::new(Vec::new());

    let report = executor
        .execute_with_report(|credential| {
            seen.lock().unwrap().push(credential.expose().to_owned());
            async move {
                if credential.expose() == "k2" {
                    Outcome::Success("advice".to_owned())
                } else {
                    Outcome::QuotaExceeded("RESOURCE_EXHAUSTED".to_owned())
                }
            }
        })
        .await;

    assert_eq!(report.result.unwrap(), "advice");
    assert_eq!(report.attempts, 3);
    assert_eq!(report.quota_failures, 2);
    assert_eq!(report.transient_failures, 0);
    assert_eq!(report.final_state, RetryState::Succeeded { attempts: 3 });
    assert_eq!(*seen.lock().unwrap(), vec!["k0", "k1", "k2"]);
    assert_eq!(delay.waits(), vec![Duration::from_secs(1); 2]);
    // Rotated past k2 after the success
    assert_eq!(executor.cursor(), 0);
}

#[tokio::test]
async fn test_empty_pool_returns_default_without_invoking() {
    let delay = RecordingDelay::new();
    let executor = executor(&[], &delay);
    let calls = AtomicU32::new(0);

    let report = executor
        .execute_with_report(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Outcome::Success(1) }
        })
        .await;

    assert_eq!(report.result.unwrap_err(), ExecutionFailure::EmptyPool);
    assert_eq!(report.attempts, 0);
    assert_eq!(report.final_state, RetryState::EmptyPool);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(delay.waits().is_empty());

    let value = executor.execute(|_| async { Outcome::Success(1) }, 42).await;
    assert_eq!(value, 42);
}

#[tokio::test]
async fn test_transient_failures_use_longer_cooldown() {
    let delay = RecordingDelay::new();
    let executor = executor(&["k0", "k1"], &delay);
    let attempt = AtomicU32::new(0);

    let report = executor
        .execute_with_report(|_| {
            let n = attempt.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Outcome::TransientError("503 Service Unavailable".to_owned()),
                    1 => Outcome::QuotaExceeded("quota".to_owned()),
                    _ => Outcome::Success("ok".to_owned()),
                }
            }
        })
        .await;

    assert_eq!(report.result.unwrap(), "ok");
    assert_eq!(report.transient_failures, 1);
    assert_eq!(report.quota_failures, 1);
    assert_eq!(
        delay.waits(),
        vec![Duration::from_secs(2), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_exhaustion_report_counts_every_failure() {
    let delay = RecordingDelay::new();
    let executor = executor(&["k0", "k1"], &delay);

    let report = executor
        .execute_with_report(|_| async { Outcome::<()>::TransientError("boom".to_owned()) })
        .await;

    assert_eq!(report.result.unwrap_err(), ExecutionFailure::PoolExhausted);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.transient_failures, 4);
    assert_eq!(report.final_state, RetryState::Exhausted { attempts: 4 });
    assert_eq!(delay.waits(), vec![Duration::from_secs(2); 3]);
}

#[tokio::test]
async fn test_custom_policy_cooldowns_and_passes() {
    let delay = RecordingDelay::new();
    let policy = RetryPolicy {
        passes_per_credential: 3,
        quota_cooldown: Duration::from_millis(10),
        transient_cooldown: Duration::from_millis(20),
    };
    let executor = executor(&["k0"], &delay).with_policy(policy);

    let report = executor
        .execute_with_report(|_| async { Outcome::<()>::QuotaExceeded("429".to_owned()) })
        .await;

    assert_eq!(report.attempts, 3);
    assert_eq!(delay.waits(), vec![Duration::from_millis(10); 2]);
}

#[tokio::test]
async fn test_provider_errors_drive_classification() {
    let delay = RecordingDelay::new();
    let executor = executor(&["bad", "flaky", "good"], &delay);
    let generator = ScriptedGenerator::new()
        .answer("flaky", Err(GenerationError::classify("connection reset")))
        .answer("good", Ok("Run easy today.".to_owned()));
    let request = GenerationRequest::new("", "plan");

    let generator = &generator;
    let request = &request;
    let report = executor
        .execute_with_report(|credential| async move {
            Outcome::from(generator.generate(&credential, request).await)
        })
        .await;

    assert_eq!(report.result.unwrap(), "Run easy today.");
    assert_eq!(generator.credentials_used(), vec!["bad", "flaky", "good"]);
    assert_eq!(
        delay.waits(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_successive_calls_spread_across_credentials() {
    let delay = RecordingDelay::new();
    let executor = executor(&["k0", "k1", "k2"], &delay);

    let mut used = Vec::new();
    for _ in 0..4 {
        used.push(
            executor
                .execute(
                    |credential| async move { Outcome::Success(credential.expose().to_owned()) },
                    String::new(),
                )
                .await,
        );
    }

    assert_eq!(used, vec!["k0", "k1", "k2", "k0"]);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_pool() {
    let delay = RecordingDelay::new();
    let executor = Arc::new(executor(&["k0", "k1", "k2", "k3"], &delay));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let executor = Arc::clone(&executor);
        handles.push(tokio::spawn(async move {
            executor
                .execute(|_| async { Outcome::Success(()) }, ())
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Eight successful calls, eight rotations over four credentials
    assert_eq!(executor.cursor(), 0);
    assert!(delay.waits().is_empty());
}
