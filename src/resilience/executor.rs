// ABOUTME: Generic quota-resilient executor rotating through a shared credential pool
// ABOUTME: Two passes per credential, flat cooldowns, failures absorbed into a caller default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::delay::{Delay, TokioDelay};
use super::state::{FailureKind, RetryMachine, RetryPolicy, RetryState};
use crate::credentials::{Credential, KeyPool};
use crate::llm::GenerationError;

/// Result of one invocation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation produced a value
    Success(T),
    /// Rejected for rate/usage limits
    QuotaExceeded(String),
    /// Any other failure
    TransientError(String),
}

impl<T> From<Result<T, GenerationError>> for Outcome<T> {
    fn from(result: Result<T, GenerationError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(GenerationError::QuotaExceeded(message)) => Self::QuotaExceeded(message),
            Err(GenerationError::Transient(message)) => Self::TransientError(message),
        }
    }
}

/// Why an execution produced no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionFailure {
    /// No credentials configured; nothing was attempted
    EmptyPool,
    /// Every attempt across the pool failed
    PoolExhausted,
}

/// Detailed outcome of [`ResilientExecutor::execute_with_report`]
#[derive(Debug, Clone)]
pub struct ExecutionReport<T> {
    /// Value on success
    pub result: Result<T, ExecutionFailure>,
    /// Attempts made
    pub attempts: u32,
    /// Attempts rejected for quota
    pub quota_failures: u32,
    /// Attempts failing for other reasons
    pub transient_failures: u32,
    /// Terminal state of the retry machine
    pub final_state: RetryState,
}

/// Executes operations against a shared [`KeyPool`] with rotation and failover
///
/// The pool sits behind a mutex that is only held for `current()`/`rotate()`,
/// never across an await. Concurrent callers may still pick the same credential
/// before either rotates; that duplicate use is tolerated.
pub struct ResilientExecutor {
    pool: Mutex<KeyPool>,
    policy: RetryPolicy,
    delay: Arc<dyn Delay>,
}

impl std::fmt::Debug for ResilientExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientExecutor")
            .field("pool_size", &self.pool_size())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ResilientExecutor {
    /// Executor with the default policy and real tokio delays
    #[must_use]
    pub fn new(pool: KeyPool) -> Self {
        Self {
            pool: Mutex::new(pool),
            policy: RetryPolicy::default(),
            delay: Arc::new(TokioDelay),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the delay implementation
    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Active retry policy
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Number of credentials in the pool
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.lock_pool().size()
    }

    /// Snapshot of the credential under the cursor
    #[must_use]
    pub fn current_credential(&self) -> Option<Credential> {
        self.lock_pool().current().cloned()
    }

    /// Current cursor position
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.lock_pool().cursor()
    }

    /// Run `operation`, returning `default` when the pool is empty or exhausted
    pub async fn execute<T, F, Fut>(&self, operation: F, default: T) -> T
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        self.execute_with_report(operation).await.result.unwrap_or(default)
    }

    /// Run `operation` with rotation and cooldowns, reporting how it went
    ///
    /// Each attempt calls `operation` with the current credential. The pool
    /// rotates once after every attempt, successful or not. Failed attempts
    /// wait the policy cooldown before the next one, except the last.
    pub async fn execute_with_report<T, F, Fut>(&self, mut operation: F) -> ExecutionReport<T>
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let mut machine = RetryMachine::new(&self.policy, self.pool_size());
        let max_attempts = machine.max_attempts();
        let mut quota_failures = 0;
        let mut transient_failures = 0;

        let mut state = machine.start();
        if state == RetryState::EmptyPool {
            warn!("No credentials configured, returning default without attempting");
            return ExecutionReport {
                result: Err(ExecutionFailure::EmptyPool),
                attempts: 0,
                quota_failures,
                transient_failures,
                final_state: state,
            };
        }

        loop {
            match state {
                RetryState::Attempting { attempt } => {
                    let Some(credential) = self.current_credential() else {
                        // Pool membership is fixed, so this only happens for an empty pool
                        return ExecutionReport {
                            result: Err(ExecutionFailure::EmptyPool),
                            attempts: attempt - 1,
                            quota_failures,
                            transient_failures,
                            final_state: RetryState::EmptyPool,
                        };
                    };
                    debug!(
                        attempt,
                        max_attempts,
                        credential = %credential.masked(),
                        "Invoking operation"
                    );

                    let outcome = operation(credential.clone()).await;
                    self.rotate();

                    match outcome {
                        Outcome::Success(value) => {
                            state = machine.record_success();
                            info!(
                                attempt,
                                credential = %credential.masked(),
                                "Operation succeeded"
                            );
                            return ExecutionReport {
                                result: Ok(value),
                                attempts: attempt,
                                quota_failures,
                                transient_failures,
                                final_state: state,
                            };
                        }
                        Outcome::QuotaExceeded(message) => {
                            quota_failures += 1;
                            warn!(
                                attempt,
                                credential = %credential.masked(),
                                error = %message,
                                "Quota exceeded, rotating credential"
                            );
                            state = machine.record_failure(FailureKind::Quota);
                        }
                        Outcome::TransientError(message) => {
                            transient_failures += 1;
                            warn!(
                                attempt,
                                credential = %credential.masked(),
                                error = %message,
                                "Operation failed, rotating credential"
                            );
                            state = machine.record_failure(FailureKind::Transient);
                        }
                    }
                }
                RetryState::Cooldown { delay, .. } => {
                    self.delay.sleep(delay).await;
                    state = machine.finish_cooldown();
                }
                RetryState::Exhausted { attempts } => {
                    warn!(attempts, "All credentials exhausted, returning default");
                    return ExecutionReport {
                        result: Err(ExecutionFailure::PoolExhausted),
                        attempts,
                        quota_failures,
                        transient_failures,
                        final_state: state,
                    };
                }
                RetryState::Idle | RetryState::Succeeded { .. } | RetryState::EmptyPool => {
                    // Not reachable from the transitions above
                    return ExecutionReport {
                        result: Err(ExecutionFailure::PoolExhausted),
                        attempts: quota_failures + transient_failures,
                        quota_failures,
                        transient_failures,
                        final_state: state,
                    };
                }
            }
        }
    }

    fn rotate(&self) {
        self.lock_pool().rotate();
    }

    fn lock_pool(&self) -> MutexGuard<'_, KeyPool> {
        self.pool.lock().unwrap_or_else(|poisoned| {
            warn!("Key pool lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
