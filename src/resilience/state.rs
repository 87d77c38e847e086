// ABOUTME: Retry policy and state machine for one resilient execution
// ABOUTME: Idle → Attempting → Cooldown → Attempting … → Succeeded | Exhausted, plus EmptyPool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use serde::Serialize;

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rate or usage limit on the credential; expected to clear on another one
    Quota,
    /// Unclassified failure; waited out longer
    Transient,
}

/// Retry budget and cooldowns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Full passes over the pool before giving up
    pub passes_per_credential: u32,
    /// Wait after a quota rejection
    pub quota_cooldown: Duration,
    /// Wait after any other failure
    pub transient_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            passes_per_credential: 2,
            quota_cooldown: Duration::from_secs(1),
            transient_cooldown: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Attempt budget for a pool of `pool_size` credentials
    #[must_use]
    pub fn max_attempts(&self, pool_size: usize) -> u32 {
        u32::try_from(pool_size)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.passes_per_credential)
    }

    /// Cooldown applied after a failure of `kind`
    #[must_use]
    pub const fn cooldown_for(&self, kind: FailureKind) -> Duration {
        match kind {
            FailureKind::Quota => self.quota_cooldown,
            FailureKind::Transient => self.transient_cooldown,
        }
    }
}

/// State of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RetryState {
    /// Not started
    Idle,
    /// Invoking the operation (1-based attempt number)
    Attempting {
        /// Attempt in progress
        attempt: u32,
    },
    /// Waiting after a failed attempt before the next one
    Cooldown {
        /// Attempt that failed
        attempt: u32,
        /// Why it failed
        kind: FailureKind,
        /// How long to wait
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
    /// An attempt succeeded
    Succeeded {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Every attempt failed
    Exhausted {
        /// Attempts used
        attempts: u32,
    },
    /// No credentials; nothing was attempted
    EmptyPool,
}

impl RetryState {
    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded { .. } | Self::Exhausted { .. } | Self::EmptyPool
        )
    }
}

/// Drives the retry states for one execution
///
/// Transitions that do not apply to the current state leave it unchanged.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    state: RetryState,
    max_attempts: u32,
    policy: RetryPolicy,
}

impl RetryMachine {
    /// Create a machine with the policy's budget for `pool_size` credentials
    #[must_use]
    pub fn new(policy: &RetryPolicy, pool_size: usize) -> Self {
        Self {
            state: RetryState::Idle,
            max_attempts: policy.max_attempts(pool_size),
            policy: *policy,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> RetryState {
        self.state
    }

    /// Attempt budget
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `Idle → Attempting{1}`, or `Idle → EmptyPool` when the budget is zero
    pub fn start(&mut self) -> RetryState {
        if self.state == RetryState::Idle {
            self.state = if self.max_attempts == 0 {
                RetryState::EmptyPool
            } else {
                RetryState::Attempting { attempt: 1 }
            };
        }
        self.state
    }

    /// `Attempting{n} → Succeeded{n}`
    pub fn record_success(&mut self) -> RetryState {
        if let RetryState::Attempting { attempt } = self.state {
            self.state = RetryState::Succeeded { attempts: attempt };
        }
        self.state
    }

    /// `Attempting{n} → Cooldown{n}`, or `→ Exhausted{n}` on the last attempt
    pub fn record_failure(&mut self, kind: FailureKind) -> RetryState {
        if let RetryState::Attempting { attempt } = self.state {
            self.state = if attempt >= self.max_attempts {
                RetryState::Exhausted { attempts: attempt }
            } else {
                RetryState::Cooldown {
                    attempt,
                    kind,
                    delay: self.policy.cooldown_for(kind),
                }
            };
        }
        self.state
    }

    /// `Cooldown{n} → Attempting{n + 1}`
    pub fn finish_cooldown(&mut self) -> RetryState {
        if let RetryState::Cooldown { attempt, .. } = self.state {
            self.state = RetryState::Attempting {
                attempt: attempt + 1,
            };
        }
        self.state
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}
