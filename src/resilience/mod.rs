// ABOUTME: Quota-resilient execution of generation calls across a rotating credential pool
// ABOUTME: Explicit retry state machine, injectable delay, and failure-absorbing executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resilience
//!
//! Fronts a rate/quota-constrained endpoint with multiple credentials:
//!
//! - [`RetryMachine`] models one execution as
//!   `Idle → Attempting → Cooldown → Attempting … → Succeeded | Exhausted`
//! - [`Delay`] abstracts the cooldown waits so tests never sleep
//! - [`ResilientExecutor`] drives the machine, rotates the [`KeyPool`](crate::credentials::KeyPool)
//!   after every attempt, and absorbs all failures into a caller default

mod delay;
mod executor;
mod state;

pub use delay::{Delay, TokioDelay};
pub use executor::{ExecutionFailure, ExecutionReport, Outcome, ResilientExecutor};
pub use state::{FailureKind, RetryMachine, RetryPolicy, RetryState};
