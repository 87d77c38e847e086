// ABOUTME: Main library entry point for the daily coaching pipeline
// ABOUTME: Quota-resilient AI generation over wearable telemetry, delivered to messaging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Daily Coach
//!
//! Turns daily wearable telemetry into AI-generated coaching delivered over
//! Telegram. Scoring lives in `coach-intelligence`; this crate holds the
//! pieces that talk to the outside world and the resilience layer in front of
//! the quota-limited generation API.
//!
//! ## Architecture
//!
//! - **Credentials**: credential newtype and the rotating [`KeyPool`](credentials::KeyPool)
//! - **Resilience**: retry state machine and [`ResilientExecutor`](resilience::ResilientExecutor)
//! - **LLM**: generation provider trait, Gemini implementation, prompt templates
//! - **Providers**: telemetry provider trait and Garmin export parsing
//! - **Users**: athlete profiles and the user directory
//! - **Notifications**: message senders and reminder text
//! - **Pipeline**: per-user fetch, score, generate, deliver
//! - **Config / Logging**: environment configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use daily_coach::credentials::KeyPool;
//! use daily_coach::resilience::{Outcome, ResilientExecutor};
//!
//! # async fn example() {
//! let executor = ResilientExecutor::new(KeyPool::new(["key-a", "key-b"]));
//! let text = executor
//!     .execute(
//!         |credential| async move { Outcome::Success(format!("used {}", credential.masked())) },
//!         "fallback".to_owned(),
//!     )
//!     .await;
//! # }
//! ```

/// Environment configuration
pub mod config;

/// Credential newtype and rotating key pool
pub mod credentials;

/// Generation providers and prompt construction
pub mod llm;

/// Logging configuration and subscriber setup
pub mod logging;

/// Message delivery
pub mod notifications;

/// Per-user coaching pipeline
pub mod pipeline;

/// Telemetry providers
pub mod providers;

/// Retry state machine and resilient executor
pub mod resilience;

/// Athlete profiles and user directory
pub mod users;

pub use coach_core::{constants, errors, models};
