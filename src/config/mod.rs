// ABOUTME: Configuration module for the coaching pipeline
// ABOUTME: Environment-only settings for credentials, collaborators, and retry timing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variable loading
pub mod environment;

pub use environment::{load_credentials, CoachConfig};
