// ABOUTME: Environment configuration for credentials, file locations, and retry timing
// ABOUTME: Pure lookup-based constructor so tests never touch the process environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `GEMINI_API_KEY`, `GEMINI_API_KEY_1`, ... | none |
//! | `GEMINI_MODEL` | `gemini-2.5-flash` |
//! | `TELEGRAM_TOKEN` | none |
//! | `COACH_USERS_FILE` | `users.json` |
//! | `COACH_TELEMETRY_DIR` | `telemetry` |
//! | `COACH_PROMPTS_FILE` | none |
//! | `COACH_QUOTA_COOLDOWN_MS` | `1000` |
//! | `COACH_TRANSIENT_COOLDOWN_MS` | `2000` |
//! | `COACH_LOG_THRESHOLD` | `10.0` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use coach_core::constants::training_load::LOG_TRIMP_THRESHOLD;
use tracing::{info, warn};

use crate::credentials::{Credential, KeyPool};
use crate::llm::gemini::DEFAULT_MODEL;
use crate::resilience::RetryPolicy;

/// Primary credential variable; numbered siblings follow as `<name>_1`, `<name>_2`, ...
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_USERS_FILE: &str = "users.json";
const DEFAULT_TELEMETRY_DIR: &str = "telemetry";

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Generation credentials in rotation order
    pub credentials: Vec<Credential>,
    /// Default generation model
    pub gemini_model: String,
    /// Telegram bot token; delivery is unavailable without it
    pub telegram_token: Option<String>,
    /// JSON array of user profiles
    pub users_file: PathBuf,
    /// Root of the exported telemetry bundles
    pub telemetry_dir: PathBuf,
    /// Optional prompt template overrides
    pub prompts_file: Option<PathBuf>,
    /// Executor retry policy
    pub retry: RetryPolicy,
    /// TRIMP above which an activity appears in the prompt log
    pub log_threshold: f64,
}

impl CoachConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("{}", config.summary());
        Ok(config)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = load_credentials(&lookup);
        if credentials.is_empty() {
            warn!("No {GEMINI_API_KEY_ENV} configured; coaching reports will be unavailable");
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            quota_cooldown: parse_or(&lookup, "COACH_QUOTA_COOLDOWN_MS", millis(defaults.quota_cooldown))
                .map(Duration::from_millis)?,
            transient_cooldown: parse_or(
                &lookup,
                "COACH_TRANSIENT_COOLDOWN_MS",
                millis(defaults.transient_cooldown),
            )
            .map(Duration::from_millis)?,
            ..defaults
        };

        let log_threshold: f64 = parse_or(&lookup, "COACH_LOG_THRESHOLD", LOG_TRIMP_THRESHOLD)?;
        if !log_threshold.is_finite() || log_threshold < 0.0 {
            anyhow::bail!("COACH_LOG_THRESHOLD must be a non-negative number, got {log_threshold}");
        }

        Ok(Self {
            credentials,
            gemini_model: non_empty(&lookup, "GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            telegram_token: non_empty(&lookup, "TELEGRAM_TOKEN"),
            users_file: non_empty(&lookup, "COACH_USERS_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_USERS_FILE), PathBuf::from),
            telemetry_dir: non_empty(&lookup, "COACH_TELEMETRY_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_TELEMETRY_DIR), PathBuf::from),
            prompts_file: non_empty(&lookup, "COACH_PROMPTS_FILE").map(PathBuf::from),
            retry,
            log_threshold,
        })
    }

    /// Fresh key pool over the configured credentials
    #[must_use]
    pub fn key_pool(&self) -> KeyPool {
        KeyPool::new(self.credentials.iter().cloned())
    }

    /// Configuration summary for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Daily coach configuration:\n\
             - Gemini keys: {}\n\
             - Gemini model: {}\n\
             - Telegram: {}\n\
             - Users file: {}\n\
             - Telemetry dir: {}\n\
             - Prompt overrides: {}\n\
             - Cooldowns: quota {}ms, transient {}ms\n\
             - Activity log threshold: TRIMP > {}",
            self.credentials.len(),
            self.gemini_model,
            if self.telegram_token.is_some() { "configured" } else { "not configured" },
            self.users_file.display(),
            self.telemetry_dir.display(),
            self.prompts_file
                .as_ref()
                .map_or_else(|| "built-in".to_owned(), |path| path.display().to_string()),
            self.retry.quota_cooldown.as_millis(),
            self.retry.transient_cooldown.as_millis(),
            self.log_threshold,
        )
    }
}

/// Read `GEMINI_API_KEY` then `GEMINI_API_KEY_1`, `GEMINI_API_KEY_2`, ...
///
/// Numbered keys stop at the first missing or empty index. Blank values are skipped.
pub fn load_credentials<F>(lookup: F) -> Vec<Credential>
where
    F: Fn(&str) -> Option<String>,
{
    let mut credentials: Vec<Credential> = non_empty(&lookup, GEMINI_API_KEY_ENV)
        .map(Credential::new)
        .into_iter()
        .collect();

    credentials.extend(
        (1..)
            .map_while(|index| non_empty(&lookup, &format!("{GEMINI_API_KEY_ENV}_{index}")))
            .map(Credential::new),
    );
    credentials
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty(lookup, key).map_or(Ok(default), |raw| {
        raw.parse()
            .with_context(|| format!("Invalid {key} value: {raw}"))
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
