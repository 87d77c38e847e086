// ABOUTME: Command-line entry point running one coaching or reminder cycle for all active users
// ABOUTME: Loads environment config, wires collaborators, and logs a per-user run summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Daily Coach Binary
//!
//! Meant to be scheduled: `--mode sleep-analysis` in the morning, `--mode remind`
//! before the evening sync, `--mode daily` after it. `--mode workout-analysis`
//! can run after any sync that recorded a session.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use coach_intelligence::TrainingLoadAccumulator;
use daily_coach::{
    config::CoachConfig,
    llm::{
        prompts::{CoachingMode, PromptBuilder},
        GeminiProvider,
    },
    logging,
    notifications::{LogSender, MessageSender, TelegramSender},
    pipeline::{send_reminders, CoachingPipeline, RunSummary},
    providers::FileTelemetryProvider,
    resilience::ResilientExecutor,
    users::{JsonUserDirectory, UserDirectory},
};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Evening training report
    Daily,
    /// Morning sleep report
    #[value(alias = "sleep_analysis")]
    SleepAnalysis,
    /// Detailed analysis of today's sessions
    #[value(alias = "workout_analysis")]
    WorkoutAnalysis,
    /// Sync-your-watch reminder
    Remind,
}

#[derive(Debug, Parser)]
#[command(name = "daily-coach")]
#[command(about = "Daily Coach - AI coaching reports from wearable telemetry")]
struct Args {
    /// Which cycle to run
    #[arg(long, value_enum, default_value = "daily")]
    mode: RunMode,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Report date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let config = CoachConfig::from_env()?;
    let users = JsonUserDirectory::new(&config.users_file)
        .active_users()
        .await
        .context("Failed to load users")?;
    if users.is_empty() {
        warn!("No active users found");
        return Ok(());
    }

    let sender = build_sender(&config, args.dry_run)?;

    let summary = match args.mode {
        RunMode::Remind => send_reminders(sender.as_ref(), &users).await,
        RunMode::Daily => run_coaching(&config, sender, users, CoachingMode::Daily, args.date).await?,
        RunMode::SleepAnalysis => {
            run_coaching(&config, sender, users, CoachingMode::SleepAnalysis, args.date).await?
        }
        RunMode::WorkoutAnalysis => {
            run_coaching(&config, sender, users, CoachingMode::WorkoutAnalysis, args.date).await?
        }
    };

    info!(
        delivered = summary.delivered(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "Run summary: {}",
        serde_json::to_string(&summary.reports).unwrap_or_default()
    );
    Ok(())
}

fn build_sender(config: &CoachConfig, dry_run: bool) -> Result<Arc<dyn MessageSender>> {
    if dry_run {
        info!("Dry run: messages will be logged, not sent");
        return Ok(Arc::new(LogSender));
    }
    let token = config
        .telegram_token
        .as_deref()
        .context("TELEGRAM_TOKEN is required unless --dry-run is set")?;
    Ok(Arc::new(TelegramSender::new(token)))
}

async fn run_coaching(
    config: &CoachConfig,
    sender: Arc<dyn MessageSender>,
    users: Vec<daily_coach::users::UserProfile>,
    mode: CoachingMode,
    date: Option<NaiveDate>,
) -> Result<RunSummary> {
    let prompts = match &config.prompts_file {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt templates {}", path.display()))?;
            PromptBuilder::from_json(&contents)?
        }
        None => PromptBuilder::new(),
    };

    let executor = Arc::new(ResilientExecutor::new(config.key_pool()).with_policy(config.retry));
    let generator = GeminiProvider::new().with_default_model(&config.gemini_model);
    let telemetry = FileTelemetryProvider::new(&config.telemetry_dir);

    let pipeline = CoachingPipeline::new(
        executor,
        Arc::new(telemetry),
        Arc::new(generator),
        sender,
    )
    .with_prompts(prompts)
    .with_accumulator(TrainingLoadAccumulator::new().with_log_threshold(config.log_threshold));

    let now = Local::now().naive_local();
    let today = date.unwrap_or_else(|| now.date());
    Ok(pipeline.run(users, mode, today, now).await)
}
