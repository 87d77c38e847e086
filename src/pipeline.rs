// ABOUTME: Per-user coaching pipeline: fetch, score, accumulate load, prompt, generate, deliver
// ABOUTME: Runs one isolated task per user against a shared resilient executor and reports outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Coaching Pipeline
//!
//! Every registered user gets an independent task:
//!
//! 1. fetch the day's telemetry
//! 2. compute the readiness score and the 7-day training load
//! 3. render the prompt for the requested [`CoachingMode`]; workout analysis
//!    is skipped for users who recorded nothing on the report day
//! 4. generate the report through the shared [`ResilientExecutor`]
//! 5. deliver it with the [`MessageSender`]
//!
//! All tasks share one executor and therefore one credential pool. When the
//! executor gives up, that user's report is skipped for this cycle; other
//! users are unaffected, as are failures in fetching or delivery.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use coach_intelligence::{ReadinessScorer, TrainingLoadAccumulator};
use futures_util::future::join_all;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::llm::prompts::{CoachingMode, PromptBuilder, PromptContext};
use crate::llm::GenerationProvider;
use crate::notifications::{reminder_message, MessageSender};
use crate::providers::TelemetryProvider;
use crate::resilience::{ExecutionFailure, Outcome, ResilientExecutor};
use crate::users::UserProfile;

/// Why a user received nothing this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Profile has no chat id
    NoChatId,
    /// No generation credentials configured
    NoCredentials,
    /// Every credential failed
    CoachingUnavailable,
    /// Workout analysis requested but no activity started today
    NoActivityToday,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoChatId => "no chat id",
            Self::NoCredentials => "no generation credentials",
            Self::CoachingUnavailable => "coaching unavailable this cycle",
            Self::NoActivityToday => "no activity today",
        })
    }
}

/// What happened for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum UserOutcome {
    /// Message delivered
    Delivered,
    /// Nothing sent, by policy
    Skipped(SkipReason),
    /// A collaborator failed
    Failed(String),
}

/// Per-user record of a run
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    /// User display name
    pub user: String,
    /// Outcome
    pub outcome: UserOutcome,
    /// Readiness score when telemetry was available
    pub readiness_score: Option<u8>,
    /// Average daily TRIMP when telemetry was available
    pub average_daily_load: Option<f64>,
    /// Generation attempts made for this user
    pub generation_attempts: u32,
}

impl UserReport {
    fn new(user: &UserProfile, outcome: UserOutcome) -> Self {
        Self {
            user: user.name.clone(),
            outcome,
            readiness_score: None,
            average_daily_load: None,
            generation_attempts: 0,
        }
    }
}

/// Outcome of a whole run, in user order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One report per user
    pub reports: Vec<UserReport>,
}

impl RunSummary {
    /// Users whose message was delivered
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.count(|outcome| matches!(outcome, UserOutcome::Delivered))
    }

    /// Users skipped by policy
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, UserOutcome::Skipped(_)))
    }

    /// Users whose processing failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, UserOutcome::Failed(_)))
    }

    /// Report for a user by name
    #[must_use]
    pub fn report_for(&self, user: &str) -> Option<&UserReport> {
        self.reports.iter().find(|report| report.user == user)
    }

    fn count(&self, predicate: impl Fn(&UserOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// Wires the collaborators together for each user
#[derive(Clone)]
pub struct CoachingPipeline {
    executor: Arc<ResilientExecutor>,
    telemetry: Arc<dyn TelemetryProvider>,
    generator: Arc<dyn GenerationProvider>,
    sender: Arc<dyn MessageSender>,
    prompts: Arc<PromptBuilder>,
    accumulator: TrainingLoadAccumulator,
}

impl fmt::Debug for CoachingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoachingPipeline")
            .field("executor", &self.executor)
            .field("telemetry", &self.telemetry.name())
            .field("generator", &self.generator.name())
            .field("sender", &self.sender.name())
            .finish_non_exhaustive()
    }
}

impl CoachingPipeline {
    /// Pipeline with built-in prompts and the default load accumulator
    #[must_use]
    pub fn new(
        executor: Arc<ResilientExecutor>,
        telemetry: Arc<dyn TelemetryProvider>,
        generator: Arc<dyn GenerationProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            executor,
            telemetry,
            generator,
            sender,
            prompts: Arc::new(PromptBuilder::new()),
            accumulator: TrainingLoadAccumulator::new(),
        }
    }

    /// Use custom prompt templates
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    /// Use a custom training load accumulator
    #[must_use]
    pub const fn with_accumulator(mut self, accumulator: TrainingLoadAccumulator) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Process every user concurrently
    ///
    /// `today` anchors telemetry and the load window; `now` is the local
    /// timestamp shown in the report.
    pub async fn run(
        &self,
        users: Vec<UserProfile>,
        mode: CoachingMode,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> RunSummary {
        info!(users = users.len(), %mode, %today, "Starting coaching run");

        let mut tasks = JoinSet::new();
        let mut task_users = HashMap::new();
        for (index, user) in users.into_iter().enumerate() {
            let pipeline = self.clone();
            let name = user.name.clone();
            let handle = tasks.spawn(async move {
                pipeline.process_user(&user, mode, today, now).await
            });
            task_users.insert(handle.id(), (index, name));
        }

        let mut reports = Vec::with_capacity(task_users.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, report)) => {
                    let index = task_users.get(&id).map_or(usize::MAX, |(index, _)| *index);
                    reports.push((index, report));
                }
                Err(join_error) => {
                    let (index, name) = task_users
                        .get(&join_error.id())
                        .cloned()
                        .unwrap_or((usize::MAX, "unknown".to_owned()));
                    error!(user = %name, error = %join_error, "User task aborted");
                    reports.push((
                        index,
                        UserReport {
                            user: name,
                            outcome: UserOutcome::Failed(format!("task aborted: {join_error}")),
                            readiness_score: None,
                            average_daily_load: None,
                            generation_attempts: 0,
                        },
                    ));
                }
            }
        }
        reports.sort_by_key(|(index, _)| *index);

        let summary = RunSummary {
            reports: reports.into_iter().map(|(_, report)| report).collect(),
        };
        info!(
            delivered = summary.delivered(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Coaching run finished"
        );
        summary
    }

    /// Fetch, score, generate and deliver for one user
    pub async fn process_user(
        &self,
        user: &UserProfile,
        mode: CoachingMode,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> UserReport {
        let Some(chat_id) = user.delivery_target() else {
            warn!(user = %user.name, "No chat id, skipping");
            return UserReport::new(user, UserOutcome::Skipped(SkipReason::NoChatId));
        };

        let telemetry = match self.telemetry.fetch_daily(user, today).await {
            Ok(telemetry) => telemetry,
            Err(e) => {
                error!(user = %user.name, error = %e, "Failed to fetch telemetry");
                return UserReport::new(user, UserOutcome::Failed(e.to_string()));
            }
        };

        let readiness_score = ReadinessScorer::score(&telemetry.snapshot);
        let load = self.accumulator.accumulate(
            &telemetry.activities,
            telemetry.snapshot.resting_hr,
            today,
        );
        info!(
            user = %user.name,
            readiness = readiness_score,
            avg_daily_load = load.average_daily_load,
            logged_activities = load.per_activity_log.len(),
            "Computed metrics"
        );

        let mut report = UserReport::new(user, UserOutcome::Delivered);
        report.readiness_score = Some(readiness_score);
        report.average_daily_load = Some(load.average_daily_load);

        if mode == CoachingMode::WorkoutAnalysis && telemetry.activities_today().next().is_none() {
            info!(user = %user.name, "No activity today, skipping workout analysis");
            report.outcome = UserOutcome::Skipped(SkipReason::NoActivityToday);
            return report;
        }

        let request = self.prompts.build(
            mode,
            &PromptContext {
                user,
                telemetry: &telemetry,
                readiness_score,
                load: &load,
                generated_at: now,
            },
        );

        let generator = &self.generator;
        let request = &request;
        let execution = self
            .executor
            .execute_with_report(|credential| async move {
                Outcome::from(generator.generate(&credential, request).await)
            })
            .await;

        report.generation_attempts = execution.attempts;

        let text = match execution.result {
            Ok(text) => text,
            Err(failure) => {
                let reason = match failure {
                    ExecutionFailure::EmptyPool => SkipReason::NoCredentials,
                    ExecutionFailure::PoolExhausted => SkipReason::CoachingUnavailable,
                };
                warn!(user = %user.name, %reason, "Skipping delivery");
                report.outcome = UserOutcome::Skipped(reason);
                return report;
            }
        };

        if let Err(e) = self.sender.send(chat_id, &text).await {
            error!(user = %user.name, error = %e, "Failed to deliver report");
            report.outcome = UserOutcome::Failed(e.to_string());
        } else {
            info!(user = %user.name, sender = self.sender.name(), "Report delivered");
        }
        report
    }
}

/// Send the sync reminder to every user concurrently
pub async fn send_reminders(sender: &dyn MessageSender, users: &[UserProfile]) -> RunSummary {
    info!(users = users.len(), "Sending sync reminders");
    let reports = join_all(users.iter().map(|user| async move {
        let Some(chat_id) = user.delivery_target() else {
            warn!(user = %user.name, "No chat id, skipping reminder");
            return UserReport::new(user, UserOutcome::Skipped(SkipReason::NoChatId));
        };
        match sender.send(chat_id, &reminder_message(&user.name)).await {
            Ok(()) => {
                info!(user = %user.name, "Reminder sent");
                UserReport::new(user, UserOutcome::Delivered)
            }
            Err(e) => {
                error!(user = %user.name, error = %e, "Failed to send reminder");
                UserReport::new(user, UserOutcome::Failed(e.to_string()))
            }
        }
    }))
    .await;

    RunSummary { reports }
}
