// ABOUTME: Messaging boundary for delivering coaching reports and reminders
// ABOUTME: Telegram sender with plain-text fallback plus a logging sender for dry runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod telegram;

pub use telegram::TelegramSender;

use async_trait::async_trait;
use coach_core::errors::AppResult;
use tracing::info;

/// Delivers text to a chat
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sender identifier for logging
    fn name(&self) -> &'static str;

    /// Send `text` to `chat_id`
    ///
    /// # Errors
    ///
    /// Returns an error when the message could not be delivered.
    async fn send(&self, chat_id: &str, text: &str) -> AppResult<()>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, chat_id: &str, text: &str) -> AppResult<()> {
        info!(chat_id, chars = text.chars().count(), "Dry run, message not sent:\n{text}");
        Ok(())
    }
}

/// Nudge asking an athlete to sync their watch before the daily analysis
#[must_use]
pub fn reminder_message(name: &str) -> String {
    format!(
        "🔔 *IMPORTANT REMINDER FOR {}*\n\n\
         Open Garmin Connect and *sync your watch now* \
         so your AI coach analyzes today's freshest data! ⌚️🏃",
        name.to_uppercase()
    )
}
