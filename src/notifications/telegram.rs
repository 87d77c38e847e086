// ABOUTME: Telegram Bot API sender using sendMessage over reqwest
// ABOUTME: Sends with Markdown first and retries once as plain text when formatting is rejected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use coach_core::errors::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::MessageSender;

/// Base URL for the Telegram Bot API
const API_BASE_URL: &str = "https://api.telegram.org";

/// Parse mode for formatted reports
const MARKDOWN: &str = "Markdown";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram bot sender
#[derive(Clone)]
pub struct TelegramSender {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramSender {
    /// Sender for the bot identified by `bot_token`
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE_URL.to_owned(),
            bot_token: bot_token.into(),
        }
    }

    /// Point the sender at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> AppResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode,
            })
            .send()
            .await
            // The URL carries the bot token
            .map_err(|e| {
                AppError::external_service("telegram", format!("Request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(
                "telegram",
                format!("Failed to read response: {}", e.without_url()),
            )
        })?;
        let parsed = serde_json::from_str::<TelegramResponse>(&body).ok();

        match parsed {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(TelegramResponse { description, .. }) => Err(AppError::external_service(
                "telegram",
                format!(
                    "sendMessage failed ({}): {}",
                    status.as_u16(),
                    description.unwrap_or_default()
                ),
            )),
            None => Err(AppError::external_service(
                "telegram",
                format!("sendMessage failed ({}): {body}", status.as_u16()),
            )),
        }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, chat_id: &str, text: &str) -> AppResult<()> {
        debug!(chat_id, "Sending Telegram message");
        match self.send_message(chat_id, text, Some(MARKDOWN)).await {
            Ok(()) => {
                info!(chat_id, "Telegram message sent");
                Ok(())
            }
            Err(error) => {
                warn!(chat_id, error = %error, "Markdown rejected, retrying as plain text");
                self.send_message(chat_id, text, None).await?;
                info!(chat_id, "Telegram message sent as plain text");
                Ok(())
            }
        }
    }
}

impl Debug for TelegramSender {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TelegramSender")
            .field("base_url", &self.base_url)
            .field("bot_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
