// ABOUTME: Athlete profiles and the directory that lists who receives coaching
// ABOUTME: JSON-file backed directory returning active users with personalization defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coach_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Goal used when a profile leaves it blank
pub const DEFAULT_GOAL: &str = "Maintain general fitness";

/// Injury text used when a profile leaves it blank
pub const DEFAULT_INJURY: &str = "None";

/// One coached athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name, also used as the log label
    pub name: String,
    /// Current training goal
    #[serde(default = "default_goal")]
    pub goal: String,
    /// Injuries or medical conditions to respect
    #[serde(default = "default_injury")]
    pub injury: String,
    /// Free-form note for the coach
    #[serde(default)]
    pub note: String,
    /// Messaging destination; users without one are skipped
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Inactive users are never returned by a directory
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_owned()
}

fn default_injury() -> String {
    DEFAULT_INJURY.to_owned()
}

const fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Active profile with default goal and injury
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: default_goal(),
            injury: default_injury(),
            note: String::new(),
            chat_id: None,
            active: true,
        }
    }

    /// Set the messaging destination
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Set the training goal
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the injury description
    #[must_use]
    pub fn with_injury(mut self, injury: impl Into<String>) -> Self {
        self.injury = injury.into();
        self
    }

    /// Set the free-form note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Filesystem-safe identifier derived from the name
    ///
    /// Lowercase ASCII alphanumerics separated by single dashes.
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }

    /// Chat id when present and non-blank
    #[must_use]
    pub fn delivery_target(&self) -> Option<&str> {
        self.chat_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    fn normalize(mut self) -> Self {
        if self.goal.trim().is_empty() {
            self.goal = default_goal();
        }
        if self.injury.trim().is_empty() {
            self.injury = default_injury();
        }
        self
    }
}

/// Source of coached users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Active users, in directory order
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or parsed.
    async fn active_users(&self) -> AppResult<Vec<UserProfile>>;
}

/// Directory backed by a JSON array of profiles
#[derive(Debug, Clone)]
pub struct JsonUserDirectory {
    path: PathBuf,
}

impl JsonUserDirectory {
    /// Directory reading `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON array of profiles and keep the active ones
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON.
    pub fn parse(contents: &str) -> AppResult<Vec<UserProfile>> {
        let profiles: Vec<UserProfile> = serde_json::from_str(contents)
            .map_err(|e| AppError::serialization(format!("Invalid users file: {e}")))?;
        Ok(profiles
            .into_iter()
            .filter(|profile| profile.active && !profile.name.trim().is_empty())
            .map(UserProfile::normalize)
            .collect())
    }
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    async fn active_users(&self) -> AppResult<Vec<UserProfile>> {
        debug!(path = %self.path.display(), "Loading users");
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Users file {}", self.path.display()))
            } else {
                AppError::storage(format!(
                    "Failed to read users file {}: {e}",
                    self.path.display()
                ))
            }
        })?;
        let users = Self::parse(&contents)?;
        info!(count = users.len(), "Loaded active users");
        Ok(users)
    }
}
