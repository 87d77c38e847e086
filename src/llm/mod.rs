// ABOUTME: Generation provider abstraction with a typed quota-aware error
// ABOUTME: Defines the contract the resilient executor drives with one credential per attempt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Generation Provider Interface
//!
//! The coaching pipeline treats the AI endpoint as an opaque operation: given
//! one credential and a request it either returns generated text or fails
//! with a [`GenerationError`]. Providers classify their own failures, so the
//! [`ResilientExecutor`](crate::resilience::ResilientExecutor) switches on an
//! explicit kind instead of pattern-matching error text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use daily_coach::credentials::Credential;
//! use daily_coach::llm::{GeminiProvider, GenerationProvider, GenerationRequest};
//!
//! async fn example(key: Credential) {
//!     let provider = GeminiProvider::new();
//!     let request = GenerationRequest::new("You are a running coach.", "Plan my week.");
//!     let advice = provider.generate(&key, &request).await;
//! }
//! ```

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::Credential;

/// Substrings that mark a provider error as a quota/rate-limit rejection
const QUOTA_INDICATORS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];

/// Why a single generation attempt failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The endpoint rejected the call because of rate or usage limits
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Any other failure (network, server error, malformed response)
    #[error("generation failed: {0}")]
    Transient(String),
}

impl GenerationError {
    /// Classify a raw provider error message
    ///
    /// Messages containing `429`, `RESOURCE_EXHAUSTED`, or `quota` (any case)
    /// are quota rejections; everything else is transient.
    #[must_use]
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_quota_indicator(&message) {
            Self::QuotaExceeded(message)
        } else {
            Self::Transient(message)
        }
    }

    /// Whether this is a quota rejection
    #[must_use]
    pub const fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Underlying provider message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExceeded(message) | Self::Transient(message) => message,
        }
    }
}

/// Whether an error message carries a quota indicator
#[must_use]
pub fn is_quota_indicator(message: &str) -> bool {
    QUOTA_INDICATORS
        .iter()
        .any(|indicator| message.contains(indicator))
        || message.to_lowercase().contains("quota")
}

/// A single text generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System instruction (may be empty)
    pub system_prompt: String,
    /// User content
    pub user_prompt: String,
    /// Model override; the provider default is used when absent
    pub model: Option<String>,
}

impl GenerationRequest {
    /// Create a request with system and user prompts
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: None,
        }
    }

    /// Use a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// AI text generation endpoint
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider identifier for logging
    fn name(&self) -> &'static str;

    /// Generate text using the given credential
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::QuotaExceeded` when the credential is rate
    /// limited or out of quota, `GenerationError::Transient` otherwise.
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;
}
