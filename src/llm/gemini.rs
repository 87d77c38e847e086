// ABOUTME: Google Gemini generation provider driven one credential at a time
// ABOUTME: Maps rate-limit and quota responses to typed quota errors for credential failover
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! Implementation of [`GenerationProvider`] for Google's Gemini models via the
//! Generative Language API. The API key is not owned by the provider: each call
//! receives the credential chosen by the executor.
//!
//! ## Supported Models
//!
//! - `gemini-2.5-flash` (default)
//! - `gemini-2.0-flash`
//! - `gemini-1.5-pro`
//! - `gemini-1.5-flash`

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{GenerationError, GenerationProvider, GenerationRequest};
use crate::credentials::Credential;

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiError {
    fn describe(&self) -> String {
        match &self.status {
            Some(status) => format!("{status}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini generation provider
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    default_model: String,
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiProvider {
    /// Create a provider against the public Gemini endpoint
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE_URL.to_owned(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point the provider at a different API root (proxies, local test servers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Model used when a request does not name one
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_url(&self, model: &str, credential: &Credential) -> String {
        format!(
            "{}/models/{model}:generateContent?key={}",
            self.base_url,
            credential.expose()
        )
    }

    fn build_gemini_request(request: &GenerationRequest) -> GeminiRequest {
        let text_content = |role: Option<&str>, text: &str| GeminiContent {
            role: role.map(str::to_owned),
            parts: vec![ContentPart {
                text: Some(text.to_owned()),
            }],
        };

        GeminiRequest {
            contents: vec![text_content(Some("user"), &request.user_prompt)],
            system_instruction: (!request.system_prompt.trim().is_empty())
                .then(|| text_content(None, &request.system_prompt)),
        }
    }

    /// Extract the first text part of the first candidate
    fn extract_content(response: &GeminiResponse) -> Result<String, GenerationError> {
        response
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|part| part.text.clone()))
            .ok_or_else(|| GenerationError::Transient("No content in Gemini response".to_owned()))
    }

    /// Map a non-success response to a typed error
    ///
    /// HTTP 429 is always a quota rejection; other statuses are classified
    /// by the error body so `RESOURCE_EXHAUSTED` payloads still fail over.
    fn map_api_error(status: StatusCode, response_text: &str) -> GenerationError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.describe());
        let message = format!("Gemini API error ({}): {message}", status.as_u16());

        if status == StatusCode::TOO_MANY_REQUESTS {
            GenerationError::QuotaExceeded(message)
        } else {
            GenerationError::classify(message)
        }
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, credential);
        let gemini_request = Self::build_gemini_request(request);

        debug!(credential = %credential.masked(), "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            // reqwest errors embed the URL, which carries the key
            .map_err(|e| {
                GenerationError::classify(format!("HTTP request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            GenerationError::Transient(format!("Failed to read response: {}", e.without_url()))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status, &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse response");
                GenerationError::Transient(format!("Failed to parse Gemini response: {e}"))
            })?;

        if let Some(api_error) = gemini_response.error.as_ref() {
            return Err(GenerationError::classify(format!(
                "Gemini API error: {}",
                api_error.describe()
            )));
        }

        let content = Self::extract_content(&gemini_response)?;
        debug!("Successfully received Gemini response");
        Ok(content)
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}
