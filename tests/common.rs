// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Recording delay, scripted collaborators, fixtures, and a minimal local HTTP server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `daily_coach`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use daily_coach::credentials::Credential;
use daily_coach::errors::{AppError, AppResult};
use daily_coach::llm::{GenerationError, GenerationProvider, GenerationRequest};
use daily_coach::models::DailyTelemetry;
use daily_coach::notifications::MessageSender;
use daily_coach::providers::TelemetryProvider;
use daily_coach::resilience::Delay;
use daily_coach::users::UserProfile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// Date helper for fixtures
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// ============================================================================
// Delay
// ============================================================================

/// Records requested cooldowns without sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generation provider answering per credential
///
/// Credentials without a scripted answer fail with a quota error.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    answers: HashMap<String, Result<String, GenerationError>>,
    calls: Mutex<Vec<(String, GenerationRequest)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, credential: &str, answer: Result<String, GenerationError>) -> Self {
        self.answers.insert(credential.to_owned(), answer);
        self
    }

    /// Credentials used, in call order
    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(credential, _)| credential.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.expose().to_owned(), request.clone()));
        self.answers
            .get(credential.expose())
            .cloned()
            .unwrap_or_else(|| Err(GenerationError::QuotaExceeded("429 RESOURCE_EXHAUSTED".into())))
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Telemetry keyed by user name; unknown users fail with not found
#[derive(Debug, Default)]
pub struct StaticTelemetry {
    days: HashMap<String, DailyTelemetry>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, user: &str, telemetry: DailyTelemetry) -> Self {
        self.days.insert(user.to_owned(), telemetry);
        self
    }
}

#[async_trait]
impl TelemetryProvider for StaticTelemetry {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_daily(&self, user: &UserProfile, _date: NaiveDate) -> AppResult<DailyTelemetry> {
        self.days
            .get(&user.name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Telemetry for {}", user.name)))
    }
}

// ============================================================================
// Messaging
// ============================================================================

/// Records sent messages; chat ids in `failing` reject every send
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: Vec<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, chat_id: &str) -> Self {
        self.failing.push(chat_id.to_owned());
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, chat_id: &str, text: &str) -> AppResult<()> {
        if self.failing.iter().any(|id| id == chat_id) {
            return Err(AppError::external_service("recording", "chat unreachable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_owned(), text.to_owned()));
        Ok(())
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Request captured by the mock server
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    /// e.g. `POST /v1beta/models/x:generateContent?key=abc HTTP/1.1`
    pub request_line: String,
    pub body: String,
}

/// Local HTTP server answering connections with canned responses in order
#[derive(Debug)]
pub struct MockHttpServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockHttpServer {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                captured.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    reason_phrase(status),
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await.unwrap_or(0);
        if read == 0 {
            return CapturedRequest::default();
        }
        buffer.extend_from_slice(&chunk[..read]);

        let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let content_length = headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = header_end + 4;
        if buffer.len() >= body_start + content_length {
            return CapturedRequest {
                request_line: headers.lines().next().unwrap_or_default().to_owned(),
                body: String::from_utf8_lossy(&buffer[body_start..body_start + content_length])
                    .to_string(),
            };
        }
    }
}

const fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
