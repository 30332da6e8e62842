use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::ApiError;
use crate::form::FormInput;

const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server.";

/// Server classification of a submitted idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidateOutcome {
    Verdict { verdict: String, rating: f64 },
    Rejected { error_message: String },
    Info { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub rating: String,
    pub success_probability: String,
    pub advice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub idea: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ValidateResponse {
    verdict: Option<String>,
    rating: Option<f64>,
    error: Option<String>,
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeResponse {
    error: Option<String>,
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    rating: Option<Value>,
    success_probability: Option<Value>,
    advice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PingResponse {
    message: Option<String>,
}

/// Remote operations the form depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaService: Send + Sync {
    async fn validate_idea(&self, input: &FormInput) -> Result<ValidateOutcome, ApiError>;
    async fn analyze_idea(&self, idea: &str) -> Result<AnalysisReport, ApiError>;
    async fn ping(&self) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scalynx-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the status plus the raw body text.
    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "Received response");
        Ok((status, body))
    }
}

#[async_trait]
impl IdeaService for ApiClient {
    async fn validate_idea(&self, input: &FormInput) -> Result<ValidateOutcome, ApiError> {
        let request = self.client.post(self.url("/api/validate-idea")).json(input);
        let (status, body) = self.fetch(request).await?;
        decode_validate(status, &body)
    }

    async fn analyze_idea(&self, idea: &str) -> Result<AnalysisReport, ApiError> {
        let request = self
            .client
            .post(self.url("/api/analyze-idea"))
            .json(&AnalyzeRequest { idea });
        let (status, body) = self.fetch(request).await?;
        decode_analyze(status, &body)
    }

    async fn ping(&self) -> Result<String, ApiError> {
        let (status, body) = self.fetch(self.client.get(self.url("/api/test"))).await?;
        let parsed: PingResponse = serde_json::from_str(&body).unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Application(
                parsed.message.unwrap_or_else(|| status_failure(status)),
            ));
        }
        Ok(parsed.message.unwrap_or_else(|| "Backend is reachable".to_string()))
    }
}

fn status_failure(status: StatusCode) -> String {
    format!("Request failed with status {}", status.as_u16())
}

/// Error text for a body that failed to parse.
fn malformed(status: StatusCode) -> ApiError {
    if status.is_success() {
        ApiError::Application(INVALID_RESPONSE_MESSAGE.to_string())
    } else {
        ApiError::Application(status_failure(status))
    }
}

fn is_error_status(status: &Option<String>) -> bool {
    status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("error"))
}

/// Maps a validate-idea response to an outcome.
///
/// Non-2xx and unparseable bodies are errors. On 2xx a verdict with a rating
/// wins over everything else, then an error indicator, then a plain message.
pub fn decode_validate(status: StatusCode, body: &str) -> Result<ValidateOutcome, ApiError> {
    let parsed: ValidateResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed validate response");
        malformed(status)
    })?;

    if !status.is_success() {
        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| status_failure(status));
        return Err(ApiError::Application(message));
    }

    if let (Some(verdict), Some(rating)) = (parsed.verdict, parsed.rating) {
        return Ok(ValidateOutcome::Verdict { verdict, rating });
    }

    if let Some(error_message) = parsed.error {
        return Ok(ValidateOutcome::Rejected { error_message });
    }

    if is_error_status(&parsed.status) {
        let error_message = parsed
            .message
            .unwrap_or_else(|| INVALID_RESPONSE_MESSAGE.to_string());
        return Ok(ValidateOutcome::Rejected { error_message });
    }

    match parsed.message {
        Some(message) => Ok(ValidateOutcome::Info { message }),
        None => Err(ApiError::Application(INVALID_RESPONSE_MESSAGE.to_string())),
    }
}

/// Maps an analyze-idea response to a report.
pub fn decode_analyze(status: StatusCode, body: &str) -> Result<AnalysisReport, ApiError> {
    let parsed: AnalyzeResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed analyze response");
        malformed(status)
    })?;

    if !status.is_success() || parsed.error.is_some() || is_error_status(&parsed.status) {
        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| status_failure(status));
        return Err(ApiError::Application(message));
    }

    Ok(AnalysisReport {
        strengths: parsed.strengths,
        weaknesses: parsed.weaknesses,
        rating: value_to_text(parsed.rating),
        success_probability: value_to_text(parsed.success_probability),
        advice: parsed.advice.unwrap_or_default(),
    })
}

/// Accepts either a JSON string or a bare number.
fn value_to_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
