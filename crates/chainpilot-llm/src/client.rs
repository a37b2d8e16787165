//! Analyst trait and the OpenAI-compatible implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use chainpilot_core::{AnalysisPlan, Task};

use crate::error::AnalysisError;
use crate::prompt::{build_task_prompt, SYSTEM_PROMPT};
use crate::types::{ChatMessage, CompletionRequest, CompletionResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Produces an analysis plan for a task.
///
/// The orchestrator depends on this trait rather than a concrete client so
/// the reasoning call can be mocked in tests.
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Analyze a task and return its structured plan.
    async fn analyze(&self, task: &Task) -> Result<AnalysisPlan, AnalysisError>;
}

/// Analyst backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiAnalyst {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAnalyst {
    /// Create an analyst with the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the analyst at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Apply a request timeout to the underlying HTTP client.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if let Ok(http) = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
        {
            self.http = http;
        }
        self
    }
}

#[async_trait]
impl Analyst for OpenAiAnalyst {
    async fn analyze(&self, task: &Task) -> Result<AnalysisPlan, AnalysisError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_task_prompt(task)),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(kind = %task.kind, model = %self.model, "requesting task analysis");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)?;

        let plan: AnalysisPlan = serde_json::from_str(content.trim())?;
        info!(kind = %task.kind, has_abi = plan.contract_abi.is_some(), "task analysis complete");
        Ok(plan)
    }
}
