use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::GenerationError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-2.5-flash";

/// Attempts on the primary model before switching to the fallback.
pub const PRIMARY_ATTEMPTS: u32 = 3;

/// Attempts on the fallback model.
pub const FALLBACK_ATTEMPTS: u32 = 2;

const BACKOFF_STEP: Duration = Duration::from_millis(2000);
const BACKOFF_CAP: Duration = Duration::from_millis(6000);

static TRANSIENT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)429|503|overload|temporarily unavailable|try again").unwrap()
});

/// Whether a failed call is worth repeating.
pub fn is_transient(e: &GenerationError) -> bool {
    match e {
        GenerationError::Connection(_) => true,
        GenerationError::Api { status, body } => {
            matches!(status, 429 | 503) || TRANSIENT_MESSAGE.is_match(body)
        }
        GenerationError::HttpClient(msg) => {
            msg.contains("timed out") || TRANSIENT_MESSAGE.is_match(msg)
        }
        _ => false,
    }
}

/// Delay before the retry following attempt `attempt` (0-based):
/// `step * (attempt + 1)`, capped.
pub fn backoff_delay(attempt: u32, step: Duration, cap: Duration) -> Duration {
    step.saturating_mul(attempt + 1).min(cap)
}

/// Run `op` up to `attempts` times, sleeping between tries. Only transient
/// errors are retried; anything else returns immediately.
pub fn with_retry<T, F>(
    attempts: u32,
    step: Duration,
    cap: Duration,
    mut op: F,
) -> Result<T, GenerationError>
where
    F: FnMut(u32) -> Result<T, GenerationError>,
{
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && attempt + 1 < attempts => {
                let delay = backoff_delay(attempt, step, cap);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Model call failed, retrying"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Gemini `generateContent` client with retry and model fallback.
pub struct GeminiClient {
    api_key: String,
    primary_model: String,
    fallback_model: String,
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    backoff_step: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        primary_model: &str,
        fallback_model: &str,
        timeout_secs: u64,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            primary_model: primary_model.to_string(),
            fallback_model: fallback_model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            client,
            timeout_secs,
            backoff_step: BACKOFF_STEP,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    fn require_key(&self) -> Result<&str, GenerationError> {
        if self.api_key.is_empty() {
            Err(GenerationError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            GenerationError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            GenerationError::HttpClient(e.to_string())
        }
    }

    /// One `generateContent` call against a specific model.
    pub fn generate_with_model(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, GenerationError> {
        let key = self.require_key()?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let body = GenerateContentRequest::new(prompt, system);

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;
        parsed.text()
    }

    fn generate_with_retry(
        &self,
        model: &str,
        attempts: u32,
        prompt: &str,
        system: &str,
    ) -> Result<String, GenerationError> {
        with_retry(attempts, self.backoff_step, BACKOFF_CAP, |_| {
            self.generate_with_model(model, prompt, system)
        })
    }
}

impl LlmClient for GeminiClient {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        self.require_key()?;
        match self.generate_with_retry(&self.primary_model, PRIMARY_ATTEMPTS, prompt, system) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    primary = %self.primary_model,
                    fallback = %self.fallback_model,
                    error = %e,
                    "Primary model failed, switching to fallback"
                );
                self.generate_with_retry(&self.fallback_model, FALLBACK_ATTEMPTS, prompt, system)
            }
        }
    }

    fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let key = self.require_key()?;
        let url = format!("{}/v1/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", key)])
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ListModelsResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, system: &'a str) -> Self {
        let system_instruction = (!system.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part { text: system }],
        });
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction,
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(self) -> Result<String, GenerationError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::ResponseParsing("No candidates in response".into()))?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GenerationError::ResponseParsing("Empty candidate text".into()));
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

/// Mock LLM client for testing. Replays scripted responses in order and
/// repeats the last one once the script runs out.
pub struct MockLlmClient {
    script: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
    available_models: Vec<String>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_script(vec![response])
    }

    pub fn with_script(responses: Vec<&str>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            last: Mutex::new(String::new()),
            failure: None,
            prompts: Mutex::new(Vec::new()),
            available_models: vec![DEFAULT_PRIMARY_MODEL.to_string()],
        }
    }

    /// A client whose every call fails with a connection error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_script(Vec::new())
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str, _system: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(GenerationError::Connection(message.clone()));
        }

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            *last = next;
        }
        Ok(last.clone())
    }

    fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        if let Some(message) = &self.failure {
            return Err(GenerationError::Connection(message.clone()));
        }
        Ok(self.available_models.clone())
    }
}
