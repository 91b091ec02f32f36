//! OpenAI-compatible chat completions client
//!
//! Both the vision and the chat collaborators speak the same wire format:
//! `POST {base}/chat/completions` with a bearer token, answering with
//! `choices[0].message.content`. This client owns the transport concerns
//! (timeout, status handling, response parsing, opt-in retries) so callers
//! only build the request body.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Response contained no choices")]
    NoChoices,
}

impl CompletionError {
    /// Transport failures and 5xx responses are the only retryable outcomes.
    fn is_transient(&self) -> bool {
        match self {
            CompletionError::Request(_) => true,
            CompletionError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single text turn in a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Text-only chat request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Transport options shared by every completion call
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Additional attempts after the first one. Zero means single-attempt.
    pub max_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
        }
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    api_url: Arc<String>,
    api_key: Arc<String>,
    max_retries: u32,
}

impl CompletionClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, CompletionError> {
        Self::with_options(api_url, api_key, ClientOptions::default())
    }

    pub fn with_options(
        api_url: &str,
        api_key: &str,
        options: ClientOptions,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("roast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: Arc::new(api_url.trim_end_matches('/').to_string()),
            api_key: Arc::new(api_key.to_string()),
            max_retries: options.max_retries,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    /// Send a completion request and return the first choice's text content.
    ///
    /// Non-2xx statuses, bodies that do not parse, an empty `choices` array
    /// and a missing `content` field are all errors; there is no fallback
    /// value.
    pub async fn complete<T>(&self, body: &T) -> Result<String, CompletionError>
    where
        T: Serialize + ?Sized,
    {
        let mut attempt = 0;
        loop {
            match self.complete_once(body).await {
                Err(e) if attempt < self.max_retries && e.is_transient() => {
                    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "Completion attempt {} failed, retrying in {:?}: {}",
                        attempt, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn complete_once<T>(&self, body: &T) -> Result<String, CompletionError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint();
        debug!("Completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Completion API error {}: {}", status, message);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.text().await?;
        parse_content(&raw)
    }
}

fn parse_content(raw: &str) -> Result<String, CompletionError> {
    let parsed: CompletionResponse =
        serde_json::from_str(raw).map_err(|e| CompletionError::Malformed(e.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?;

    choice
        .message
        .content
        .ok_or_else(|| CompletionError::Malformed("choice has no message content".to_string()))
}
