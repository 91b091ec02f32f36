use anyhow::{Context, Result};
use roast_providers::vision::{FIREWORKS_DEFAULT_MODEL, GROQ_DEFAULT_MODEL};
use roast_providers::ClientOptions;
use std::fmt;
use std::time::Duration;

pub const DOBBY_UNHINGED: &str =
    "accounts/sentientfoundation/models/dobby-mini-unhinged-llama-3-1-8b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionBackend {
    Groq,
    Fireworks,
}

impl VisionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisionBackend::Groq => "groq",
            VisionBackend::Fireworks => "fireworks",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            VisionBackend::Groq => GROQ_DEFAULT_MODEL,
            VisionBackend::Fireworks => FIREWORKS_DEFAULT_MODEL,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub fireworks_api_url: String,
    pub fireworks_api_key: Option<String>,
    pub groq_api_url: String,
    pub groq_api_key: Option<String>,

    /// Persona chat model (served by Fireworks)
    pub chat_model: String,

    /// Which hosted backend describes uploaded photos
    pub vision_backend: VisionBackend,
    pub vision_model: String,

    /// Applied to every outbound model call
    pub request_timeout: Duration,
    /// Extra attempts for transient upstream failures (0 = single attempt)
    pub max_retries: u32,

    pub http_port: u16,
}

/// Everything the conversation agent needs to reach the chat endpoint
#[derive(Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub options: ClientOptions,
}

/// Everything the feature extractor needs to reach the vision endpoint
#[derive(Clone)]
pub struct VisionConfig {
    pub backend: VisionBackend,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub options: ClientOptions,
}

const REDACTED: &str = "<redacted>";

fn redact(key: &Option<String>) -> Option<&'static str> {
    key.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("fireworks_api_url", &self.fireworks_api_url)
            .field("fireworks_api_key", &redact(&self.fireworks_api_key))
            .field("groq_api_url", &self.groq_api_url)
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("chat_model", &self.chat_model)
            .field("vision_backend", &self.vision_backend)
            .field("vision_model", &self.vision_model)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("http_port", &self.http_port)
            .finish()
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &REDACTED)
            .field("model", &self.model)
            .field("options", &self.options)
            .finish()
    }
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("backend", &self.backend)
            .field("api_url", &self.api_url)
            .field("api_key", &REDACTED)
            .field("model", &self.model)
            .field("options", &self.options)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vision_backend = match var("VISION_PROVIDER")
            .unwrap_or_else(|| "groq".to_string())
            .to_lowercase()
            .as_str()
        {
            "groq" => VisionBackend::Groq,
            "fireworks" => VisionBackend::Fireworks,
            other => anyhow::bail!(
                "VISION_PROVIDER must be 'groq' or 'fireworks', got '{}'",
                other
            ),
        };

        Ok(Self {
            fireworks_api_url: var("FIREWORKS_API_URL")
                .unwrap_or_else(|| "https://api.fireworks.ai/inference/v1".to_string()),
            fireworks_api_key: var("FIREWORKS_API_KEY").filter(|k| !k.is_empty()),
            groq_api_url: var("GROQ_API_URL")
                .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            groq_api_key: var("GROQ_API_KEY").filter(|k| !k.is_empty()),

            chat_model: var("CHAT_MODEL").unwrap_or_else(|| DOBBY_UNHINGED.to_string()),

            vision_backend,
            vision_model: var("VISION_MODEL")
                .unwrap_or_else(|| vision_backend.default_model().to_string()),

            request_timeout: Duration::from_secs(
                var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            max_retries: var("MAX_RETRIES")
                .unwrap_or_else(|| "0".to_string())
                .parse()
                .context("MAX_RETRIES must be a non-negative integer")?,

            http_port: var("HTTP_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("HTTP_PORT must be a valid port number")?,
        })
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.request_timeout,
            max_retries: self.max_retries,
        }
    }

    pub fn chat(&self) -> Result<ChatConfig> {
        let api_key = self
            .fireworks_api_key
            .clone()
            .context("FIREWORKS_API_KEY must be set")?;

        Ok(ChatConfig {
            api_url: self.fireworks_api_url.clone(),
            api_key,
            model: self.chat_model.clone(),
            options: self.client_options(),
        })
    }

    pub fn vision(&self) -> Result<VisionConfig> {
        let (api_url, api_key) = match self.vision_backend {
            VisionBackend::Groq => (
                self.groq_api_url.clone(),
                self.groq_api_key.clone().context("GROQ_API_KEY must be set")?,
            ),
            VisionBackend::Fireworks => (
                self.fireworks_api_url.clone(),
                self.fireworks_api_key
                    .clone()
                    .context("FIREWORKS_API_KEY must be set")?,
            ),
        };

        Ok(VisionConfig {
            backend: self.vision_backend,
            api_url,
            api_key,
            model: self.vision_model.clone(),
            options: self.client_options(),
        })
    }
}
