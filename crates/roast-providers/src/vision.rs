//! Vision completion providers
//!
//! A vision provider takes an image (as a data URI) plus an instruction and
//! returns the model's text. Two hosted backends are supported; they share the
//! OpenAI-compatible transport but differ in request shape and sampling.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::completion::{CompletionClient, CompletionError};

pub const GROQ_DEFAULT_MODEL: &str = "llama-3.2-11b-vision-preview";
pub const FIREWORKS_DEFAULT_MODEL: &str =
    "accounts/fireworks/models/llama-v3p2-11b-vision-instruct";

/// Capability shared by every vision backend
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Build the request body for one describe call.
    fn request_body(&self, image_data_url: &str, instruction: &str) -> Value;

    fn client(&self) -> &CompletionClient;

    async fn describe(
        &self,
        image_data_url: &str,
        instruction: &str,
    ) -> Result<String, CompletionError> {
        let body = self.request_body(image_data_url, instruction);
        info!(
            "Describing image ({} bytes as data URI) with {} model {}",
            image_data_url.len(),
            self.name(),
            self.model()
        );
        let text = self.client().complete(&body).await?;
        debug!("{} returned {} chars", self.name(), text.len());
        Ok(text)
    }
}

/// Groq's vision chat endpoint: instruction first, then the image.
pub struct GroqVision {
    client: CompletionClient,
    model: String,
}

impl GroqVision {
    pub fn new(client: CompletionClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionProvider for GroqVision {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> &CompletionClient {
        &self.client
    }

    fn request_body(&self, image_data_url: &str, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    { "type": "image_url", "image_url": { "url": image_data_url } }
                ]
            }],
            "temperature": 1,
            "max_completion_tokens": 1024,
            "top_p": 1,
            "stream": false,
            "stop": null,
        })
    }
}

/// Sampling parameters for the generic endpoint
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.6,
            top_p: 1.0,
            top_k: 40,
        }
    }
}

/// Fireworks-style generic endpoint: image first, then the instruction.
pub struct FireworksVision {
    client: CompletionClient,
    model: String,
    sampling: Sampling,
}

impl FireworksVision {
    pub fn new(client: CompletionClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            sampling: Sampling::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

#[async_trait]
impl VisionProvider for FireworksVision {
    fn name(&self) -> &str {
        "fireworks"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> &CompletionClient {
        &self.client
    }

    fn request_body(&self, image_data_url: &str, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature,
            "top_p": self.sampling.top_p,
            "top_k": self.sampling.top_k,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "image_url", "image_url": { "url": image_data_url } },
                    { "type": "text", "text": instruction }
                ]
            }],
        })
    }
}
