//! Conversation agent
//!
//! Holds one persona conversation against a stateless chat endpoint. Every
//! request carries the full transcript:
//!
//! ```text
//! [priming user, priming ack] ++ history ++ [new user turn]
//! ```
//!
//! History only grows after a successful reply, one user turn and one
//! assistant turn at a time. A failed or cancelled call leaves it untouched.

use roast_providers::{ChatMessage, ChatRequest, CompletionClient, CompletionError};
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::error::GenerationError;
use crate::prompts::{self, Mode, PersonaPrompt, PRIMING_ACKNOWLEDGEMENT};
use crate::vision::FeatureDescription;

/// One `(role, content)` entry of the conversation history
pub type ConversationTurn = ChatMessage;

pub struct ConversationAgent {
    client: CompletionClient,
    model: String,
    features: FeatureDescription,
    mode: Mode,
    prompt: PersonaPrompt,
    history: Vec<ConversationTurn>,
}

impl ConversationAgent {
    pub fn new(
        client: CompletionClient,
        model: impl Into<String>,
        features: FeatureDescription,
        mode: Mode,
    ) -> Self {
        let prompt = prompts::render(mode, features.as_str());
        debug!("Persona prompt ({}): {}", mode, prompt);

        Self {
            client,
            model: model.into(),
            features,
            mode,
            prompt,
            history: Vec::new(),
        }
    }

    pub fn from_config(
        config: &ChatConfig,
        features: FeatureDescription,
        mode: Mode,
    ) -> Result<Self, CompletionError> {
        let client =
            CompletionClient::with_options(&config.api_url, &config.api_key, config.options)?;
        Ok(Self::new(client, &config.model, features, mode))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn features(&self) -> &FeatureDescription {
        &self.features
    }

    pub fn prompt(&self) -> &PersonaPrompt {
        &self.prompt
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// The exact turn sequence the next call would send for `user_input`.
    pub fn build_messages(&self, user_input: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 3);
        messages.push(ChatMessage::user(self.prompt.priming_request()));
        messages.push(ChatMessage::assistant(PRIMING_ACKNOWLEDGEMENT));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(user_input));
        messages
    }

    pub async fn generate_response(&mut self, user_input: &str) -> Result<String, GenerationError> {
        let messages = self.build_messages(user_input);
        info!(
            "Generating {} reply ({} messages, {} prior turns)",
            self.mode,
            messages.len(),
            self.history.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
        };
        let raw = match self.client.complete(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Chat completion failed, history left unchanged: {}", e);
                return Err(e.into());
            }
        };

        let reply = strip_wrapping_quotes(&raw).to_string();
        self.history.push(ChatMessage::user(user_input));
        self.history.push(ChatMessage::assistant(reply.clone()));

        debug!(
            "Reply ({} chars), history now {} turns",
            reply.len(),
            self.history.len()
        );
        Ok(reply)
    }
}

/// Strip one pair of double quotes when they open and close the whole text.
pub fn strip_wrapping_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
