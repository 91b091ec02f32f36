//! Sessions - one uploaded photo and the conversation that follows it
//!
//! `RoastService` is the entry point a presentation layer calls into: it turns
//! upload bytes into a feature list and a fresh `ConversationAgent`. `Session`
//! adds the user-visible transcript on top, and `SessionManager` owns the live
//! sessions, each behind its own lock so a session never runs two model calls
//! at once.

use anyhow::Result;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use roast_providers::{CompletionClient, Role};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ChatConfig, Config};
use crate::error::{ExtractionError, GenerationError, SessionError};
use crate::prompts::Mode;
use crate::roast_agent::ConversationAgent;
use crate::vision::{FeatureDescription, FeatureExtractor};

/// Stand-in user message for the photo upload
pub const UPLOAD_PLACEHOLDER: &str = "*uploads photo*";

/// Builds agents from uploads. Cheap to clone; holds no per-session state.
#[derive(Clone)]
pub struct RoastService {
    extractor: FeatureExtractor,
    chat_client: CompletionClient,
    chat_model: String,
}

impl RoastService {
    pub fn new(
        extractor: FeatureExtractor,
        chat_client: CompletionClient,
        chat_model: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            chat_client,
            chat_model: chat_model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let vision = config.vision()?;
        let ChatConfig {
            api_url,
            api_key,
            model,
            options,
        } = config.chat()?;

        let extractor = FeatureExtractor::from_config(&vision)?;
        let chat_client = CompletionClient::with_options(&api_url, &api_key, options)?;

        info!(
            "Roast service ready (vision: {} {}, chat: {})",
            vision.backend.as_str(),
            vision.model,
            model
        );
        Ok(Self::new(extractor, chat_client, model))
    }

    /// Extract features from raw upload bytes and build the agent for `mode`.
    pub async fn construct(
        &self,
        image_bytes: &[u8],
        mode: Mode,
    ) -> Result<(FeatureDescription, ConversationAgent), ExtractionError> {
        let features = self.extractor.extract_from_bytes(image_bytes).await?;
        Ok(self.agent_for(features, mode))
    }

    pub async fn construct_from_image(
        &self,
        image: &DynamicImage,
        mode: Mode,
    ) -> Result<(FeatureDescription, ConversationAgent), ExtractionError> {
        let features = self.extractor.extract_features(image).await?;
        Ok(self.agent_for(features, mode))
    }

    fn agent_for(
        &self,
        features: FeatureDescription,
        mode: Mode,
    ) -> (FeatureDescription, ConversationAgent) {
        let agent = ConversationAgent::new(
            self.chat_client.clone(),
            &self.chat_model,
            features.clone(),
            mode,
        );
        (features, agent)
    }
}

/// A transcript entry as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayMessage {
    pub role: Role,
    pub content: String,
    /// Set on the message that stands in for the uploaded photo
    pub has_image: bool,
}

impl DisplayMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            has_image: false,
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            has_image: false,
        }
    }
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    agent: ConversationAgent,
    transcript: Vec<DisplayMessage>,
}

/// Read-only view of a session for a presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    pub features: FeatureDescription,
    pub transcript: Vec<DisplayMessage>,
}

impl Session {
    /// Look at the photo and produce the opening roast or compliment.
    ///
    /// Nothing is kept when either call fails; the caller may simply retry.
    pub async fn start(
        service: &RoastService,
        image_bytes: &[u8],
        mode: Mode,
    ) -> Result<Self, SessionError> {
        info!("{}", mode.loading_line());
        let (_, mut agent) = service.construct(image_bytes, mode).await?;
        let reply = agent.generate_response(mode.opening_line()).await?;

        let transcript = vec![
            DisplayMessage {
                has_image: true,
                ..DisplayMessage::user(UPLOAD_PLACEHOLDER)
            },
            DisplayMessage::assistant(reply),
        ];

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            agent,
            transcript,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.agent.mode()
    }

    pub fn agent(&self) -> &ConversationAgent {
        &self.agent
    }

    pub fn transcript(&self) -> &[DisplayMessage] {
        &self.transcript
    }

    /// The most recent assistant message, if any
    pub fn last_reply(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub async fn send(&mut self, text: &str) -> Result<String, GenerationError> {
        let reply = self.agent.generate_response(text).await?;
        self.transcript.push(DisplayMessage::user(text));
        self.transcript.push(DisplayMessage::assistant(reply.clone()));
        Ok(reply)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            mode: self.mode(),
            created_at: self.created_at,
            features: self.agent.features().clone(),
            transcript: self.transcript.clone(),
        }
    }
}

/// Owns every live session
pub struct SessionManager {
    service: RoastService,
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(service: RoastService) -> Self {
        Self {
            service,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(
        &self,
        image_bytes: &[u8],
        mode: Mode,
    ) -> Result<SessionSnapshot, SessionError> {
        let session = Session::start(&self.service, image_bytes, mode).await?;
        let snapshot = session.snapshot();

        self.sessions
            .lock()
            .await
            .insert(session.id(), Arc::new(Mutex::new(session)));

        info!("Session {} started in {} mode", snapshot.id, mode);
        Ok(snapshot)
    }

    async fn session(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let session = self.session(id).await?;
        let session = session.lock().await;
        Some(session.snapshot())
    }

    /// Send a message to a session. `None` if the session does not exist.
    ///
    /// The per-session lock is held across the model call, so concurrent
    /// sends to the same session are processed one after another.
    pub async fn send(&self, id: Uuid, text: &str) -> Option<Result<String, GenerationError>> {
        let session = self.session(id).await?;
        let mut session = session.lock().await;
        debug!("Session {} handling message ({} chars)", id, text.len());

        let result = session.send(text).await;
        if let Err(e) = &result {
            warn!("Session {} message failed: {}", id, e);
        }
        Some(result)
    }

    /// Drop a session and its conversation. Returns whether it existed.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            info!("Session {} ended", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
