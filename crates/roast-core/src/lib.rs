//! Roast Core Library
//!
//! Photo in, persona conversation out: vision feature extraction, persona
//! prompts, the conversation agent, and the session layer a front end talks to.

pub mod config;
pub mod error;
pub mod imaging;
pub mod prompts;
pub mod roast_agent;
pub mod server;
pub mod session;
pub mod vision;

// Re-export key types for convenience
pub use config::{ChatConfig, Config, VisionBackend, VisionConfig};
pub use error::{ExtractionError, GenerationError, SessionError};
pub use prompts::{Mode, PersonaPrompt};
pub use roast_agent::{strip_wrapping_quotes, ConversationAgent, ConversationTurn};
pub use session::{RoastService, Session, SessionManager, SessionSnapshot};
pub use vision::{FeatureDescription, FeatureExtractor};
