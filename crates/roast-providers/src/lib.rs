//! Roast providers - clients for the hosted model endpoints
//!
//! - completion: OpenAI-compatible chat completions transport
//! - vision: vision completion providers (Groq, Fireworks)

pub mod completion;
pub mod vision;

pub use completion::{
    ChatMessage, ChatRequest, ClientOptions, CompletionClient, CompletionError, Role,
};
pub use vision::{FireworksVision, GroqVision, Sampling, VisionProvider};
