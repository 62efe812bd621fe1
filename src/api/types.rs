//! API request and response types

use crate::conversation::Transcript;
use crate::llm::ModelSummary;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request for a one-off answer outside any session
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// A session and its transcript
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Transcript,
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub messages: Transcript,
}

/// Response for a one-off answer
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Models visible to the configured Gemini key
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub current: String,
    pub models: Vec<ModelSummary>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
