//! Conversation state
//!
//! A transcript is an append-only list of role-tagged messages owned by one
//! chat session. Each turn adds the user's message and then the assistant's
//! reply; reset clears everything at once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Produces the assistant reply for a user message
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, user_text: &str) -> String;
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A transcript entry. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    #[allow(dead_code)] // Serialized directly; accessor kept for callers
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Message text cannot be empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)] // API completeness
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // API completeness
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Run one turn: record the user's text, ask the responder, record the reply.
    ///
    /// Blank input is rejected before anything is appended.
    pub async fn append_turn(
        &mut self,
        responder: &dyn Responder,
        user_text: &str,
    ) -> Result<&Message, TranscriptError> {
        if user_text.trim().is_empty() {
            return Err(TranscriptError::EmptyMessage);
        }

        self.messages.push(Message::new(Role::User, user_text));
        let reply = responder.respond(user_text).await;
        self.messages.push(Message::new(Role::Assistant, reply));

        tracing::debug!(length = self.messages.len(), "Turn appended");
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Drop every message ("new chat")
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}
