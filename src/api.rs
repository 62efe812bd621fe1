//! HTTP API for OmegaVeo
//!
//! A JSON view over chat sessions and the answer pipeline; page rendering
//! lives elsewhere.

mod handlers;
mod sessions;
mod types;

pub use handlers::create_router;
pub use sessions::SessionStore;

use crate::conversation::Responder;
use crate::llm::GeminiService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub responder: Arc<dyn Responder>,
    pub gemini: Arc<GeminiService>,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>, gemini: Arc<GeminiService>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            responder,
            gemini,
        }
    }
}
