//! In-memory chat sessions
//!
//! Each session owns one transcript behind its own lock, so turns within a
//! session run one at a time while separate sessions proceed independently.
//! Nothing outlives the process.

use crate::conversation::Transcript;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub type SessionHandle = Arc<Mutex<Transcript>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with an empty transcript and return its ID
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(Transcript::new())));
        tracing::info!(session_id = %id, "Session created");
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// End a session and drop its transcript. Returns false if it was unknown.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session ended");
        }
        removed
    }
}
