//! Encyclopedia summary lookup

use super::LookupOutcome;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_SENTENCE_COUNT: u32 = 3;

/// How many disambiguation candidates are shown to the model
const MAX_LISTED_OPTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("\"{title}\" may refer to: {}", options.join(", "))]
    Ambiguous { title: String, options: Vec<String> },
    #[error("Page id \"{0}\" does not match any pages. Try another id!")]
    NotFound(String),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// Source of short topic summaries
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    /// Summarize `topic` in at most `sentences` sentences
    async fn summary(&self, topic: &str, sentences: u32) -> Result<String, KnowledgeError>;
}

/// Knowledge lookup that renders every backend outcome as prompt text
#[derive(Clone)]
pub struct KnowledgeLookup {
    backend: Arc<dyn KnowledgeBackend>,
}

impl KnowledgeLookup {
    pub fn new(backend: Arc<dyn KnowledgeBackend>) -> Self {
        Self { backend }
    }

    pub async fn lookup_summary(&self, topic: &str, sentence_count: u32) -> LookupOutcome {
        match self.backend.summary(topic, sentence_count).await {
            Ok(summary) => LookupOutcome::Found(summary),
            Err(KnowledgeError::Ambiguous { options, .. }) => {
                tracing::debug!(topic = %topic, candidates = options.len(), "Ambiguous topic");
                let shown: Vec<&str> = options
                    .iter()
                    .take(MAX_LISTED_OPTIONS)
                    .map(String::as_str)
                    .collect();
                LookupOutcome::Failed(format!(
                    "Topic '{topic}' is ambiguous. Some options: {}",
                    python_list(&shown)
                ))
            }
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Knowledge lookup failed");
                LookupOutcome::Failed(format!("Could not fetch Wikipedia summary: {e}"))
            }
        }
    }
}

/// Render strings the way a Python list literal prints: `['a', "b's"]`
fn python_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| python_str(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn python_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
