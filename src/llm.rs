//! Generative backend abstraction
//!
//! The answer composer talks to the model through [`LlmService`], so the
//! Gemini client can be swapped for a mock in tests.

mod error;
mod gemini;
mod types;

pub use error::LlmError;
#[allow(unused_imports)] // Matched on by callers that care about the failure class
pub use error::LlmErrorKind;
pub use gemini::{GeminiConfig, GeminiService, ModelSummary};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for generative-text providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a single-shot completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
