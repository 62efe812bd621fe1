//! Mock implementations for testing
//!
//! These mocks enable pipeline tests without real network I/O.

use crate::conversation::Responder;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::lookup::{Conditions, KnowledgeBackend, KnowledgeError, WeatherError, WeatherProvider};
use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock lookup providers
// ============================================================================

/// Weather provider returning fixed conditions, or failing every call
pub struct MockWeatherProvider {
    conditions: Option<Conditions>,
    cities: Mutex<Vec<String>>,
}

impl MockWeatherProvider {
    pub fn returning(conditions: Conditions) -> Self {
        Self {
            conditions: Some(conditions),
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            conditions: None,
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_cities(&self) -> Vec<String> {
        self.cities.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn current(&self, city: &str) -> Result<Conditions, WeatherError> {
        self.cities.lock().unwrap().push(city.to_string());
        self.conditions
            .clone()
            .ok_or(WeatherError::MissingField("weather[0].description"))
    }
}

enum KnowledgeBehavior {
    Summary(String),
    Ambiguous { title: String, options: Vec<String> },
    NotFound,
}

/// Knowledge backend with a canned behavior for every topic
pub struct MockKnowledgeBackend {
    behavior: KnowledgeBehavior,
    calls: Mutex<Vec<(String, u32)>>,
}

impl MockKnowledgeBackend {
    fn with(behavior: KnowledgeBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(summary: impl Into<String>) -> Self {
        Self::with(KnowledgeBehavior::Summary(summary.into()))
    }

    pub fn ambiguous(title: impl Into<String>, options: Vec<String>) -> Self {
        Self::with(KnowledgeBehavior::Ambiguous {
            title: title.into(),
            options,
        })
    }

    pub fn not_found() -> Self {
        Self::with(KnowledgeBehavior::NotFound)
    }

    /// (topic, sentence count) of every call
    pub fn recorded_calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeBackend for MockKnowledgeBackend {
    async fn summary(&self, topic: &str, sentences: u32) -> Result<String, KnowledgeError> {
        self.calls
            .lock()
            .unwrap()
            .push((topic.to_string(), sentences));
        match &self.behavior {
            KnowledgeBehavior::Summary(s) => Ok(s.clone()),
            KnowledgeBehavior::Ambiguous { title, options } => Err(KnowledgeError::Ambiguous {
                title: title.clone(),
                options: options.clone(),
            }),
            KnowledgeBehavior::NotFound => Err(KnowledgeError::NotFound(topic.to_string())),
        }
    }
}

// ============================================================================
// Responders and HTTP stubs
// ============================================================================

/// Replies with the user's text prefixed by "echo: "
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, user_text: &str) -> String {
        format!("echo: {user_text}")
    }
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
