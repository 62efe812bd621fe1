//! Answer composition
//!
//! Gathers weather and encyclopedia context for a question, folds both into
//! a single prompt and asks the model for the final answer.

use crate::conversation::Responder;
use crate::intent::detect_weather_city;
use crate::llm::{LlmRequest, LlmService};
use crate::lookup::{KnowledgeLookup, WeatherLookup, DEFAULT_SENTENCE_COUNT};
use async_trait::async_trait;
use std::sync::Arc;

pub const ASSISTANT_NAME: &str = "OmegaVeo";

/// Prefix of the reply when the model call fails
pub const MODEL_ERROR_PREFIX: &str = "Error while calling Gemini model:";

/// Build the single-shot prompt sent to the model
pub fn build_prompt(query: &str, wiki_info: &str, weather_info: &str) -> String {
    format!(
        "
You are {ASSISTANT_NAME}, a helpful research assistant.

User question:
{query}

Wikipedia information:
{wiki_info}

Weather information (if relevant):
{weather_info}

Using the information above, write a clear, concise answer for the user.
If something is missing or uncertain, say so honestly.
"
    )
}

pub struct AnswerComposer {
    weather: WeatherLookup,
    knowledge: KnowledgeLookup,
    llm: Arc<dyn LlmService>,
    sentence_count: u32,
}

impl AnswerComposer {
    pub fn new(weather: WeatherLookup, knowledge: KnowledgeLookup, llm: Arc<dyn LlmService>) -> Self {
        Self {
            weather,
            knowledge,
            llm,
            sentence_count: DEFAULT_SENTENCE_COUNT,
        }
    }

    pub fn with_sentence_count(mut self, sentence_count: u32) -> Self {
        self.sentence_count = sentence_count;
        self
    }

    /// Weather block for the prompt; empty unless the query asks about a city
    async fn weather_info(&self, query: &str) -> String {
        match detect_weather_city(query) {
            Some(city) => self.weather.lookup_weather(&city).await.into_text(),
            None => String::new(),
        }
    }

    /// Answer a question. Never fails: backend errors come back as text.
    pub async fn answer_query(&self, query: &str) -> String {
        // Both lookups finish before the model is called
        let (weather_info, wiki) = tokio::join!(
            self.weather_info(query),
            self.knowledge.lookup_summary(query, self.sentence_count),
        );
        tracing::debug!(
            wiki_found = wiki.is_found(),
            has_weather = !weather_info.is_empty(),
            "Context gathered"
        );

        let prompt = build_prompt(query, wiki.text(), &weather_info);
        let request = LlmRequest::single_prompt(prompt);

        match self.llm.complete(&request).await {
            Ok(response) => response.text(),
            Err(e) => format!("{MODEL_ERROR_PREFIX} {e}"),
        }
    }
}

#[async_trait]
impl Responder for AnswerComposer {
    async fn respond(&self, user_text: &str) -> String {
        self.answer_query(user_text).await
    }
}
