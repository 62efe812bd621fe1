//! OmegaVeo - research assistant chatbot backend
//!
//! Answers questions by combining a Wikipedia summary and, for weather
//! questions, current conditions into a single Gemini prompt.

mod api;
mod composer;
mod config;
mod conversation;
mod intent;
mod llm;
mod lookup;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use composer::AnswerComposer;
use config::Config;
use llm::{GeminiService, LlmService, LoggingService};
use lookup::{KnowledgeLookup, OpenWeatherClient, WeatherLookup, WeatherProvider, WikipediaClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv_loaded = dotenv::dotenv().is_ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omegaveo=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env()?;
    tracing::info!(dotenv = dotenv_loaded, model = %config.gemini.model, "Configuration loaded");

    // Generative backend
    let gemini = Arc::new(GeminiService::new(config.gemini.clone()));
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(gemini.clone()));

    // Lookups
    let weather_provider = config.openweather_api_key.as_ref().map(|key| {
        Arc::new(OpenWeatherClient::new(
            key.clone(),
            config.openweather_base_url.as_deref(),
        )) as Arc<dyn WeatherProvider>
    });
    if weather_provider.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set; weather questions will get a fixed notice");
    }
    let weather = WeatherLookup::new(weather_provider);
    let knowledge = KnowledgeLookup::new(Arc::new(WikipediaClient::new(
        config.wikipedia_api_url.as_deref(),
    )));

    let composer = Arc::new(
        AnswerComposer::new(weather, knowledge, llm).with_sentence_count(config.summary_sentences),
    );
    let state = AppState::new(composer, gemini);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("OmegaVeo server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
