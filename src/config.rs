//! Environment configuration

use crate::llm::GeminiConfig;
use crate::lookup::DEFAULT_SENTENCE_COUNT;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY not set in environment variables")]
    MissingModelKey,
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    /// Absent means weather lookups answer with a fixed notice
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: Option<String>,
    pub wikipedia_api_url: Option<String>,
    /// Upper bound on summary length, in sentences
    pub summary_sentences: u32,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut gemini = GeminiConfig::new(var("GOOGLE_API_KEY").ok_or(ConfigError::MissingModelKey)?);
        if let Some(model) = var("GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Some(base_url) = var("GEMINI_BASE_URL") {
            gemini.base_url = base_url;
        }

        let port = parse_number(var("OMEGAVEO_PORT"), "OMEGAVEO_PORT", DEFAULT_PORT)?;
        let summary_sentences = parse_number(
            var("OMEGAVEO_SUMMARY_SENTENCES"),
            "OMEGAVEO_SUMMARY_SENTENCES",
            DEFAULT_SENTENCE_COUNT,
        )?;

        Ok(Self {
            gemini,
            openweather_api_key: var("OPENWEATHER_API_KEY"),
            openweather_base_url: var("OPENWEATHER_BASE_URL"),
            wikipedia_api_url: var("WIKIPEDIA_API_URL"),
            summary_sentences,
            port,
        })
    }
}

fn parse_number<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
