//! Best-effort lookups against external data providers
//!
//! A lookup never fails from the caller's point of view: provider errors are
//! caught where they happen and rendered as text for the prompt.

mod knowledge;
mod weather;
mod wikipedia;

pub use knowledge::{KnowledgeLookup, DEFAULT_SENTENCE_COUNT};
pub use weather::{OpenWeatherClient, WeatherLookup, WeatherProvider};
pub use wikipedia::WikipediaClient;

#[allow(unused_imports)] // Implemented by the test mocks
pub use knowledge::{KnowledgeBackend, KnowledgeError};
#[allow(unused_imports)] // Implemented by the test mocks
pub use weather::{Conditions, WeatherError};

use std::fmt;

/// Text produced by a lookup, tagged with whether the provider answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    Failed(String),
}

impl LookupOutcome {
    pub fn text(&self) -> &str {
        match self {
            LookupOutcome::Found(text) | LookupOutcome::Failed(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            LookupOutcome::Found(text) | LookupOutcome::Failed(text) => text,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
