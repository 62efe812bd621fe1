//! Wikipedia summaries via the MediaWiki action API

use super::{KnowledgeBackend, KnowledgeError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

const USER_AGENT: &str = concat!(
    "omegaveo/",
    env!("CARGO_PKG_VERSION"),
    " (research assistant; reqwest)"
);

pub struct WikipediaClient {
    client: Client,
    api_url: String,
}

impl WikipediaClient {
    pub fn new(api_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.unwrap_or(DEFAULT_WIKIPEDIA_API_URL).to_string(),
        }
    }

    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, KnowledgeError> {
        let response = self
            .client
            .get(&self.api_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeError::Status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| KnowledgeError::Parse(e.to_string()))
    }

    /// Resolve free text to a page title, preferring the search suggestion
    async fn resolve_title(&self, topic: &str) -> Result<String, KnowledgeError> {
        let resp: SearchResponse = self
            .query(&[
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", "1"),
                ("srinfo", "suggestion"),
                ("srprop", ""),
            ])
            .await?;

        let query = resp.query.unwrap_or_default();
        query
            .searchinfo
            .and_then(|info| info.suggestion)
            .filter(|s| !s.is_empty())
            .or_else(|| query.search.into_iter().next().map(|hit| hit.title))
            .ok_or_else(|| KnowledgeError::NotFound(topic.to_string()))
    }

    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>, KnowledgeError> {
        let resp: PagesResponse = self
            .query(&[
                ("prop", "links"),
                ("plnamespace", "0"),
                ("pllimit", "max"),
                ("titles", title),
            ])
            .await?;

        Ok(resp
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .flat_map(|page| page.links)
            .map(|link| link.title)
            .collect())
    }
}

#[async_trait]
impl KnowledgeBackend for WikipediaClient {
    async fn summary(&self, topic: &str, sentences: u32) -> Result<String, KnowledgeError> {
        let title = self.resolve_title(topic).await?;
        let sentences = sentences.to_string();

        let resp: PagesResponse = self
            .query(&[
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title.as_str()),
            ])
            .await?;

        let page = resp
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| KnowledgeError::Parse("no pages in response".to_string()))?;

        if page.missing || page.invalid {
            return Err(KnowledgeError::NotFound(title));
        }

        if page.pageprops.is_some_and(|p| p.disambiguation.is_some()) {
            let options = self.disambiguation_options(&page.title).await?;
            return Err(KnowledgeError::Ambiguous {
                title: page.title,
                options,
            });
        }

        Ok(page.extract.unwrap_or_default())
    }
}

// MediaWiki API types (formatversion=2)

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    searchinfo: Option<SearchInfo>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchInfo {
    suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    query: Option<PagesQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}
