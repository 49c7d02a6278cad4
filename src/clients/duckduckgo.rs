use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

use super::{check_status, trim_base, ClientError};

pub const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Client for the DuckDuckGo HTML endpoint (no API key needed).
#[derive(Debug, Clone)]
pub struct DuckDuckGoClient {
    http: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Ranked results for `query`, at most `max_results`. An empty page is not an error.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ClientError> {
        let response = self
            .http
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;
        let html = check_status(response).await?.text().await?;

        let results = extract_results(&html, max_results);
        debug!(query, found = results.len(), "duckduckgo search finished");
        Ok(results)
    }
}

/// Pull title, snippet and URL out of each `.result__body` block.
pub fn extract_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let (Ok(body), Ok(title), Ok(snippet), Ok(url)) = (
        Selector::parse(".result__body"),
        Selector::parse(".result__a"),
        Selector::parse(".result__snippet"),
        Selector::parse(".result__url"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&body)
        .filter_map(|result| {
            let title = first_text(result, &title).filter(|t| !t.is_empty())?;
            Some(SearchResult {
                title,
                description: first_text(result, &snippet).unwrap_or_default(),
                url: first_text(result, &url).unwrap_or_default(),
            })
        })
        .take(max_results)
        .collect()
}

/// Whitespace-normalized text of the first element under `parent` matching `selector`.
fn first_text(parent: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = parent.select(selector).next()?;
    Some(element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "))
}
