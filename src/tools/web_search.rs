use serde::Deserialize;

use crate::clients::duckduckgo::DuckDuckGoClient;

use super::error::ToolError;
use super::traits::{ArgSchema, ToolOutput, TypedTool};

const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct WebSearchInput {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Web search through DuckDuckGo. Finding nothing is a normal answer, not a failure.
pub struct DuckDuckGoSearchTool {
    client: DuckDuckGoClient,
}

impl DuckDuckGoSearchTool {
    pub fn new(client: DuckDuckGoClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TypedTool for DuckDuckGoSearchTool {
    type Input = WebSearchInput;

    const NAME: &'static str = "DuckDuckGoSearchTool";
    const DESCRIPTION: &'static str =
        "Search the web for up-to-date information. Returns result titles, snippets and URLs.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![
            ArgSchema::required("query", "string", "The search query"),
            ArgSchema::optional("max_results", "integer", "Maximum number of results (default 5)"),
        ]
    }

    fn validate(&self, input: &WebSearchInput) -> Result<(), String> {
        if input.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }
        if input.max_results == Some(0) {
            return Err("max_results must be at least 1".into());
        }
        Ok(())
    }

    async fn call(&self, input: WebSearchInput) -> Result<ToolOutput, ToolError> {
        let query = input.query.trim();
        let results = self
            .client
            .search(query, input.max_results.unwrap_or(DEFAULT_MAX_RESULTS))
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?;

        if results.is_empty() {
            return Ok(ToolOutput::Text(format!("No results found for: {}", query)));
        }
        let blocks = results
            .into_iter()
            .map(|r| format!("{}\n{}\n{}", r.title, r.description, r.url))
            .collect::<Vec<_>>();
        Ok(ToolOutput::Text(blocks.join("\n\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error::ToolErrorKind;
    use crate::tools::traits::Tool;
    use mockito::Matcher;
    use serde_json::json;

    fn tool_for(server: &mockito::ServerGuard) -> DuckDuckGoSearchTool {
        DuckDuckGoSearchTool::new(DuckDuckGoClient::new(reqwest::Client::new()).with_base_url(server.url()))
    }

    #[tokio::test]
    async fn zero_results_is_an_empty_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_body("<html><body></body></html>")
            .create_async()
            .await;

        let out = tool_for(&server).run(json!({ "query": "zzqx" })).await.unwrap();
        assert_eq!(out, "No results found for: zzqx");
    }

    #[tokio::test]
    async fn renders_result_blocks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_body(
                r#"<div class="result__body"><a class="result__a" href="x">Tokio</a>
                   <a class="result__url" href="x">tokio.rs</a>
                   <a class="result__snippet" href="x">Async runtime</a></div>"#,
            )
            .create_async()
            .await;

        let out = tool_for(&server).run(json!({ "query": "tokio" })).await.unwrap();
        assert_eq!(out, "Tokio\nAsync runtime\ntokio.rs");
    }

    #[tokio::test]
    async fn transport_failure_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = tool_for(&server).run(json!({ "query": "tokio" })).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::Upstream);
    }

    #[tokio::test]
    async fn invalid_input_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let search = server.mock("GET", "/html/").match_query(Matcher::Any).expect(0).create_async().await;

        let tool = tool_for(&server);
        for input in [json!({ "query": "" }), json!({ "query": 3 }), json!({ "query": "a", "max_results": 0 })] {
            assert_eq!(tool.run(input).await.unwrap_err().kind(), ToolErrorKind::InputValidation);
        }
        search.assert_async().await;
    }
}
