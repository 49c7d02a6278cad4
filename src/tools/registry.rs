use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clients::{
    duckduckgo::DuckDuckGoClient,
    flickr::FlickrClient,
    open_meteo::OpenMeteoClient,
    watsonx::WatsonxClient,
};
use crate::config::Config;

use super::{
    flickr::{GetImageInfoFlickrTool, SearchImagesFlickrTool},
    image_description::GetImageDescriptionTool,
    image_viewer::ImageViewerTool,
    schema::ToolDescriptor,
    traits::Tool,
    weather::OpenMeteoTool,
    web_search::DuckDuckGoSearchTool,
};

#[derive(Debug, thiserror::Error)]
#[error("Tool already registered: {0}")]
pub struct DuplicateToolError(pub String);

/// Name to tool mapping, built explicitly at startup.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name. Names are unique within a registry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<&mut Self, DuplicateToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(DuplicateToolError(name));
        }
        self.tools.insert(name, tool);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|tool| tool.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The full tool set: weather, web search, image description, Flickr lookup
    /// and search, and the gallery viewer. Clients share one HTTP connection pool.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Result<Self, DuplicateToolError> {
        let flickr = FlickrClient::new(http.clone(), config.flickr_api_key.clone());
        let watsonx = WatsonxClient::new(http.clone(), &config.watsonx);

        let mut registry = Self::new();
        registry
            .register(Arc::new(OpenMeteoTool::new(OpenMeteoClient::new(http.clone()))))?
            .register(Arc::new(DuckDuckGoSearchTool::new(DuckDuckGoClient::new(http))))?
            .register(Arc::new(GetImageInfoFlickrTool::new(flickr.clone())))?
            .register(Arc::new(GetImageDescriptionTool::new(watsonx)))?
            .register(Arc::new(SearchImagesFlickrTool::new(flickr)))?
            .register(Arc::new(ImageViewerTool::new(
                config.gallery.bind_addr(),
                config.gallery.open_browser,
            )))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, GalleryConfig, OllamaConfig, WatsonxConfig, WatsonxScope};

    fn config() -> Config {
        Config {
            watsonx: WatsonxConfig {
                scope: WatsonxScope::Project("p".into()),
                service_url: "http://localhost:1".into(),
                api_key: "k".into(),
            },
            flickr_api_key: "f".into(),
            ollama: OllamaConfig::default(),
            agent: AgentConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }

    #[test]
    fn builds_every_tool_once() {
        let registry = ToolRegistry::from_config(&config(), reqwest::Client::new()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "DuckDuckGoSearchTool",
                "GetImageDescriptionTool",
                "GetImageInfoFlickrTool",
                "ImageViewerTool",
                "OpenMeteoTool",
                "SearchImagesFlickrTool",
            ]
        );
        assert!(registry.get("ImageViewerTool").is_some());
        assert!(registry.get("Nope").is_none());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        let client = FlickrClient::new(reqwest::Client::new(), "k".into());
        registry.register(Arc::new(SearchImagesFlickrTool::new(client.clone()))).unwrap();
        let err = registry
            .register(Arc::new(SearchImagesFlickrTool::new(client)))
            .err()
            .unwrap();
        assert_eq!(err.0, "SearchImagesFlickrTool");
        assert_eq!(registry.len(), 1);
    }
}
