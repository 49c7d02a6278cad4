use serde::Deserialize;
use tracing::debug;

use crate::clients::flickr::FlickrClient;

use super::error::ToolError;
use super::traits::{ArgSchema, ToolOutput, TypedTool};

#[derive(Debug, Deserialize)]
pub struct PhotoInfoInput {
    pub id: String,
}

/// Resolves a Flickr photo id to its static image URL.
pub struct GetImageInfoFlickrTool {
    client: FlickrClient,
}

impl GetImageInfoFlickrTool {
    pub fn new(client: FlickrClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TypedTool for GetImageInfoFlickrTool {
    type Input = PhotoInfoInput;

    const NAME: &'static str = "GetImageInfoFlickrTool";
    const DESCRIPTION: &'static str = "Looks up a Flickr photo by its id and returns the URL of the image.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::required("id", "string", "Flickr photo id")]
    }

    fn validate(&self, input: &PhotoInfoInput) -> Result<(), String> {
        if input.id.trim().is_empty() {
            return Err("id must not be empty".into());
        }
        Ok(())
    }

    async fn call(&self, input: PhotoInfoInput) -> Result<ToolOutput, ToolError> {
        let id = input.id.trim();
        let photo = self
            .client
            .photo_info(id)
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?;

        let url = photo
            .image_url()
            .ok_or_else(|| ToolError::invalid(format!("Photo with id {} has no resolvable image URL", id)))?;
        Ok(ToolOutput::Text(url))
    }
}

#[derive(Debug, Deserialize)]
pub struct PhotoSearchInput {
    pub query: String,
    #[serde(default)]
    pub count: Option<u32>,
}

/// Free-text Flickr search returning one image URL per line.
pub struct SearchImagesFlickrTool {
    client: FlickrClient,
}

impl SearchImagesFlickrTool {
    pub fn new(client: FlickrClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TypedTool for SearchImagesFlickrTool {
    type Input = PhotoSearchInput;

    const NAME: &'static str = "SearchImagesFlickrTool";
    const DESCRIPTION: &'static str = "Searches Flickr for images based on a query and returns a list of image URLs.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![
            ArgSchema::required("query", "string", "The search query"),
            ArgSchema::optional("count", "integer", "Number of results to return (at least 1)"),
        ]
    }

    fn validate(&self, input: &PhotoSearchInput) -> Result<(), String> {
        if input.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }
        if input.count == Some(0) {
            return Err("count must be at least 1".into());
        }
        Ok(())
    }

    async fn call(&self, input: PhotoSearchInput) -> Result<ToolOutput, ToolError> {
        let query = input.query.trim();
        let photos = self
            .client
            .search(query, input.count)
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?;

        let urls: Vec<String> = photos
            .iter()
            .filter_map(|photo| {
                let url = photo.image_url();
                if url.is_none() {
                    debug!(id = ?photo.id, query, "skipping photo without URL fields");
                }
                url
            })
            .collect();
        if urls.is_empty() {
            return Err(ToolError::invalid(format!("No images found for query: \"{}\"", query)));
        }
        Ok(ToolOutput::Lines(urls))
    }
}
