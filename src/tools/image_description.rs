use serde::Deserialize;
use url::Url;

use crate::clients::watsonx::WatsonxClient;

use super::error::ToolError;
use super::traits::{ArgSchema, ToolOutput, TypedTool};

pub const DEFAULT_QUESTION: &str = "What is in the picture?";

#[derive(Debug, Deserialize)]
pub struct ImageDescriptionInput {
    pub image_url: Url,
    #[serde(default)]
    pub question: Option<String>,
}

impl ImageDescriptionInput {
    pub fn question(&self) -> &str {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUESTION)
    }
}

/// Downloads an image and asks the watsonx vision model about it.
pub struct GetImageDescriptionTool {
    client: WatsonxClient,
}

impl GetImageDescriptionTool {
    pub fn new(client: WatsonxClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TypedTool for GetImageDescriptionTool {
    type Input = ImageDescriptionInput;

    const NAME: &'static str = "GetImageDescriptionTool";
    const DESCRIPTION: &'static str =
        "Sends an image URL and a question to a vision model and returns the model's description of the image.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![
            ArgSchema::required("image_url", "string", "URL of the image to describe"),
            ArgSchema::optional("question", "string", "Question about the image (default: 'What is in the picture?')"),
        ]
    }

    async fn call(&self, input: ImageDescriptionInput) -> Result<ToolOutput, ToolError> {
        let image = self
            .client
            .fetch_image(input.image_url.as_str())
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, format!("cannot fetch {}: {}", input.image_url, e)))?;

        let caption = self
            .client
            .describe_image(&image, input.question())
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?;
        Ok(ToolOutput::Text(caption))
    }
}
