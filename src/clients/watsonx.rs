use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{WatsonxConfig, WatsonxScope};

use super::{check_status, trim_base, ClientError};

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const API_VERSION: &str = "2024-05-31";
pub const VISION_MODEL: &str = "meta-llama/llama-3-2-11b-vision-instruct";
pub const MAX_TOKENS: u32 = 512;

/// Tokens are refreshed this long before IAM says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct IamToken {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// watsonx.ai chat client used for image description.
///
/// Bearer tokens are minted from the API key through IBM Cloud IAM and cached
/// until shortly before they expire; clones share the cache.
#[derive(Debug, Clone)]
pub struct WatsonxClient {
    http: reqwest::Client,
    service_url: String,
    iam_url: String,
    api_key: String,
    scope: WatsonxScope,
    model_id: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl WatsonxClient {
    pub fn new(http: reqwest::Client, config: &WatsonxConfig) -> Self {
        Self {
            http,
            service_url: trim_base(config.service_url.clone()),
            iam_url: DEFAULT_IAM_URL.to_string(),
            api_key: config.api_key.clone(),
            scope: config.scope.clone(),
            model_id: VISION_MODEL.to_string(),
            token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_iam_url(mut self, iam_url: impl Into<String>) -> Self {
        self.iam_url = trim_base(iam_url);
        self
    }

    async fn bearer_token(&self) -> Result<String, ClientError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let response = self
            .http
            .post(format!("{}/identity/token", self.iam_url))
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let token: IamToken = check_status(response).await?.json().await?;
        info!(expires_in = token.expires_in, "obtained watsonx IAM token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Download the raw bytes of an image.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(url).send().await?;
        let bytes = check_status(response).await?.bytes().await?;
        debug!(url, size = bytes.len(), "fetched image");
        Ok(bytes.to_vec())
    }

    fn chat_body(&self, image: &[u8], question: &str) -> Value {
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));
        let mut body = json!({
            "model_id": self.model_id,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "image_url", "image_url": { "url": data_url } },
                    { "type": "text", "text": question },
                ],
            }],
            "max_tokens": MAX_TOKENS,
        });
        let (key, id) = match &self.scope {
            WatsonxScope::Project(id) => ("project_id", id),
            WatsonxScope::Space(id) => ("space_id", id),
        };
        body[key] = Value::String(id.clone());
        body
    }

    /// Ask the vision model `question` about `image` and return its answer.
    pub async fn describe_image(&self, image: &[u8], question: &str) -> Result<String, ClientError> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .post(format!("{}/ml/v1/text/chat", self.service_url))
            .query(&[("version", API_VERSION)])
            .bearer_auth(token)
            .json(&self.chat_body(image, question))
            .send()
            .await?;
        let chat: ChatResponse = check_status(response).await?.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ClientError::Decode("watsonx returned no content".into()))
    }
}
