use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{check_status, trim_base, ClientError};

pub const DEFAULT_REST_URL: &str = "https://api.flickr.com/services/rest";

/// Flickr returns some photo fields as strings and others as numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Photo {
    pub id: Option<FieldValue>,
    pub secret: Option<FieldValue>,
    pub server: Option<FieldValue>,
    pub farm: Option<FieldValue>,
    #[serde(default)]
    pub title: Option<Value>,
}

impl Photo {
    /// Static image URL, or `None` when any of the four URL fields is missing.
    pub fn image_url(&self) -> Option<String> {
        let present = |field: &Option<FieldValue>| field.as_ref().filter(|v| !v.is_blank()).cloned();
        Some(static_image_url(
            &present(&self.farm)?,
            &present(&self.server)?,
            &present(&self.id)?,
            &present(&self.secret)?,
        ))
    }
}

pub fn static_image_url(
    farm: &impl fmt::Display,
    server: &impl fmt::Display,
    id: &impl fmt::Display,
    secret: &impl fmt::Display,
) -> String {
    format!("https://farm{farm}.staticflickr.com/{server}/{id}_{secret}.jpg")
}

/// Minimal Flickr REST client (JSON format, no callback wrapper).
#[derive(Debug, Clone)]
pub struct FlickrClient {
    http: reqwest::Client,
    api_key: String,
    rest_url: String,
}

impl FlickrClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            rest_url: DEFAULT_REST_URL.to_string(),
        }
    }

    pub fn with_rest_url(mut self, rest_url: impl Into<String>) -> Self {
        self.rest_url = trim_base(rest_url);
        self
    }

    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let mut query: Vec<(&str, String)> = vec![
            ("method", method.to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
        ];
        query.extend(params.iter().cloned());

        let response = self
            .http
            .get(format!("{}/", self.rest_url))
            .query(&query)
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;

        match body.get("stat").and_then(Value::as_str) {
            Some("ok") => Ok(body),
            _ => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| body.to_string());
                Err(ClientError::Api(format!("{} failed: {}", method, message)))
            }
        }
    }

    /// `flickr.photos.getInfo`.
    pub async fn photo_info(&self, photo_id: &str) -> Result<Photo, ClientError> {
        let body = self
            .call("flickr.photos.getInfo", &[("photo_id", photo_id.to_string())])
            .await?;
        let photo = body
            .get("photo")
            .cloned()
            .ok_or_else(|| ClientError::Decode("getInfo response has no `photo`".into()))?;
        serde_json::from_value(photo).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `flickr.photos.search`. A response without a photo list yields no photos.
    pub async fn search(&self, text: &str, per_page: Option<u32>) -> Result<Vec<Photo>, ClientError> {
        let mut params = vec![("text", text.to_string())];
        if let Some(per_page) = per_page {
            params.push(("per_page", per_page.to_string()));
        }
        let body = self.call("flickr.photos.search", &params).await?;

        let photos = match body.pointer("/photos/photo") {
            Some(list) => serde_json::from_value(list.clone()).map_err(|e| ClientError::Decode(e.to_string()))?,
            None => Vec::new(),
        };
        debug!(text, found = photos.len(), "flickr search finished");
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn builds_static_url_from_mixed_field_types() {
        let photo: Photo = serde_json::from_value(json!({
            "id": "111", "secret": "abc", "server": 2, "farm": 1
        }))
        .unwrap();
        assert_eq!(
            photo.image_url().as_deref(),
            Some("https://farm1.staticflickr.com/2/111_abc.jpg")
        );
    }

    #[test]
    fn missing_or_blank_fields_have_no_url() {
        let missing: Photo = serde_json::from_value(json!({ "id": "1", "server": "2", "farm": 3 })).unwrap();
        assert_eq!(missing.image_url(), None);
        let blank: Photo =
            serde_json::from_value(json!({ "id": "1", "secret": " ", "server": "2", "farm": 3 })).unwrap();
        assert_eq!(blank.image_url(), None);
    }

    #[tokio::test]
    async fn api_failure_keeps_flickr_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("method".into(), "flickr.photos.getInfo".into()))
            .with_body(json!({ "stat": "fail", "code": 1, "message": "Photo not found" }).to_string())
            .create_async()
            .await;

        let client = FlickrClient::new(reqwest::Client::new(), "key".into()).with_rest_url(server.url());
        let err = client.photo_info("42").await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ref msg) if msg.contains("Photo not found")));
    }

    #[tokio::test]
    async fn search_sends_key_text_and_page_size() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "flickr.photos.search".into()),
                Matcher::UrlEncoded("api_key".into(), "key".into()),
                Matcher::UrlEncoded("text".into(), "sunset".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("nojsoncallback".into(), "1".into()),
            ]))
            .with_body(json!({ "stat": "ok", "photos": { "photo": [] } }).to_string())
            .create_async()
            .await;

        let client = FlickrClient::new(reqwest::Client::new(), "key".into()).with_rest_url(server.url());
        assert!(client.search("sunset", Some(2)).await.unwrap().is_empty());
        mock.assert_async().await;
    }
}
