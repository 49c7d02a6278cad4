use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::gallery::{open_in_browser, GalleryHandle, GalleryPage, GalleryServer};

use super::error::ToolError;
use super::traits::{ArgSchema, ToolOutput, TypedTool};

#[derive(Debug, Deserialize)]
pub struct ImageViewerInput {
    /// Shown exactly as given once each one parses as a URL.
    pub urls: Vec<String>,
    #[serde(alias = "querySummary")]
    pub query_summary: String,
}

/// Shows a set of image URLs in a local web gallery.
///
/// The first call starts the listener; later calls replace the page it serves
/// and report the same address, so repeated use never fights over the port.
pub struct ImageViewerTool {
    bind_addr: String,
    open_browser: bool,
    server: Mutex<Option<GalleryHandle>>,
}

impl ImageViewerTool {
    pub fn new(bind_addr: impl Into<String>, open_browser: bool) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            open_browser,
            server: Mutex::new(None),
        }
    }

    /// Handle of the running listener, if one has been started.
    pub async fn handle(&self) -> Option<GalleryHandle> {
        self.server.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl TypedTool for ImageViewerTool {
    type Input = ImageViewerInput;

    const NAME: &'static str = "ImageViewerTool";
    const DESCRIPTION: &'static str =
        "Spins up a local image viewer web page showing the provided list of image URLs.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![
            ArgSchema::required("urls", "array", "List of image URLs to display"),
            ArgSchema::required("query_summary", "string", "Short summary of what the images show, used as the page title"),
        ]
    }

    fn validate(&self, input: &ImageViewerInput) -> Result<(), String> {
        if input.urls.is_empty() {
            return Err("No image URLs provided to the Image Viewer Tool.".into());
        }
        for url in &input.urls {
            Url::parse(url).map_err(|e| format!("'{}' is not a valid image URL: {}", url, e))?;
        }
        Ok(())
    }

    async fn call(&self, input: ImageViewerInput) -> Result<ToolOutput, ToolError> {
        let page = GalleryPage::new(&input.query_summary, input.urls);

        let mut server = self.server.lock().await;
        let handle = match server.as_ref() {
            Some(handle) => {
                handle.show(page).await;
                handle.clone()
            }
            None => {
                let handle = GalleryServer::start(&self.bind_addr, page)
                    .await
                    .map_err(|e| ToolError::upstream(Self::NAME, e))?;
                *server = Some(handle.clone());
                handle
            }
        };
        drop(server);

        let url = handle.url();
        if self.open_browser {
            open_in_browser(&url);
        }
        Ok(ToolOutput::Text(format!("Image viewer running at {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error::ToolErrorKind;
    use crate::tools::traits::Tool;
    use serde_json::json;

    async fn served_page(url: &str) -> String {
        reqwest::get(url).await.unwrap().text().await.unwrap()
    }

    #[tokio::test]
    async fn confirmation_names_bound_address_and_page_shows_every_url() {
        let tool = ImageViewerTool::new("127.0.0.1:0", false);
        let out = tool
            .run(json!({
                "urls": ["https://a.example/1.jpg", "https://a.example/2.jpg", "https://a.example/3.jpg"],
                "query_summary": "red pandas"
            }))
            .await
            .unwrap();

        let handle = tool.handle().await.expect("listener started");
        assert_eq!(out, format!("Image viewer running at http://{}", handle.addr()));

        let html = served_page(&handle.url()).await;
        assert_eq!(html.matches("<img ").count(), 3);
        assert!(html.contains("<h1>Red Pandas</h1>"));
    }

    #[tokio::test]
    async fn repeated_calls_reuse_the_listener() {
        let tool = ImageViewerTool::new("127.0.0.1:0", false);
        let first = tool
            .run(json!({ "urls": ["https://a.example/1.jpg"], "querySummary": "one" }))
            .await
            .unwrap();
        let second = tool
            .run(json!({ "urls": ["https://a.example/1.jpg", "https://a.example/2.jpg"], "query_summary": "two" }))
            .await
            .unwrap();
        assert_eq!(first, second);

        let html = served_page(&tool.handle().await.unwrap().url()).await;
        assert_eq!(html.matches("<img ").count(), 2);
        assert!(html.contains("<h1>Two</h1>"));
    }

    #[tokio::test]
    async fn urls_are_served_as_given() {
        let tool = ImageViewerTool::new("127.0.0.1:0", false);
        tool.run(json!({ "urls": ["HTTPS://Example.COM/Pics/Cat.JPG"], "query_summary": "cat" }))
            .await
            .unwrap();

        let html = served_page(&tool.handle().await.unwrap().url()).await;
        assert!(html.contains(r#"src="HTTPS://Example.COM/Pics/Cat.JPG""#));
    }

    #[tokio::test]
    async fn empty_or_invalid_urls_start_nothing() {
        let tool = ImageViewerTool::new("127.0.0.1:0", false);
        for input in [
            json!({ "urls": [], "query_summary": "x" }),
            json!({ "urls": ["not a url"], "query_summary": "x" }),
            json!({ "urls": ["https://a.example/1.jpg"] }),
        ] {
            assert_eq!(tool.run(input).await.unwrap_err().kind(), ToolErrorKind::InputValidation);
        }
        assert!(tool.handle().await.is_none());
    }
}
