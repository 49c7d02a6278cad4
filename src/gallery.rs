//! Local image gallery served over HTTP.
//!
//! [`GalleryServer::start`] binds a listener, spawns the axum service for the
//! rest of the process and hands back a [`GalleryHandle`]. The handle can swap
//! the page that is served, so one listener can show many galleries.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("cannot bind gallery listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gallery listener has no local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryPage {
    pub title: String,
    pub urls: Vec<String>,
}

impl GalleryPage {
    pub fn new(summary: &str, urls: Vec<String>) -> Self {
        Self {
            title: capitalize_words(summary),
            urls,
        }
    }

    pub fn render(&self) -> String {
        let title = escape_html(&self.title);
        let items: String = self
            .urls
            .iter()
            .map(|url| {
                format!(
                    "      <div class=\"grid-item\"><img src=\"{}\" alt=\"Image\"></div>\n",
                    escape_html(url)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
      body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f5f5f5; color: #333;
              display: flex; flex-direction: column; align-items: center; }}
      h1 {{ margin: 20px 0; }}
      .grid-container {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px;
                         width: 90%; max-width: 1200px; margin: 0 auto; }}
      .grid-item {{ position: relative; overflow: hidden; background-color: #ddd; border-radius: 8px;
                    box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }}
      .grid-item img {{ width: 100%; height: 100%; object-fit: cover; transition: transform 0.3s ease-in-out; }}
      .grid-item:hover img {{ transform: scale(1.1); }}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
    <div class="grid-container">
{items}    </div>
  </body>
</html>
"#
        )
    }
}

/// First letter of every space-separated word upper-cased, the rest lower-cased.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

type SharedPage = Arc<RwLock<GalleryPage>>;

/// A running gallery listener. Clones refer to the same listener.
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    addr: SocketAddr,
    page: SharedPage,
}

impl GalleryHandle {
    /// The address the listener is actually bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `page` from now on.
    pub async fn show(&self, page: GalleryPage) {
        *self.page.write().await = page;
    }
}

pub struct GalleryServer;

impl GalleryServer {
    /// Bind `addr` and serve `page` on `GET /` from a background task.
    /// The listener lives until the process exits.
    pub async fn start(addr: &str, page: GalleryPage) -> Result<GalleryHandle, GalleryError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| GalleryError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local = listener.local_addr().map_err(GalleryError::LocalAddr)?;

        let page: SharedPage = Arc::new(RwLock::new(page));
        let app = Router::new().route("/", get(serve_page)).with_state(page.clone());
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!(%local, error = %err, "image viewer stopped");
            }
        });

        info!(%local, "Image viewer running at http://{}", local);
        Ok(GalleryHandle { addr: local, page })
    }
}

async fn serve_page(State(page): State<SharedPage>) -> Html<String> {
    Html(page.read().await.render())
}

/// Ask the desktop to open `url`. Failures are logged and otherwise ignored.
pub fn open_in_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = tokio::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        tokio::process::Command::new("xdg-open")
    };
    command
        .arg(url)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());

    let url = url.to_string();
    tokio::spawn(async move {
        match command.status().await {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%url, %status, "browser launcher exited with an error"),
            Err(err) => warn!(%url, error = %err, "cannot launch browser"),
        }
    });
}
