use crate::error::Result;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the request finally resolved to, after redirects
    pub final_url: Url,
    pub status: u16,
    /// Empty when the response was not markup
    pub body: String,
}

/// Whether a response can carry links. A missing content type is read anyway.
fn is_markup(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(content_type) => {
            let content_type = content_type.to_ascii_lowercase();
            content_type.starts_with("text/") || content_type.contains("xml")
        }
    }
}

/// Issues a GET for a URL, following redirects.
///
/// Only transport and protocol failures are errors; a non-success status is
/// still a fetched page.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("hostcrawl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = if is_markup(content_type.as_deref()) {
            response.text().await?
        } else {
            debug!("Skipping body of {} ({:?})", final_url, content_type);
            String::new()
        };

        debug!("Fetched {} -> {} ({})", url, final_url, status);
        Ok(FetchedPage {
            final_url,
            status,
            body,
        })
    }
}
