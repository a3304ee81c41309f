//! Web crawler tool: fetches page content through a hosted crawl API

use std::time::Duration;

use async_trait::async_trait;
use reagent_core::tools::{
    ToolCall, ToolCallback, ToolError, ToolParameter, ToolResult, ToolSchema,
};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from the crawl service
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("invalid target url '{0}'")]
    InvalidUrl(String),

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for a crawl API reached by authenticated POST
///
/// The service expects a JSON body naming the page to fetch and answers
/// with the extracted content. Anything other than a 200 is a failure;
/// the response body is carried on the error for diagnosis.
pub struct HttpCrawlerService {
    endpoint: Url,
    token: String,
    client: reqwest::Client,
}

impl HttpCrawlerService {
    /// Create a client for the given crawl endpoint
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self, CrawlerError> {
        let endpoint = validate_url(endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            endpoint,
            token: token.into(),
            client,
        })
    }

    /// Fetch the content of a single page
    pub async fn crawl(&self, target_url: &str) -> Result<String, CrawlerError> {
        let target = validate_url(target_url)?;
        debug!(target = %target, "crawling page");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "url": target.as_str() }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(CrawlerError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// Check that a URL parses and uses an http(s) scheme
fn validate_url(raw: &str) -> Result<Url, CrawlerError> {
    let url = Url::parse(raw).map_err(|_| CrawlerError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(CrawlerError::InvalidUrl(raw.to_string())),
    }
}

/// Tool surface over [`HttpCrawlerService`]
pub struct WebCrawlerTool {
    service: HttpCrawlerService,
}

impl WebCrawlerTool {
    /// Create the tool over an existing service client
    pub fn new(service: HttpCrawlerService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolCallback for WebCrawlerTool {
    fn name(&self) -> &str {
        "web_crawler"
    }

    fn description(&self) -> &str {
        "Fetch the content of a web page by URL"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "web_crawler",
            "Fetch the content of a web page by URL",
            vec![ToolParameter::string(
                "target_url",
                "Absolute http(s) URL of the page to fetch",
            )],
        )
    }

    async fn call(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let target_url = call.get_string("target_url").ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'target_url' parameter".to_string())
        })?;

        match self.service.crawl(&target_url).await {
            Ok(content) => Ok(ToolResult::success(&call.id, self.name(), content)),
            Err(CrawlerError::InvalidUrl(url)) => Err(ToolError::InvalidArguments(format!(
                "Invalid target url '{url}'"
            ))),
            Err(err) => Err(ToolError::ExecutionFailed(err.to_string())),
        }
    }
}
