// HTTP seam for the scraping pipeline

// =============== Imports ================
use crate::error::Result;
use crate::models::Headers;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub const REFERER: &str = "Referer";
pub const USER_AGENT: &str = "User-Agent";

/// Headers every site/oracle request carries. The referer has to be the page
/// (or iframe) that owns the request, the site rejects anything else.
pub fn api_headers(referer: &str, user_agent: &str) -> Headers {
    let mut headers = media_headers(referer, user_agent);
    headers.insert("Accept".to_string(), "*/*".to_string());
    headers.insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());
    headers
}

/// Headers a player needs to fetch the stream itself.
pub fn media_headers(referer: &str, user_agent: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert(REFERER.to_string(), referer.to_string());
    headers.insert(USER_AGENT.to_string(), user_agent.to_string());
    headers
}

/// Minimal request surface the pipeline needs. Bodies come back as text so
/// each stage can decide how to decode them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<String>;
    async fn post_json(&self, url: &str, headers: &Headers, body: &Value) -> Result<String>;
}

/// The real thing, backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn apply_headers(mut request: reqwest::RequestBuilder, headers: &Headers) -> reqwest::RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &Headers) -> Result<String> {
        log::debug!("GET {}", url);
        let response = apply_headers(self.client.get(url), headers)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post_json(&self, url: &str, headers: &Headers, body: &Value) -> Result<String> {
        log::debug!("POST {}", url);
        let response = apply_headers(self.client.post(url), headers)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
