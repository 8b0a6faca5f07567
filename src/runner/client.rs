use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

/// Thin JSON client for the service under test.
///
/// Every call must come back `200 OK`; any other status, a transport error, or
/// a timeout is returned as an error for the calling case to fail on.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let request = self.http.get(self.url(path));
        let response = self.send(request, Method::GET, path).await?;
        read_json(response, &Method::GET, path).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send(request, Method::POST, path).await?;
        read_json(response, &Method::POST, path).await
    }

    /// GET `path` with its own timeout, checking only for `200 OK`.
    /// Returns the round-trip time.
    pub async fn probe(&self, path: &str, timeout: Duration) -> Result<Duration> {
        let start = Instant::now();
        let request = self.http.get(self.url(path)).timeout(timeout);
        self.send(request, Method::GET, path).await?;
        Ok(start.elapsed())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        method: Method,
        path: &str,
    ) -> Result<reqwest::Response> {
        let start = Instant::now();
        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {path} failed"))?;
        let status = response.status();

        tracing::debug!(
            %method,
            url = %response.url(),
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request finished"
        );

        ensure!(
            status == StatusCode::OK,
            "{method} {path} returned HTTP {status}, expected 200"
        );
        Ok(response)
    }
}

async fn read_json(response: reqwest::Response, method: &Method, path: &str) -> Result<Value> {
    response
        .json::<Value>()
        .await
        .with_context(|| format!("{method} {path} returned a body that is not JSON"))
}
