/// Vendor HTTP transport.
///
/// One long-lived client per flow with an automatic cookie jar: the
/// vendor tracks its server-side session in cookies, so the guest-login
/// cookies must be replayed on every later step of the same flow.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

use crate::config;
use crate::fields;

/// POST capability with persistent cookie retention across calls on
/// one instance. Implementations must error on non-2xx status; the
/// service layer folds those errors into its uniform result shape.
pub trait VendorTransport {
    fn post(
        &self,
        url: &str,
        payload: &Value,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// POST with extra request headers (the flight endpoints expect the
    /// caller's email in an `auth` header).
    fn post_with_headers(
        &self,
        url: &str,
        payload: &Value,
        headers: &[(String, String)],
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// POST returning the raw body text. Used at the login boundary
    /// where the response body is an encrypted blob, not JSON.
    fn post_text(
        &self,
        url: &str,
        payload: &Value,
        headers: &[(String, String)],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Cookie-retaining reqwest transport with differentiated timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config::REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .user_agent("Mozilla/5.0")
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        payload: &Value,
        headers: &[(String, String)],
    ) -> Result<reqwest::Response> {
        let mut request = self.client.post(url).json(payload);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error calling {url}: {status}");
            return Err(anyhow!("{url} returned HTTP {status}"));
        }
        Ok(response)
    }
}

impl VendorTransport for HttpTransport {
    async fn post(&self, url: &str, payload: &Value) -> Result<Value> {
        self.post_with_headers(url, payload, &[]).await
    }

    async fn post_with_headers(
        &self,
        url: &str,
        payload: &Value,
        headers: &[(String, String)],
    ) -> Result<Value> {
        let response = self.send(url, payload, headers).await?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(fields::empty_object());
        }
        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))?;
        if text.is_empty() {
            return Ok(fields::empty_object());
        }

        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("non-JSON response from {url}"))?;
        Ok(unwrap_double_encoded(value))
    }

    async fn post_text(
        &self,
        url: &str,
        payload: &Value,
        headers: &[(String, String)],
    ) -> Result<String> {
        let response = self.send(url, payload, headers).await?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))
    }
}

/// The vendor sometimes double-encodes its JSON body as a JSON string
/// literal. Unwrap one level; a plain string stays a string.
pub fn unwrap_double_encoded(value: Value) -> Value {
    if let Value::String(text) = &value {
        if let Ok(inner) = serde_json::from_str::<Value>(text) {
            tracing::debug!("decoded double-encoded JSON response");
            return inner;
        }
    }
    value
}
