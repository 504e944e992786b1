use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use quotedesk_core::config::ApiConfig;
use quotedesk_core::domain::product::Product;
use quotedesk_core::domain::quote::{ConfirmedQuote, CreateQuoteRequest, CreatedQuote, QuoteId};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {message}")]
    NetworkFailure { url: String, message: String },
    #[error("{url} answered with status {status}: {}", error_detail(.body))]
    UnexpectedStatus { url: String, status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

/// The three backend calls the quote builder makes.
#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn create_quote(&self, request: &CreateQuoteRequest) -> Result<CreatedQuote, ApiError>;
    async fn fetch_quote(&self, id: QuoteId) -> Result<ConfirmedQuote, ApiError>;
}

pub struct HttpQuoteApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQuoteApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_body(url: String, response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure { url: url.clone(), message: e.to_string() })?;

        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus { url, status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait]
impl QuoteApi for HttpQuoteApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.url("/products");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure { url: url.clone(), message: e.to_string() })?;

        parse_json(&Self::read_body(url, response).await?)
    }

    async fn create_quote(&self, request: &CreateQuoteRequest) -> Result<CreatedQuote, ApiError> {
        let url = self.url("/quotes");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure { url: url.clone(), message: e.to_string() })?;

        parse_json(&Self::read_body(url, response).await?)
    }

    async fn fetch_quote(&self, id: QuoteId) -> Result<ConfirmedQuote, ApiError> {
        let url = self.url(&format!("/quotes/{id}"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure { url: url.clone(), message: e.to_string() })?;

        parse_json(&Self::read_body(url, response).await?)
    }
}

const DETAIL_LIMIT: usize = 200;

/// The backend's `{error}` (or `{detail}`) message, else the raw body cut
/// to `DETAIL_LIMIT` characters.
fn error_detail(body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        let message = ["error", "detail"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(serde_json::Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    match trimmed.char_indices().nth(DETAIL_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}
