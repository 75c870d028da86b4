//! External oracle capabilities: translation, sentiment classification,
//! asset storage, and one-time-code delivery.
//!
//! Each oracle is an injected trait object rather than an ambient singleton
//! so services can run against deterministic fakes in tests. The HTTP
//! implementations share a single `reqwest` client with a bounded timeout;
//! a timeout or transport failure is an `OracleError`, which services
//! surface as a retryable upstream error, never a moderation decision.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::OracleConfig;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request timed out")]
    Timeout,
    #[error("oracle transport failure: {0}")]
    Transport(String),
    #[error("oracle returned malformed response: {0}")]
    BadResponse(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Timeout
        } else {
            OracleError::Transport(err.to_string())
        }
    }
}

/// Sentiment label from a closed but extensible set. Only `Negative` gates
/// a submission; unknown labels are carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            other => SentimentLabel::Other(other.to_string()),
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Best-effort translation; an empty result signals failure upstream.
    async fn translate(&self, text: &str) -> Result<String, OracleError>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentLabel, OracleError>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads a local file and returns its public URL, or `None` when the
    /// store declined it. Callers treat failures as "post without image".
    async fn store(&self, local_path: &Path) -> Result<Option<String>, OracleError>;
}

#[async_trait]
pub trait CodeSender: Send + Sync {
    /// Fire-and-forget delivery of a one-time code.
    async fn send(&self, address: &str, code: &str) -> Result<(), OracleError>;
}

pub fn build_http_client(config: &OracleConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("CampusFeed/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout)
        .build()?)
}

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    translation: String,
}

#[derive(Debug, Deserialize)]
struct SentimentScore {
    label: String,
}

#[derive(Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
}

impl HttpTranslator {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> Result<String, OracleError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TextPayload { text })
            .send()
            .await?
            .error_for_status()?;
        let body: TranslationResponse = response
            .json()
            .await
            .map_err(|err| OracleError::BadResponse(err.to_string()))?;
        Ok(body.translation.trim().to_string())
    }
}

#[derive(Clone)]
pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpSentimentClassifier {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentLabel, OracleError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TextPayload { text })
            .send()
            .await?
            .error_for_status()?;
        // Classifier services return a ranked list; the top label decides.
        let scores: Vec<SentimentScore> = response
            .json()
            .await
            .map_err(|err| OracleError::BadResponse(err.to_string()))?;
        let top = scores
            .first()
            .ok_or_else(|| OracleError::BadResponse("empty classification result".into()))?;
        Ok(SentimentLabel::from_label(&top.label))
    }
}

#[derive(Debug, Deserialize)]
struct AssetUploadResponse {
    url: String,
}

#[derive(Clone)]
pub struct HttpAssetStore {
    client: reqwest::Client,
    url: String,
}

impl HttpAssetStore {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn store(&self, local_path: &Path) -> Result<Option<String>, OracleError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|err| OracleError::Transport(format!("read {local_path:?}: {err}")))?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        let body: AssetUploadResponse = response
            .json()
            .await
            .map_err(|err| OracleError::BadResponse(err.to_string()))?;
        if body.url.is_empty() {
            return Ok(None);
        }
        Ok(Some(body.url))
    }
}

/// No-op asset store used when no upload endpoint is configured; every post
/// degrades to "no image".
pub struct DisabledAssetStore;

#[async_trait]
impl AssetStore for DisabledAssetStore {
    async fn store(&self, local_path: &Path) -> Result<Option<String>, OracleError> {
        tracing::debug!(?local_path, "asset store disabled, dropping image");
        Ok(None)
    }
}

#[derive(Debug, Serialize)]
struct CodePayload<'a> {
    address: &'a str,
    code: &'a str,
}

#[derive(Clone)]
pub struct HttpCodeSender {
    client: reqwest::Client,
    url: String,
}

impl HttpCodeSender {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CodeSender for HttpCodeSender {
    async fn send(&self, address: &str, code: &str) -> Result<(), OracleError> {
        self.client
            .post(&self.url)
            .json(&CodePayload { address, code })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Used when no mailer endpoint is configured. Logs instead of delivering so
/// local development still surfaces the code.
pub struct LoggingCodeSender;

#[async_trait]
impl CodeSender for LoggingCodeSender {
    async fn send(&self, address: &str, code: &str) -> Result<(), OracleError> {
        tracing::info!(address, code, "mailer not configured, logging one-time code");
        Ok(())
    }
}
