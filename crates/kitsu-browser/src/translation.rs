//! Best-effort synopsis translation with a session-wide memo.
//!
//! Talks to a LibreTranslate-compatible endpoint. Successful translations are
//! cached by exact source text for the life of the process; failures fall back
//! to the source text and are never cached, so the next request retries.

use crate::api::TransportError;
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use shared::config::TranslationConfig;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Translation request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Memoizing translator
#[derive(Debug)]
pub struct Translator {
    client: Client,
    endpoint: String,
    source: String,
    target: String,
    enabled: bool,
    cache: Mutex<HashMap<String, String>>,
}

impl Translator {
    /// Create a translator for the given endpoint and language pair
    pub fn new(
        endpoint: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)
            .map_err(|e| TransportError::InvalidBaseUrl(format!("{}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self {
            client,
            endpoint,
            source: source.into(),
            target: target.into(),
            enabled: true,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Create a translator from configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TransportError> {
        let mut translator = Self::new(
            config.endpoint.clone(),
            config.source_language.clone(),
            config.target_language.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        translator.enabled = config.enabled;
        Ok(translator)
    }

    /// Disable or re-enable network translation (disabled → identity)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Translate `text`.
    ///
    /// Blank input yields an empty string without touching the network or
    /// the cache. Never fails: any error returns `text` unchanged.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        if let Some(cached) = self.cached(text) {
            debug!(chars = text.len(), "Translation cache hit");
            return cached;
        }

        if !self.enabled {
            return text.to_string();
        }

        match self.request_translation(text).await {
            Ok(translated) => {
                // Concurrent misses for the same text both land here; last write wins.
                self.entries().insert(text.to_string(), translated.clone());
                debug!(chars = text.len(), "Translation cached");
                translated
            }
            Err(e) => {
                warn!(error = %e, "Translation failed, keeping original text");
                text.to_string()
            }
        }
    }

    /// Translate several texts concurrently, preserving input order
    pub async fn translate_batch(&self, texts: &[String]) -> Vec<String> {
        join_all(texts.iter().map(|text| self.translate(text))).await
    }

    /// Cached translation for the exact source text
    pub fn cached(&self, text: &str) -> Option<String> {
        self.entries().get(text).cloned()
    }

    /// Number of memoized translations
    pub fn cache_len(&self) -> usize {
        self.entries().len()
    }

    /// Forget every memoized translation
    pub fn clear(&self) {
        self.entries().clear();
    }

    async fn request_translation(&self, text: &str) -> Result<String, TransportError> {
        let request = TranslateRequest {
            q: text,
            source: &self.source,
            target: &self.target,
            format: "text",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                url: self.endpoint.clone(),
                status,
                body,
            });
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TransportError::from_reqwest(&self.endpoint, e))?;

        body.translated_text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TransportError::Decode {
                url: self.endpoint.clone(),
                message: "missing translatedText".to_string(),
            })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
