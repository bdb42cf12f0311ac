//! Abstractions for generating abstractive summaries via local providers.
//!
//! The Ollama-backed client issues HTTP requests directly to the runtime. When no provider is
//! configured, a deterministic extractive summarizer stands in so the service can run without a
//! model daemon; both backends honor the same length bounds.

use crate::config::{SummarizerProvider, get_config};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was explicitly disabled or unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Input text, already truncated by the processing pipeline.
    pub text: String,
    /// Lower word bound requested for the summary.
    pub min_length: usize,
    /// Upper word bound requested for the summary.
    pub max_length: usize,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a bounded-length summary for the supplied text.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build a summarization client based on configuration.
pub fn build_summarization_client() -> Box<dyn SummarizationClient + Send + Sync> {
    let config = get_config();
    match config.summarizer_provider {
        SummarizerProvider::None => Box::new(ExtractiveSummarizer),
        SummarizerProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let model = config
                .summarizer_model
                .clone()
                .expect("SUMMARIZER_MODEL validated during config load");
            Box::new(OllamaSummarizationClient::new(base_url, model))
        }
    }
}

struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docdigest/summary")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

fn build_prompt(request: &SummarizationRequest) -> String {
    format!(
        "System: You write abstractive summaries. Respond with a single paragraph of between \
         {min} and {max} words capturing the main points of the text. No preamble.\n\n\
         Summarize the following text:\n{text}",
        min = request.min_length,
        max = request.max_length,
        text = request.text,
    )
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": {
                // Sampling disabled so identical input and bounds yield identical output.
                "temperature": 0.0,
                "seed": 0,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

/// Deterministic fallback summarizer that keeps leading sentences within the word budget.
pub struct ExtractiveSummarizer;

#[async_trait]
impl SummarizationClient for ExtractiveSummarizer {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        Ok(lead_sentences(
            &request.text,
            request.min_length,
            request.max_length,
        ))
    }
}

/// Accumulate leading sentences until the word budget is exhausted.
///
/// Always emits at least one sentence; an overlong first sentence is truncated to `max_words`.
fn lead_sentences(text: &str, min_words: usize, max_words: usize) -> String {
    let mut picked: Vec<&str> = Vec::new();
    let mut used_words = 0usize;

    for sentence in text
        .split_inclusive(|c| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
    {
        let words = sentence.split_whitespace().count();
        if !picked.is_empty() && used_words + words > max_words && used_words >= min_words {
            break;
        }
        picked.push(sentence);
        used_words += words;
        if used_words >= max_words {
            break;
        }
    }

    if picked.is_empty() {
        return text
            .split_whitespace()
            .take(max_words)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let summary = picked.join(" ");
    if used_words > max_words {
        summary
            .split_whitespace()
            .take(max_words)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        summary
    }
}
