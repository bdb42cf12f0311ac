//! Summary generation with length control and degraded-input handling.
//!
//! This layer never errors: every failure mode resolves to a tagged [`SummaryOutcome`]
//! variant so callers can tell a generated summary from a degraded placeholder, while the
//! response boundary still renders the fixed placeholder strings.

use crate::summarization::{SummarizationClient, SummarizationRequest};

/// Hard upper bound on whitespace-delimited input tokens fed to the model.
pub const MODEL_INPUT_TOKEN_LIMIT: usize = 1024;

/// Largest lower word bound ever requested from the model.
const MIN_LENGTH_CAP: usize = 40;
/// Margin keeping the lower bound strictly under the requested maximum.
const MIN_LENGTH_MARGIN: usize = 10;

/// Result of one summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The model produced a summary.
    Generated(String),
    /// Input was empty or whitespace-only after truncation.
    EmptyInput,
    /// The model returned an empty result.
    EmptyResult,
    /// The summarization client failed; the cause is carried verbatim.
    Failed(String),
}

impl SummaryOutcome {
    /// Whether this outcome is a degraded placeholder rather than a real summary.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Generated(_))
    }

    /// Render the outcome as the response string.
    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) => text,
            Self::EmptyInput => "Unable to generate summary: Empty input text".to_string(),
            Self::EmptyResult => {
                "Summary generation failed: Empty result from summarizer".to_string()
            }
            Self::Failed(cause) => format!("Summary generation failed: {cause}"),
        }
    }
}

/// Generate a bounded-length summary for `text`.
///
/// The input is truncated to its first [`MODEL_INPUT_TOKEN_LIMIT`] whitespace-delimited
/// tokens before being handed to the client. All client failures are caught and converted.
pub async fn generate_summary(
    client: &dyn SummarizationClient,
    text: &str,
    max_length: usize,
) -> SummaryOutcome {
    let input = truncate_input(text);
    if input.is_empty() {
        tracing::warn!("Empty input text provided for summarization");
        return SummaryOutcome::EmptyInput;
    }
    tracing::info!(characters = input.len(), "Attempting to summarize text");

    let (min_length, max_length) = summary_bounds(max_length);
    match client
        .generate_summary(SummarizationRequest {
            text: input,
            min_length,
            max_length,
        })
        .await
    {
        Ok(summary) if summary.trim().is_empty() => {
            tracing::error!("Summary generation failed: empty result from summarizer");
            SummaryOutcome::EmptyResult
        }
        Ok(summary) => {
            tracing::info!(characters = summary.len(), "Generated summary");
            SummaryOutcome::Generated(summary)
        }
        Err(error) => {
            tracing::error!(error = %error, "Summary generation failed");
            SummaryOutcome::Failed(error.to_string())
        }
    }
}

/// Keep the first [`MODEL_INPUT_TOKEN_LIMIT`] whitespace-delimited tokens, single-spaced.
fn truncate_input(text: &str) -> String {
    text.split_whitespace()
        .take(MODEL_INPUT_TOKEN_LIMIT)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the `(min, max)` length bounds: `min = min(40, max - 10)`.
fn summary_bounds(max_length: usize) -> (usize, usize) {
    (
        MIN_LENGTH_CAP.min(max_length.saturating_sub(MIN_LENGTH_MARGIN)),
        max_length,
    )
}
