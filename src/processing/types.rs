//! Core data types and error definitions for the processing pipeline.

use serde::Serialize;
use thiserror::Error;

/// Recognized document formats, resolved from the uploaded filename extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Paged PDF document.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// Plain UTF-8 text.
    Txt,
}

impl DocumentFormat {
    /// Resolve a format from a filename extension.
    ///
    /// The rejected token (extension with its leading dot, lowercased) is carried in the
    /// error so the request boundary can surface it verbatim.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        match extension.as_str() {
            ".pdf" => Ok(Self::Pdf),
            ".docx" => Ok(Self::Docx),
            ".txt" => Ok(Self::Txt),
            _ => Err(ExtractionError::UnsupportedFormat(extension)),
        }
    }

    /// Filename suffix used when staging a document of this format to disk.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Txt => ".txt",
        }
    }
}

/// One uploaded document awaiting processing.
///
/// Owned by a single pipeline invocation; nothing is persisted once the batch completes.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Filename as supplied by the client; its extension implies the format.
    pub filename: String,
    /// Raw document bytes.
    pub content: Vec<u8>,
}

/// Aggregated output of one pipeline invocation, serialized directly as the response body.
#[derive(Debug, Serialize)]
pub struct BatchResult {
    /// One summary per document, aligned with input order.
    pub summaries: Vec<String>,
    /// Extracted text per document, aligned with input order.
    pub original_texts: Vec<String>,
    /// Pairwise similarity matrix; `None` for single-text requests.
    pub similarity_matrix: Option<Vec<Vec<f64>>>,
}

/// Stages of one batch run, in order; `Failed` is terminal and only reachable
/// from `Extracting` or infrastructure errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStage {
    /// Batch accepted, nothing processed yet.
    Received,
    /// Per-document text extraction in progress.
    Extracting,
    /// Per-document summarization in progress.
    Summarizing,
    /// Whole-batch similarity computation in progress.
    ComputingSimilarity,
    /// Batch finished successfully.
    Complete,
    /// Batch aborted.
    Failed,
}

impl std::fmt::Display for BatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Extracting => "extracting",
            Self::Summarizing => "summarizing",
            Self::ComputingSimilarity => "computing_similarity",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors produced while turning a raw document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File extension outside the recognized set.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// PDF parser failure.
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
    /// DOCX container or markup failure.
    #[error("Failed to extract text from DOCX: {0}")]
    Docx(String),
    /// Plain-text document was not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// Underlying I/O failure while reading the staged file.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by the document processing pipeline.
///
/// Extraction failures abort the whole batch; summarization never surfaces here
/// (degraded outcomes are rendered inline instead).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction step failed for one document, aborting the batch.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Uploaded bytes could not be staged to transient storage.
    #[error("Failed to stage uploaded file: {0}")]
    Staging(#[from] std::io::Error),
}
