//! Pipeline service coordinating extraction, summarization, and similarity.

use crate::{
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        extract::extract,
        similarity::similarity_matrix,
        summarize::generate_summary,
        types::{BatchResult, BatchStage, DocumentFormat, DocumentInput, PipelineError},
    },
    summarization::{SummarizationClient, build_summarization_client},
};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;

/// Coordinates the full document pipeline: extraction, summarization, and similarity.
///
/// The service owns the process-wide summarization client and the metrics registry.
/// Construct it once near process start and share it through an `Arc`; the client is built
/// eagerly so there is no lazy first-use initialization to guard.
pub struct PipelineService {
    summarizer: Box<dyn SummarizationClient + Send + Sync>,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Extract, summarize, and score a batch of documents.
    async fn process_batch(
        &self,
        documents: Vec<DocumentInput>,
        max_length: usize,
    ) -> Result<BatchResult, PipelineError>;

    /// Summarize one raw text, bypassing extraction and similarity.
    async fn summarize_text(&self, text: String, max_length: usize) -> BatchResult;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build a new pipeline service using the configured summarization backend.
    pub fn new() -> Self {
        tracing::info!("Initializing summarization client");
        Self::with_client(build_summarization_client())
    }

    /// Build a pipeline service around an explicit summarization client.
    pub fn with_client(summarizer: Box<dyn SummarizationClient + Send + Sync>) -> Self {
        Self {
            summarizer,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Run the full batch pipeline.
    ///
    /// Extraction is atomic: the first failure aborts the whole batch and no partial result
    /// is returned. Summarization failures are isolated per document and rendered inline.
    /// Output ordering follows input ordering throughout.
    pub async fn process_batch(
        &self,
        documents: Vec<DocumentInput>,
        max_length: usize,
    ) -> Result<BatchResult, PipelineError> {
        tracing::info!(
            stage = %BatchStage::Received,
            documents = documents.len(),
            max_length,
            "Accepted document batch"
        );

        let original_texts = match self.extract_all(&documents) {
            Ok(texts) => texts,
            Err(error) => {
                tracing::error!(
                    stage = %BatchStage::Failed,
                    error = %error,
                    "Batch aborted during extraction"
                );
                return Err(error);
            }
        };

        tracing::debug!(stage = %BatchStage::Summarizing, "Summarizing extracted texts");
        let mut summaries = Vec::with_capacity(original_texts.len());
        for (ordinal, text) in original_texts.iter().enumerate() {
            let outcome = generate_summary(self.summarizer.as_ref(), text, max_length).await;
            if outcome.is_degraded() {
                self.metrics.record_degraded_summary();
                tracing::warn!(ordinal, "Summary degraded to placeholder");
            }
            summaries.push(outcome.into_text());
        }

        tracing::debug!(stage = %BatchStage::ComputingSimilarity, "Computing similarity matrix");
        let matrix = similarity_matrix(&original_texts);

        self.metrics.record_batch(documents.len() as u64);
        tracing::info!(
            stage = %BatchStage::Complete,
            summaries = summaries.len(),
            "Batch processing complete"
        );

        Ok(BatchResult {
            summaries,
            original_texts,
            similarity_matrix: Some(matrix),
        })
    }

    /// Summarize a single raw text; the result carries no similarity matrix.
    pub async fn summarize_text(&self, text: String, max_length: usize) -> BatchResult {
        let outcome = generate_summary(self.summarizer.as_ref(), &text, max_length).await;
        if outcome.is_degraded() {
            self.metrics.record_degraded_summary();
        }
        self.metrics.record_batch(1);

        BatchResult {
            summaries: vec![outcome.into_text()],
            original_texts: vec![text],
            similarity_matrix: None,
        }
    }

    /// Extract every document in input order, aborting on the first failure.
    fn extract_all(&self, documents: &[DocumentInput]) -> Result<Vec<String>, PipelineError> {
        tracing::debug!(stage = %BatchStage::Extracting, "Extracting document texts");
        let mut texts = Vec::with_capacity(documents.len());
        for (ordinal, document) in documents.iter().enumerate() {
            let format = DocumentFormat::from_filename(&document.filename)?;
            let text = self.extract_document(document, format)?;
            tracing::info!(
                ordinal,
                filename = %document.filename,
                characters = text.len(),
                "Extracted document"
            );
            texts.push(text);
        }
        Ok(texts)
    }

    /// Stage one document to transient storage and extract its text.
    ///
    /// The staged file lives only for the duration of this call; removal happens on every
    /// return path, and removal failures are logged rather than re-raised.
    fn extract_document(
        &self,
        document: &DocumentInput,
        format: DocumentFormat,
    ) -> Result<String, PipelineError> {
        let mut staged = tempfile::Builder::new()
            .prefix("docdigest-")
            .suffix(format.suffix())
            .tempfile()?;
        staged.write_all(&document.content)?;

        let result = extract(staged.path(), format);

        if let Err(error) = staged.close() {
            tracing::warn!(error = %error, "Failed to remove staged temp file");
        }

        Ok(result?)
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn process_batch(
        &self,
        documents: Vec<DocumentInput>,
        max_length: usize,
    ) -> Result<BatchResult, PipelineError> {
        PipelineService::process_batch(self, documents, max_length).await
    }

    async fn summarize_text(&self, text: String, max_length: usize) -> BatchResult {
        PipelineService::summarize_text(self, text, max_length).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}
