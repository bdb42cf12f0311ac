//! Document processing pipeline: extraction, summarization, and similarity.

pub mod extract;
mod service;
pub mod similarity;
pub mod summarize;
pub mod types;

pub use service::{PipelineApi, PipelineService};
pub use types::{
    BatchResult, BatchStage, DocumentFormat, DocumentInput, ExtractionError, PipelineError,
};
