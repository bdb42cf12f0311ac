#![deny(missing_docs)]

//! Core library for the docdigest summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline activity counters.
pub mod metrics;
/// Document processing pipeline: extraction, summarization, similarity.
pub mod processing;
/// Summarization client abstraction and adapters.
pub mod summarization;
