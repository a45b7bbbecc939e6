pub mod models;
pub mod document_processor;
pub mod embedding_service;
pub mod gemini_service;
pub mod query_service;

#[cfg(test)]
mod test_support;

pub use models::*;
pub use document_processor::{extract_pdf_text, DocumentProcessor};
pub use embedding_service::EmbeddingService;
pub use gemini_service::{GeminiConfig, GeminiService};
pub use query_service::{resolve_upload_path, QueryService};
