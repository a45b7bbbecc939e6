use anyhow::Result;
use async_trait::async_trait;
use pdf_rag::QueryService;
use std::path::Path;

/// Turns a stored PDF into plain text. An empty string means no text was found.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Answers a question about a previously uploaded document.
#[async_trait]
pub trait QueryProcessor: Send + Sync {
    async fn process_query(&self, file_path: &str, question: &str) -> Result<String>;
}

pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        pdf_rag::extract_pdf_text(path).await
    }
}

#[async_trait]
impl QueryProcessor for QueryService {
    async fn process_query(&self, file_path: &str, question: &str) -> Result<String> {
        QueryService::process_query(self, file_path, question).await
    }
}
