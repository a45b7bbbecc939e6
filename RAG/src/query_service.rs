use crate::document_processor::DocumentProcessor;
use crate::embedding_service::EmbeddingService;
use crate::gemini_service::GeminiService;
use crate::models::*;
use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use tiktoken_rs::CoreBPE;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 6000;
const UPLOADS_PREFIX: &str = "uploads/";

/// Maps a client-supplied document path onto a file inside `upload_dir`.
///
/// Accepts the public form returned by the upload route (`/uploads/upload.pdf`)
/// as well as `uploads/upload.pdf` and a bare `upload.pdf`. Anything that
/// would leave `upload_dir` is refused.
pub fn resolve_upload_path(upload_dir: &Path, file_path: &str) -> Result<PathBuf> {
    let trimmed = file_path.trim().trim_start_matches('/');
    let relative = trimmed
        .strip_prefix(UPLOADS_PREFIX)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(trimmed);
    let relative = if relative == UPLOADS_PREFIX.trim_end_matches('/') { "" } else { relative };

    if relative.is_empty() {
        bail!("Document path '{}' does not name a file", file_path);
    }

    let relative = Path::new(relative);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        bail!("Document path '{}' escapes the upload directory", file_path);
    }

    Ok(upload_dir.join(relative))
}

pub struct QueryService {
    processor: DocumentProcessor,
    gemini_service: GeminiService,
    upload_dir: PathBuf,
    max_results: usize,
    max_context_tokens: usize,
    tokenizer: CoreBPE,
}

impl QueryService {
    pub fn new(gemini_service: GeminiService, upload_dir: impl Into<PathBuf>) -> Result<Self> {
        let tokenizer = tiktoken_rs::cl100k_base().context("Failed to load cl100k_base tokenizer")?;

        Ok(Self {
            processor: DocumentProcessor::new(),
            gemini_service,
            upload_dir: upload_dir.into(),
            max_results: DEFAULT_MAX_RESULTS,
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            tokenizer,
        })
    }

    pub fn with_limits(mut self, max_results: usize, max_context_tokens: usize) -> Self {
        self.max_results = max_results.max(1);
        self.max_context_tokens = max_context_tokens;
        self
    }

    /// Answers `question` against the PDF stored at `file_path`.
    ///
    /// The document is read and indexed on every call, so a query against the
    /// fixed upload path always sees whichever file was stored last.
    pub async fn process_query(&self, file_path: &str, question: &str) -> Result<String> {
        let start_time = std::time::Instant::now();

        let path = resolve_upload_path(&self.upload_dir, file_path)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            bail!("Document not found: {}", path.display());
        }

        let mut document = self.processor.process_pdf(&path).await?;
        if document.chunks.is_empty() {
            bail!("Document {} has no extractable text", document.filename);
        }

        let embedding_service = EmbeddingService::fit(&document.chunks);
        embedding_service.embed_chunks(&mut document.chunks);
        let relevant_chunks = embedding_service.rank(question, &document.chunks, self.max_results);

        let context = self.build_context(&relevant_chunks);
        let answer = self.gemini_service.generate_response(question, &context).await?;

        log::info!(
            "Answered question against {} in {} ms",
            document.filename,
            start_time.elapsed().as_millis()
        );
        Ok(answer)
    }

    /// Joins the ranked excerpts until the token budget is spent. The best
    /// excerpt is always kept.
    fn build_context(&self, chunks: &[ScoredChunk]) -> String {
        let mut context = String::new();
        let mut used_tokens = 0;

        for (idx, scored) in chunks.iter().enumerate() {
            let excerpt = format!("Excerpt {}:\n{}\n\n", idx + 1, scored.chunk.content);
            let tokens = self.tokenizer.encode_with_special_tokens(&excerpt).len();

            if idx > 0 && used_tokens + tokens > self.max_context_tokens {
                log::info!("Context budget reached after {} excerpts", idx);
                break;
            }

            used_tokens += tokens;
            context.push_str(&excerpt);
        }

        context
    }
}
