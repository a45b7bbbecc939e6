use crate::models::*;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

const DEFAULT_CHUNK_SIZE: usize = 500;
const DEFAULT_OVERLAP: usize = 50;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static SPECIAL_RE: OnceLock<Regex> = OnceLock::new();

/// Extracts the text layer of the PDF at `path`.
///
/// `pdf-extract` is synchronous and can be slow on large files, so the work
/// runs on tokio's blocking pool. An empty string means the PDF has no text
/// layer (scanned images, for example); callers decide whether that is an error.
pub async fn extract_pdf_text(path: impl AsRef<Path>) -> Result<String> {
    let path: PathBuf = path.as_ref().to_path_buf();
    log::info!("Extracting text from {}", path.display());

    let display = path.display().to_string();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .context("PDF extraction task panicked")?
        .map_err(|e| anyhow::anyhow!("Failed to extract text from {}: {}", display, e))?;

    log::info!("Extracted {} characters from {}", text.chars().count(), display);
    Ok(text)
}

pub struct DocumentProcessor {
    chunk_size: usize,
    overlap: usize,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor {
    pub fn new() -> Self {
        Self::with_chunking(DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP)
    }

    pub fn with_chunking(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub async fn process_pdf(&self, file_path: &Path) -> Result<Document> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        log::info!("Processing PDF: {}", filename);

        let content = extract_pdf_text(file_path).await?;
        Ok(self.build_document(filename, content))
    }

    pub fn build_document(&self, filename: String, content: String) -> Document {
        let chunks = self.create_chunks(&content);

        Document {
            id: Uuid::new_v4().to_string(),
            filename,
            content,
            chunks,
        }
    }

    pub fn create_chunks(&self, content: &str) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        let cleaned_content = clean_text(content);
        let sentences = self.split_into_sentences(&cleaned_content);

        let mut current_chunk = String::new();
        let mut current_len = 0;
        let mut start_pos = 0;

        for sentence in sentences {
            let sentence_len = sentence.chars().count();

            if current_len + sentence_len > self.chunk_size && !current_chunk.is_empty() {
                chunks.push(self.make_chunk(&current_chunk, start_pos, current_len));

                // Carry the tail of the finished chunk into the next one
                let overlap_text: String = if current_len > self.overlap {
                    current_chunk.chars().skip(current_len - self.overlap).collect()
                } else {
                    current_chunk.clone()
                };
                let overlap_len = overlap_text.chars().count();

                start_pos = start_pos + current_len - overlap_len;
                current_chunk = overlap_text + " " + &sentence;
                current_len = overlap_len + 1 + sentence_len;
            } else {
                if !current_chunk.is_empty() {
                    current_chunk.push(' ');
                    current_len += 1;
                }
                current_chunk.push_str(&sentence);
                current_len += sentence_len;
            }
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(self.make_chunk(&current_chunk, start_pos, current_len));
        }

        log::info!("Created {} chunks", chunks.len());
        chunks
    }

    fn make_chunk(&self, content: &str, start_pos: usize, len: usize) -> DocumentChunk {
        DocumentChunk {
            id: Uuid::new_v4().to_string(),
            content: content.trim().to_string(),
            start_position: start_pos,
            end_position: start_pos + len,
            embedding: None,
        }
    }

    /// Sentence boundaries per UAX #29. Sentences longer than a whole chunk
    /// are cut into chunk-sized pieces so one run-on line cannot swallow the
    /// document.
    fn split_into_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();

        for sentence in text.unicode_sentences() {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            if sentence.chars().count() <= self.chunk_size {
                sentences.push(sentence.to_string());
                continue;
            }

            let chars: Vec<char> = sentence.chars().collect();
            for piece in chars.chunks(self.chunk_size) {
                let piece: String = piece.iter().collect();
                let piece = piece.trim();
                if !piece.is_empty() {
                    sentences.push(piece.to_string());
                }
            }
        }

        sentences
    }
}

/// Collapses whitespace runs and replaces symbols outside the usual prose
/// punctuation set with spaces.
pub fn clean_text(text: &str) -> String {
    let re_whitespace = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    let re_special = SPECIAL_RE
        .get_or_init(|| Regex::new(r"[^\w\s.,!?;:()\-\[\]{}]").expect("valid symbol regex"));

    let cleaned = re_special.replace_all(text, " ");
    let cleaned = re_whitespace.replace_all(&cleaned, " ");

    cleaned.trim().to_string()
}
