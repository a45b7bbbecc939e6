//! HTTP front end for uploading a PDF and asking questions about it.
//!
//! Text extraction and question answering live in `pdf_rag`; this crate
//! validates requests, stores the upload and maps failures to JSON errors.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query_payload;
pub mod routes;
pub mod storage;
pub mod upload_response;
pub mod utils;

pub use collaborators::{PdfTextExtractor, QueryProcessor, TextExtractor};
pub use config::Config;
pub use error::{ApiError, ErrorResponse};
pub use query_payload::{QueryPayload, QueryResponse};
pub use routes::{app, AppState};
pub use storage::{StoredUpload, UploadNaming, UploadStore};
pub use upload_response::UploadResponse;
