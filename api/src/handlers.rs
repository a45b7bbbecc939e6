use crate::error::ApiError;
use crate::query_payload::{QueryPayload, QueryResponse};
use crate::routes::AppState;
use crate::storage::UploadStore;
use crate::upload_response::UploadResponse;
use crate::utils::{text_preview, PREVIEW_CHARS};
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

const NO_FILE: &str = "No file uploaded";
const TOO_LARGE: &str = "Uploaded file is too large";
const NOT_PDF: &str = "Only PDF files are allowed";
const EMPTY_TEXT: &str = "Failed to extract text from PDF";
const UPLOAD_FAILED: &str = "Failed to process the file";
const MISSING_QUERY_FIELDS: &str = "File path and question are required.";
const QUERY_FAILED: &str = "Failed to process the query. Please try again later.";

/// POST /upload
///
/// Takes the multipart field `file`, stores it, and returns a preview of the
/// extracted text. The extension is checked before anything reaches the disk.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        log::warn!("Upload is not multipart: {}", rejection.body_text());
        ApiError::bad_request(NO_FILE)
    })?;
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Malformed multipart upload: {}", e);
                return Err(multipart_error(e.status()));
            }
        };

        if field.name() != Some("file") {
            continue;
        }
        // A plain form value named `file` is not a file upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field.bytes().await.map_err(|e| {
            log::warn!("Failed to read upload of {}: {}", filename, e);
            multipart_error(e.status())
        })?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request(NO_FILE))?;

    if !UploadStore::is_pdf(&filename) {
        log::warn!("Rejected non-PDF upload: {}", filename);
        return Err(ApiError::bad_request(NOT_PDF));
    }

    let stored = state.store.store(&bytes).await.map_err(|e| {
        log::error!("Error storing {}: {}", filename, e);
        ApiError::internal(UPLOAD_FAILED)
    })?;

    let text = match state.extractor.extract_text(&stored.path).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error processing PDF {}: {:#}", stored.path.display(), e);
            state.store.discard(&stored).await;
            return Err(ApiError::internal(UPLOAD_FAILED));
        }
    };

    if text.is_empty() {
        log::warn!("No text extracted from {}", stored.path.display());
        state.store.discard(&stored).await;
        return Err(ApiError::internal(EMPTY_TEXT));
    }

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully".to_string(),
        file_path: stored.public_path,
        text_extracted: text_preview(&text, PREVIEW_CHARS),
    }))
}

fn multipart_error(status: StatusCode) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request(TOO_LARGE)
    } else {
        ApiError::bad_request(NO_FILE)
    }
}

/// POST /query
///
/// The answer from the query collaborator is passed through untouched.
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryPayload>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            log::warn!("Unreadable query body: {}", rejection.body_text());
            QueryPayload::default()
        }
    };

    let (file_path, question) = payload
        .required_fields()
        .ok_or_else(|| ApiError::bad_request(MISSING_QUERY_FIELDS))?;

    let answer = state
        .query_processor
        .process_query(&file_path, &question)
        .await
        .map_err(|e| {
            log::error!("Error processing query against {}: {:#}", file_path, e);
            ApiError::internal(QUERY_FAILED)
        })?;

    Ok(Json(QueryResponse { answer }))
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdf-query-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
