use crate::collaborators::{QueryProcessor, TextExtractor};
use crate::handlers::{health_check, query, upload};
use crate::storage::{UploadStore, PUBLIC_PREFIX};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

pub struct AppState {
    pub store: UploadStore,
    pub extractor: Arc<dyn TextExtractor>,
    pub query_processor: Arc<dyn QueryProcessor>,
    pub max_upload_bytes: usize,
}

/// Build the application router with all routes configured
pub fn app(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.store.dir());
    let middleware = ServiceBuilder::new()
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(middleware::from_fn(hide_dotfiles));

    Router::new()
        .route("/upload", post(upload))
        .route("/query", post(query))
        .route("/health", get(health_check))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(middleware)
        .with_state(state)
}

/// 404s any request whose path has a dot-prefixed segment, so the staging
/// area inside the upload directory is never served.
async fn hide_dotfiles(request: Request<Body>, next: Next) -> Response {
    let hidden = request.uri().path().split('/').any(|segment| {
        segment.starts_with('.') || segment.to_ascii_lowercase().starts_with("%2e")
    });

    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
