pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::cover_letter::handlers as cover_letter;
use crate::cv::extract::MAX_UPLOAD_BYTES;
use crate::cv::handlers as cv;
use crate::errors::AppError;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Endpoint {} not found", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        // Résumé
        .route(
            "/api/cv",
            post(cv::handle_upload)
                .get(cv::handle_get)
                .delete(cv::handle_delete),
        )
        // Jobs
        .route("/api/search", get(jobs::handle_search))
        .route("/api/jobs", get(jobs::handle_cached_jobs))
        .route("/api/jobs/:id", get(jobs::handle_job_details))
        .route("/api/match", post(jobs::handle_match))
        .route("/api/search-and-match", post(jobs::handle_search_and_match))
        // Cover letters (second path kept for the web client)
        .route("/api/cover-letter", post(cover_letter::handle_cover_letter))
        .route(
            "/api/generate-cover-letter",
            post(cover_letter::handle_cover_letter),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
