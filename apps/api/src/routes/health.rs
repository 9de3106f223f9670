use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / and GET /health
/// Service status, enabled backends and the endpoint index.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Job Matcher API is running",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "matching": if state.similarity.uses_embeddings() { "embedding" } else { "keyword" },
        "embeddingCacheEntries": state.similarity.cache().map(|c| c.len()).unwrap_or(0),
        "endpoints": {
            "cv": {
                "POST /api/cv": "Upload CV text or a PDF/TXT file",
                "GET /api/cv": "Get stored CV info",
                "DELETE /api/cv": "Clear stored CV"
            },
            "jobs": {
                "GET /api/search?query=...&location=...&timeFilter=...&keywords=...": "Search for jobs",
                "GET /api/jobs": "Get cached jobs",
                "GET /api/jobs/:id": "Get full listing details for a job",
                "POST /api/match?minScore=...": "Match jobs with CV",
                "POST /api/search-and-match?minScore=...": "Search and match in one request"
            },
            "coverLetters": {
                "POST /api/cover-letter": "Generate a cover letter for a job"
            }
        }
    }))
}
