use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::normalizer::{deduplicate, filter_by_keywords, filter_by_recency, normalize};
use crate::matching::ranking::{filter_by_min_score, match_all, MatchResult};
use crate::models::job::{JobPosting, RecencyFilter};
use crate::response::ApiResponse;
use crate::session::SearchSnapshot;
use crate::snapshot::JOBS_SNAPSHOT;
use crate::state::AppState;

/// `/api/match` keeps everything unless asked otherwise.
const MATCH_DEFAULT_MIN_SCORE: f64 = 0.0;
const SEARCH_AND_MATCH_DEFAULT_MIN_SCORE: f64 = 0.2;

const MISSING_QUERY: &str = "Search query is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub time_filter: Option<String>,
    /// Comma-separated; keeps jobs mentioning any of them.
    pub keywords: Option<String>,
}

impl SearchParams {
    fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub location: String,
    pub time_filter: RecencyFilter,
    pub total_jobs: usize,
    pub filtered_jobs: usize,
    pub count: usize,
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
pub struct CachedJobsResponse {
    pub count: usize,
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
pub struct JobDetailsResponse {
    pub job: Option<JobPosting>,
    pub details: Value,
}

/// `minScore` is lenient: anything unparseable means the endpoint default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinScoreParams {
    pub min_score: Option<String>,
}

impl MinScoreParams {
    fn resolve(&self, default: f64) -> f64 {
        self.min_score
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default)]
    pub jobs: Option<Value>,
    #[serde(default)]
    pub cv_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub total_jobs: usize,
    pub matched_jobs: usize,
    pub min_score: f64,
    pub jobs: Vec<MatchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAndMatchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cv_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAndMatchResponse {
    pub query: String,
    pub location: String,
    pub total_jobs: usize,
    pub matched_jobs: usize,
    pub min_score: f64,
    pub jobs: Vec<MatchResult>,
}

fn required_query(query: Option<&str>) -> Result<String, AppError> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(MISSING_QUERY.to_string()))
}

fn location_or_default(state: &AppState, location: Option<&str>) -> String {
    location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(&state.config.default_location)
        .to_string()
}

/// Fetch, normalize and deduplicate. Returns the deduplicated list.
async fn search_jobs(state: &AppState, query: &str, location: &str) -> Result<Vec<JobPosting>, AppError> {
    let raw = state.job_source.fetch(query, location).await?;
    Ok(deduplicate(normalize(raw, &state.config.default_location)))
}

/// GET /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResponse>>, AppError> {
    let query = required_query(params.query.as_deref())?;
    let location = location_or_default(&state, params.location.as_deref());
    let time_filter = RecencyFilter::from_param(params.time_filter.as_deref());
    info!("Searching for: \"{query}\" in {location} (filter: {time_filter:?})");

    let jobs = search_jobs(&state, &query, &location).await?;
    let total_jobs = jobs.len();
    let filtered = filter_by_keywords(filter_by_recency(jobs, time_filter), &params.keyword_list());

    let snapshot = SearchSnapshot::new(&query, &location, time_filter, filtered.clone());
    state.snapshots.write(JOBS_SNAPSHOT, &snapshot).await;
    state.session.write().await.last_search = Some(snapshot);

    Ok(Json(ApiResponse::ok(SearchResponse {
        query,
        location,
        time_filter,
        total_jobs,
        filtered_jobs: filtered.len(),
        count: filtered.len(),
        jobs: filtered,
    })))
}

/// GET /api/jobs
pub async fn handle_cached_jobs(
    State(state): State<AppState>,
) -> Json<ApiResponse<CachedJobsResponse>> {
    let jobs = state.session.read().await.cached_jobs().to_vec();
    Json(ApiResponse::ok(CachedJobsResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/jobs/:id
pub async fn handle_job_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<JobDetailsResponse>>, AppError> {
    let job = state.session.read().await.find_job(&id).cloned();
    let details = state.job_source.fetch_details(&id).await?;
    Ok(Json(ApiResponse::ok(JobDetailsResponse { job, details })))
}

/// POST /api/match
pub async fn handle_match(
    State(state): State<AppState>,
    Query(params): Query<MinScoreParams>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<ApiResponse<MatchResponse>>, AppError> {
    let jobs: Vec<JobPosting> = match req.jobs {
        Some(value @ Value::Array(_)) => serde_json::from_value(value)
            .map_err(|e| AppError::Validation(format!("Invalid job record: {e}")))?,
        _ => return Err(AppError::Validation("Jobs array is required".to_string())),
    };

    let resume = state
        .resume_text(req.cv_text.as_deref())
        .await
        .ok_or_else(|| {
            AppError::Validation("Please upload a CV first using POST /api/cv".to_string())
        })?;

    let total_jobs = jobs.len();
    let min_score = params.resolve(MATCH_DEFAULT_MIN_SCORE);

    let matched = match_all(&state.similarity, &resume, jobs).await?;
    let jobs: Vec<MatchResult> = filter_by_min_score(matched, min_score)
        .into_iter()
        .map(|result| result.with_cv_report(&resume))
        .collect();

    Ok(Json(ApiResponse::ok(MatchResponse {
        total_jobs,
        matched_jobs: jobs.len(),
        min_score,
        jobs,
    })))
}

/// POST /api/search-and-match
pub async fn handle_search_and_match(
    State(state): State<AppState>,
    Query(params): Query<MinScoreParams>,
    Json(req): Json<SearchAndMatchRequest>,
) -> Result<Json<ApiResponse<SearchAndMatchResponse>>, AppError> {
    let query = required_query(req.query.as_deref())?;
    let location = location_or_default(&state, req.location.as_deref());

    let resume = state
        .resume_text(req.cv_text.as_deref())
        .await
        .ok_or_else(|| {
            AppError::Validation(
                "CV is required. Either upload via POST /api/cv or include cvText in request"
                    .to_string(),
            )
        })?;

    let jobs = search_jobs(&state, &query, &location).await?;
    let total_jobs = jobs.len();
    let min_score = params.resolve(SEARCH_AND_MATCH_DEFAULT_MIN_SCORE);

    let matched = match_all(&state.similarity, &resume, jobs).await?;
    let jobs: Vec<MatchResult> = filter_by_min_score(matched, min_score)
        .into_iter()
        .map(|result| result.with_cv_report(&resume))
        .collect();

    Ok(Json(ApiResponse::ok(SearchAndMatchResponse {
        query,
        location,
        total_jobs,
        matched_jobs: jobs.len(),
        min_score,
        jobs,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_score_resolution() {
        let params = |v: Option<&str>| MinScoreParams {
            min_score: v.map(str::to_string),
        };
        assert_eq!(params(None).resolve(0.2), 0.2);
        assert_eq!(params(Some("abc")).resolve(0.2), 0.2);
        assert_eq!(params(Some("NaN")).resolve(0.2), 0.2);
        assert_eq!(params(Some("0")).resolve(0.2), 0.0);
        assert_eq!(params(Some(" 0.45 ")).resolve(0.0), 0.45);
    }

    #[test]
    fn test_keyword_list_parsing() {
        let params = SearchParams {
            query: Some("dev".into()),
            location: None,
            time_filter: None,
            keywords: Some(" laravel, ,PHP ".into()),
        };
        assert_eq!(params.keyword_list(), vec!["laravel", "PHP"]);
    }

    #[test]
    fn test_required_query() {
        assert!(required_query(None).is_err());
        assert!(required_query(Some("   ")).is_err());
        assert_eq!(required_query(Some(" rust ")).unwrap(), "rust");
    }
}
