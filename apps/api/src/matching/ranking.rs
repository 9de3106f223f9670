//! Batch scoring: similarity + title boost, sorted best-first.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;

use crate::matching::insights::{match_insights, MatchInsights};
use crate::matching::similarity::SimilarityError;
use crate::matching::strategy::{ScoringBackend, SimilarityEngine};
use crate::matching::suggestions::{generate_suggestions, CvSuggestions};
use crate::models::job::JobPosting;

/// Upper bound of the title boost.
pub const MAX_TITLE_BOOST: f64 = 0.2;
const MIN_TITLE_TOKEN_CHARS: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub job: JobPosting,
    pub match_score: f64,
    pub match_percentage: u32,
    pub scoring_backend: ScoringBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_suggestions: Option<CvSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_insights: Option<MatchInsights>,
}

impl MatchResult {
    pub fn new(job: JobPosting, base_similarity: f64, backend: ScoringBackend, resume_text: &str) -> Self {
        let boost = title_boost(resume_text, &job.title);
        let match_score = compose_score(base_similarity, boost);
        MatchResult {
            job,
            match_score,
            match_percentage: match_percentage(match_score),
            scoring_backend: backend,
            cv_suggestions: None,
            match_insights: None,
        }
    }

    /// Attaches improvement suggestions and keyword insights for this job.
    pub fn with_cv_report(mut self, resume_text: &str) -> Self {
        self.cv_suggestions = Some(generate_suggestions(resume_text, &self.job, self.match_score));
        self.match_insights = Some(match_insights(resume_text, &self.job.description));
        self
    }
}

/// Scores every job against the résumé concurrently, then sorts by score descending.
/// Ties keep input order.
pub async fn match_all(
    engine: &Arc<SimilarityEngine>,
    resume_text: &str,
    jobs: Vec<JobPosting>,
) -> Result<Vec<MatchResult>, SimilarityError> {
    if resume_text.is_empty() || jobs.is_empty() {
        return Ok(Vec::new());
    }

    info!(
        "Matching {} jobs with CV using {} matching",
        jobs.len(),
        if engine.uses_embeddings() { "embedding" } else { "simple keyword" }
    );

    let profile = Arc::new(engine.prepare(resume_text).await);
    let total = jobs.len();

    let mut join_set: JoinSet<(usize, JobPosting, Result<_, SimilarityError>)> = JoinSet::new();
    for (index, job) in jobs.into_iter().enumerate() {
        let engine = Arc::clone(engine);
        let profile = Arc::clone(&profile);
        join_set.spawn(async move {
            let similarity = engine.score(&profile, &job.id, &job.description).await;
            (index, job, similarity)
        });
    }

    let mut slots: Vec<Option<MatchResult>> = vec![None; total];
    while let Some(joined) = join_set.join_next().await {
        let (index, job, similarity) =
            joined.map_err(|e| SimilarityError::Aborted(e.to_string()))?;
        let similarity = similarity?;
        slots[index] = Some(MatchResult::new(
            job,
            similarity.value,
            similarity.backend,
            resume_text,
        ));
    }

    let mut results: Vec<MatchResult> = slots.into_iter().flatten().collect();
    sort_by_score(&mut results);

    info!(
        "Matching complete. Top score: {}",
        results.first().map(|r| r.match_score).unwrap_or(0.0)
    );
    Ok(results)
}

/// Stable descending sort on `match_score`.
pub fn sort_by_score(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
}

/// Keeps results scoring at least `threshold`, preserving order.
pub fn filter_by_min_score(results: Vec<MatchResult>, threshold: f64) -> Vec<MatchResult> {
    results
        .into_iter()
        .filter(|r| r.match_score >= threshold)
        .collect()
}

/// Up to 0.2, proportional to the share of title tokens (longer than 3 chars)
/// found anywhere in the résumé.
pub fn title_boost(resume_text: &str, title: &str) -> f64 {
    let resume_lower = resume_text.to_lowercase();
    let title_lower = title.to_lowercase();
    let tokens: Vec<&str> = title_lower.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let matched = tokens
        .iter()
        .filter(|t| t.chars().count() >= MIN_TITLE_TOKEN_CHARS && resume_lower.contains(*t))
        .count();

    (MAX_TITLE_BOOST * matched as f64 / tokens.len() as f64).min(MAX_TITLE_BOOST)
}

/// Clamps to [0, 1] and rounds to two decimals.
pub fn compose_score(base_similarity: f64, boost: f64) -> f64 {
    round2((base_similarity + boost).clamp(0.0, 1.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn match_percentage(score: f64) -> u32 {
    (score * 100.0).round() as u32
}
