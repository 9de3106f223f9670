//! External job search. SerpAPI's Google Jobs engine is the only production source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::models::job::RawJob;

const SERPAPI_URL: &str = "https://serpapi.com/search";

#[derive(Debug, Error)]
pub enum SourceError {
    /// Missing or rejected credentials.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Failed to fetch jobs: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self, query: &str, location: &str) -> Result<Vec<RawJob>, SourceError>;

    /// Full listing document for a single job id.
    async fn fetch_details(&self, job_id: &str) -> Result<Value, SourceError>;
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: Option<String>,
    country: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: Option<String>, country: String) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            country,
            base_url: SERPAPI_URL.to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key.as_deref().ok_or_else(|| {
            SourceError::Unavailable(
                "SERPAPI_KEY not configured. Get an API key from https://serpapi.com and set it in .env"
                    .to_string(),
            )
        })
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("SerpAPI returned {status}: {body}");
            return Err(status_error(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Upstream(e.to_string()))?;
        check_body(body)
    }
}

#[async_trait]
impl JobSource for SerpApiClient {
    async fn fetch(&self, query: &str, location: &str) -> Result<Vec<RawJob>, SourceError> {
        let api_key = self.api_key()?;
        info!("Fetching jobs for: \"{query}\" in {location}");

        let body = self
            .get(&[
                ("engine", "google_jobs"),
                ("q", query),
                ("location", location),
                ("api_key", api_key),
                ("hl", "en"),
                ("gl", self.country.as_str()),
            ])
            .await?;

        let jobs = jobs_results(body);
        info!("Found {} jobs", jobs.len());
        Ok(jobs)
    }

    async fn fetch_details(&self, job_id: &str) -> Result<Value, SourceError> {
        let api_key = self.api_key()?;
        self.get(&[
            ("engine", "google_jobs_listing"),
            ("q", job_id),
            ("api_key", api_key),
        ])
        .await
    }
}

fn status_error(status: StatusCode, body: &str) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SourceError::Unavailable("Invalid SerpAPI key. Please check SERPAPI_KEY".to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(
            "SerpAPI rate limit exceeded. Please wait or upgrade your plan".to_string(),
        ),
        _ => SourceError::Upstream(format!("status {status}: {body}")),
    }
}

/// A 200 response can still carry an `error` field.
fn check_body(body: Value) -> Result<Value, SourceError> {
    match body.get("error").and_then(Value::as_str) {
        Some(message) => Err(SourceError::Upstream(message.to_string())),
        None => Ok(body),
    }
}

fn jobs_results(mut body: Value) -> Vec<RawJob> {
    match body.get_mut("jobs_results").map(Value::take) {
        Some(Value::Array(items)) => items.into_iter().map(RawJob::from).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Serves a fixed result set and records the last query.
    #[derive(Default)]
    pub struct FakeJobSource {
        pub results: Vec<Value>,
        pub failure: Option<fn() -> SourceError>,
        pub last_query: Mutex<Option<(String, String)>>,
    }

    impl FakeJobSource {
        pub fn with_results(results: Vec<Value>) -> Self {
            Self {
                results,
                ..Self::default()
            }
        }

        pub fn failing(failure: fn() -> SourceError) -> Self {
            Self {
                failure: Some(failure),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl JobSource for FakeJobSource {
        async fn fetch(&self, query: &str, location: &str) -> Result<Vec<RawJob>, SourceError> {
            *self.last_query.lock().unwrap() = Some((query.to_string(), location.to_string()));
            match self.failure {
                Some(failure) => Err(failure()),
                None => Ok(self.results.iter().cloned().map(RawJob::from).collect()),
            }
        }

        async fn fetch_details(&self, job_id: &str) -> Result<Value, SourceError> {
            if let Some(failure) = self.failure {
                return Err(failure());
            }
            self.results
                .iter()
                .find(|r| r.get("job_id").and_then(Value::as_str) == Some(job_id))
                .cloned()
                .ok_or_else(|| SourceError::Upstream(format!("no listing for {job_id}")))
        }
    }
}
