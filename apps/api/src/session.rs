use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::job::{JobPosting, RecencyFilter};
use crate::models::resume::ResumeDocument;

/// Result of the most recent search, also written to `jobs.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub query: String,
    pub location: String,
    pub time_filter: RecencyFilter,
    pub fetched_at: DateTime<Utc>,
    pub count: usize,
    pub jobs: Vec<JobPosting>,
}

impl SearchSnapshot {
    pub fn new(query: &str, location: &str, time_filter: RecencyFilter, jobs: Vec<JobPosting>) -> Self {
        Self {
            query: query.to_string(),
            location: location.to_string(),
            time_filter,
            fetched_at: Utc::now(),
            count: jobs.len(),
            jobs,
        }
    }
}

/// Single-tenant, in-memory state shared by the HTTP handlers.
#[derive(Debug, Default)]
pub struct Session {
    pub resume: Option<ResumeDocument>,
    pub last_search: Option<SearchSnapshot>,
}

impl Session {
    /// Replaces any stored résumé.
    pub fn store_resume(&mut self, resume: ResumeDocument) {
        self.resume = Some(resume);
    }

    pub fn clear_resume(&mut self) -> Option<ResumeDocument> {
        self.resume.take()
    }

    pub fn resume_text(&self) -> Option<&str> {
        self.resume.as_ref().map(|r| r.text.as_str())
    }

    pub fn cached_jobs(&self) -> &[JobPosting] {
        self.last_search
            .as_ref()
            .map(|s| s.jobs.as_slice())
            .unwrap_or_default()
    }

    pub fn find_job(&self, id: &str) -> Option<&JobPosting> {
        self.cached_jobs().iter().find(|job| job.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::normalizer::parse_resume;

    const CV: &str = "Backend engineer with 4 years experience building Rust and Go services on AWS.";

    #[test]
    fn test_resume_replaced_and_cleared() {
        let mut session = Session::default();
        assert!(session.resume_text().is_none());

        session.store_resume(parse_resume(CV, None).unwrap());
        session.store_resume(parse_resume(&format!("{CV} Also Kafka."), Some("cv.txt")).unwrap());
        assert!(session.resume_text().unwrap().ends_with("Also Kafka."));

        let cleared = session.clear_resume().unwrap();
        assert_eq!(cleared.file_name, "cv.txt");
        assert!(session.resume.is_none());
    }

    #[test]
    fn test_cached_jobs_empty_without_search() {
        let session = Session::default();
        assert!(session.cached_jobs().is_empty());
        assert!(session.find_job("job_0").is_none());
    }
}
