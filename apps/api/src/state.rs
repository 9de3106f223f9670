use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::cover_letter::CoverLetterService;
use crate::jobs::source::JobSource;
use crate::matching::strategy::SimilarityEngine;
use crate::session::Session;
use crate::snapshot::SnapshotStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// External search. SerpAPI in production, a fake in tests.
    pub job_source: Arc<dyn JobSource>,
    pub similarity: Arc<SimilarityEngine>,
    pub cover_letters: Arc<CoverLetterService>,
    /// Stored résumé and last search. Guards are never held across provider calls.
    pub session: Arc<RwLock<Session>>,
    pub snapshots: SnapshotStore,
}

impl AppState {
    pub fn new(
        config: Config,
        job_source: Arc<dyn JobSource>,
        similarity: Arc<SimilarityEngine>,
        cover_letters: Arc<CoverLetterService>,
    ) -> Self {
        let snapshots = SnapshotStore::new(config.data_dir.clone());
        Self {
            config,
            job_source,
            similarity,
            cover_letters,
            session: Arc::new(RwLock::new(Session::default())),
            snapshots,
        }
    }

    /// Résumé text from the request if given, else the stored one.
    pub async fn resume_text(&self, provided: Option<&str>) -> Option<String> {
        match provided.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => Some(text.to_string()),
            None => self.session.read().await.resume_text().map(str::to_string),
        }
    }
}
