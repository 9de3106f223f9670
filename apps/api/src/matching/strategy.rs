//! Similarity strategies and the fallback chain that evaluates them.
//!
//! The engine holds an ordered chain. Each job is scored by the first strategy
//! that succeeds; recoverable failures move on to the next one. The keyword
//! strategy is always last and never fails, so a provider outage degrades a job
//! (or, when the résumé itself can't be embedded, the whole batch) to keyword
//! overlap instead of failing the request.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::matching::cache::{CacheConfig, EmbeddingCache};
use crate::matching::embeddings::{CachedEmbedder, EmbeddingProvider};
use crate::matching::similarity::{cosine_similarity, keyword_similarity, SimilarityError};

/// Which strategy produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringBackend {
    Embedding,
    Keyword,
}

/// Résumé prepared once per batch: its text plus the vector, if one could be computed.
#[derive(Debug, Clone)]
pub struct ResumeProfile {
    pub text: String,
    pub embedding: Option<Arc<Vec<f32>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub value: f64,
    pub backend: ScoringBackend,
}

#[async_trait]
pub trait SimilarityStrategy: Send + Sync {
    fn backend(&self) -> ScoringBackend;

    async fn similarity(
        &self,
        resume: &ResumeProfile,
        job_text: &str,
    ) -> Result<f64, SimilarityError>;
}

/// Jaccard overlap of word sets. No external dependency.
pub struct KeywordStrategy;

#[async_trait]
impl SimilarityStrategy for KeywordStrategy {
    fn backend(&self) -> ScoringBackend {
        ScoringBackend::Keyword
    }

    async fn similarity(
        &self,
        resume: &ResumeProfile,
        job_text: &str,
    ) -> Result<f64, SimilarityError> {
        Ok(keyword_similarity(&resume.text, job_text))
    }
}

/// Cosine similarity of provider embeddings.
pub struct EmbeddingStrategy {
    embedder: Arc<CachedEmbedder>,
}

#[async_trait]
impl SimilarityStrategy for EmbeddingStrategy {
    fn backend(&self) -> ScoringBackend {
        ScoringBackend::Embedding
    }

    async fn similarity(
        &self,
        resume: &ResumeProfile,
        job_text: &str,
    ) -> Result<f64, SimilarityError> {
        let resume_vector = resume
            .embedding
            .as_ref()
            .ok_or(SimilarityError::ResumeNotEmbedded)?;
        let job_vector = self.embedder.embed(job_text).await?;
        cosine_similarity(resume_vector, &job_vector)
    }
}

pub struct SimilarityEngine {
    embedder: Option<Arc<CachedEmbedder>>,
    chain: Vec<Arc<dyn SimilarityStrategy>>,
}

impl SimilarityEngine {
    /// Embeddings first, keyword fallback. With no provider, or when simple matching
    /// is forced, the chain is keyword-only.
    pub fn new(
        provider: Option<Arc<dyn EmbeddingProvider>>,
        cache: &CacheConfig,
        use_simple_matching: bool,
    ) -> Self {
        let embedder = match provider {
            Some(p) if !use_simple_matching => Some(Arc::new(CachedEmbedder::new(p, cache))),
            _ => None,
        };

        let mut chain: Vec<Arc<dyn SimilarityStrategy>> = Vec::new();
        if let Some(embedder) = &embedder {
            chain.push(Arc::new(EmbeddingStrategy {
                embedder: Arc::clone(embedder),
            }));
        }
        chain.push(Arc::new(KeywordStrategy));

        info!(
            "Similarity engine: {}",
            match &embedder {
                Some(e) => format!("embeddings ({}) with keyword fallback", e.model()),
                None => "simple keyword matching".to_string(),
            }
        );

        Self { embedder, chain }
    }

    pub fn keyword_only() -> Self {
        Self::new(None, &CacheConfig::default(), true)
    }

    pub fn uses_embeddings(&self) -> bool {
        self.embedder.is_some()
    }

    pub fn cache(&self) -> Option<&EmbeddingCache> {
        self.embedder.as_deref().map(CachedEmbedder::cache)
    }

    /// Embeds the résumé once for the batch. On failure the profile has no vector
    /// and every job in the batch scores through the keyword strategy.
    pub async fn prepare(&self, resume_text: &str) -> ResumeProfile {
        let embedding = match &self.embedder {
            Some(embedder) => match embedder.embed(resume_text).await {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Failed to get CV embedding, falling back to keyword matching: {e}");
                    None
                }
            },
            None => None,
        };

        ResumeProfile {
            text: resume_text.to_string(),
            embedding,
        }
    }

    /// Scores one job through the chain.
    pub async fn score(
        &self,
        resume: &ResumeProfile,
        job_id: &str,
        job_text: &str,
    ) -> Result<Similarity, SimilarityError> {
        let mut last_error = None;

        for strategy in &self.chain {
            match strategy.similarity(resume, job_text).await {
                Ok(value) => {
                    return Ok(Similarity {
                        value,
                        backend: strategy.backend(),
                    })
                }
                Err(e) if e.is_recoverable() => {
                    if !matches!(e, SimilarityError::ResumeNotEmbedded) {
                        warn!("Failed to embed job {job_id}, using next strategy: {e}");
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(SimilarityError::ResumeNotEmbedded))
    }
}
