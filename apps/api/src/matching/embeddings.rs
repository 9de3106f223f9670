//! Embedding providers and the cached embedder the similarity engine uses.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::{OpenAiClient, EMBEDDING_MODEL};
use crate::matching::cache::{CacheConfig, EmbeddingCache};
use crate::matching::similarity::SimilarityError;

/// Input budget sent to the provider, in characters.
pub const EMBED_CHAR_BUDGET: usize = 8000;

/// Anything that turns text into a vector. Swappable for tests.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SimilarityError>;
}

pub struct OpenAiEmbeddings(pub OpenAiClient);

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn model(&self) -> &str {
        EMBEDDING_MODEL
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SimilarityError> {
        self.0
            .embed(text)
            .await
            .map_err(|e| SimilarityError::Provider(e.to_string()))
    }
}

/// Provider fronted by the embedding cache, with input truncation.
pub struct CachedEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
}

impl CachedEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache: &CacheConfig) -> Self {
        Self {
            provider,
            cache: EmbeddingCache::new(cache),
        }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, SimilarityError> {
        let key = self.cache.key_for(text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let input = truncate_chars(text, EMBED_CHAR_BUDGET);
        let vector = self.provider.embed(input).await?;
        debug!("Embedded {} chars into {} dimensions", input.len(), vector.len());

        Ok(self.cache.insert(key, Arc::new(vector)))
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::FakeEmbeddings;
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_cached_embedder_hits_cache_on_repeat() {
        let provider = Arc::new(FakeEmbeddings::new(vec![1.0, 0.0]));
        let embedder = CachedEmbedder::new(provider.clone(), &CacheConfig::default());

        embedder.embed("Rust developer with Tokio").await.unwrap();
        embedder.embed("Rust developer with Tokio").await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(embedder.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_cached_embedder_truncates_input() {
        let provider = Arc::new(FakeEmbeddings::new(vec![1.0]));
        let embedder = CachedEmbedder::new(provider.clone(), &CacheConfig::default());

        let long = "a".repeat(EMBED_CHAR_BUDGET + 500);
        embedder.embed(&long).await.unwrap();

        assert_eq!(
            provider.last_input_len.load(Ordering::SeqCst),
            EMBED_CHAR_BUDGET
        );
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let provider = Arc::new(FakeEmbeddings::failing_on("broken", vec![1.0]));
        let embedder = CachedEmbedder::new(provider.clone(), &CacheConfig::default());

        assert!(embedder.embed("broken text").await.is_err());
        assert!(embedder.cache().is_empty());
    }
}
