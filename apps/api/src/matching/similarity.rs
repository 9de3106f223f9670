use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Vectors must have the same length ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("No résumé embedding available for this batch")]
    ResumeNotEmbedded,

    #[error("Scoring task aborted: {0}")]
    Aborted(String),
}

impl SimilarityError {
    /// Whether the next strategy in the fallback chain may be tried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimilarityError::Provider(_) | SimilarityError::ResumeNotEmbedded
        )
    }
}

// ASCII word characters: "résumé" splits into "r" and "sum".
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid regex"));

/// Lower-cased word set of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lower-cased words of `text` in order, duplicates kept.
pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Dot product over the product of norms. Zero-norm input scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Jaccard index of the two word sets; 0 when both are empty.
pub fn keyword_similarity(a: &str, b: &str) -> f64 {
    let left = word_set(a);
    let right = word_set(b);

    let intersection = left.intersection(&right).count();
    let union = left.len() + right.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
