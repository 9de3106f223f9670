use std::collections::HashSet;

use serde::Serialize;

use crate::matching::similarity::{word_set, words};

const MAX_MATCHED_KEYWORDS: usize = 10;
const MIN_KEYWORD_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInsights {
    pub matched_keywords: Vec<String>,
    pub total_keywords: usize,
    pub match_rate: f64,
}

/// Description words shared with the résumé.
///
/// `match_rate` counts every matched occurrence against the description's word
/// count, so repeated keywords weigh more.
pub fn match_insights(resume_text: &str, job_description: &str) -> MatchInsights {
    let resume_words = word_set(resume_text);
    let job_words = words(job_description);

    let matched: Vec<&String> = job_words
        .iter()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS && resume_words.contains(*w))
        .collect();

    let mut seen = HashSet::new();
    let matched_keywords = matched
        .iter()
        .filter(|w| seen.insert(w.as_str()))
        .take(MAX_MATCHED_KEYWORDS)
        .map(|w| w.to_string())
        .collect();

    let total_keywords = job_words.iter().collect::<HashSet<_>>().len();
    let match_rate = if job_words.is_empty() {
        0.0
    } else {
        matched.len() as f64 / job_words.len() as f64
    };

    MatchInsights {
        matched_keywords,
        total_keywords,
        match_rate,
    }
}
