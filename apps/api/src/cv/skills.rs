//! Skill vocabulary and experience extraction.
//!
//! Matching is plain case-insensitive substring search: no stemming and no word
//! boundaries, so "java" is found inside "javascript". Callers rely on that.

use once_cell::sync::Lazy;
use regex::Regex;

/// Terms recognised on résumés.
pub const SKILL_VOCABULARY: &[&str] = &[
    "javascript",
    "python",
    "java",
    "php",
    "laravel",
    "react",
    "vue",
    "angular",
    "node.js",
    "express",
    "mongodb",
    "mysql",
    "postgresql",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "git",
    "agile",
    "scrum",
    "rest api",
    "graphql",
    "typescript",
    "html",
    "css",
    "sass",
    "webpack",
    "ci/cd",
    "jenkins",
    "machine learning",
    "ai",
    "data science",
    "sql",
    "nosql",
    "redis",
];

/// Extra terms only checked when looking for gaps against a job posting.
const GAP_ONLY_TERMS: &[&str] = &[
    "flutter",
    "react native",
    "swift",
    "kotlin",
    "c++",
    "c#",
    ".net",
];

/// Résumé vocabulary followed by the mobile/systems terms used for gap analysis.
pub fn gap_vocabulary() -> impl Iterator<Item = &'static str> {
    SKILL_VOCABULARY.iter().chain(GAP_ONLY_TERMS.iter()).copied()
}

/// Vocabulary terms present in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| lower.contains(*skill))
        .map(|skill| skill.to_string())
        .collect()
}

static EXPERIENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+)\+?\s*years?\s+(?:of\s+)?experience",
        r"(?i)experience[:\s]+(\d+)\+?\s*years?",
        r"(?i)(\d+)\+?\s*yrs?\s+exp",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience pattern is valid"))
    .collect()
});

/// Years of experience stated in the text, trying each pattern in order.
pub fn extract_experience_years(text: &str) -> Option<u32> {
    EXPERIENCE_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    })
}
