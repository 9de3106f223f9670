//! CV improvement suggestions derived from a single job posting.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::cv::skills::gap_vocabulary;
use crate::models::job::JobPosting;

const MAX_SKILL_ITEMS: usize = 5;
const MAX_KEYWORD_ITEMS: usize = 5;
const KEYWORD_STOPWORDS: &[&str] = &["about", "their", "which", "where", "would", "should", "could"];

static LONG_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]{5,}").expect("valid regex"));
static YEARS_REQUIRED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\+?\s*years?").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Skills,
    Keywords,
    Experience,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSuggestions {
    pub suggestions: Vec<Suggestion>,
    pub match_score: f64,
    pub has_improvements: bool,
}

/// Skills, keyword and experience gaps between the résumé and `job`.
pub fn generate_suggestions(resume_text: &str, job: &JobPosting, match_score: f64) -> CvSuggestions {
    let resume_lower = resume_text.to_lowercase();
    let description = job.description.to_lowercase();
    let title = job.title.to_lowercase();

    let mut suggestions = Vec::new();

    let missing_skills = missing_skills(&resume_lower, &title, &description);
    if !missing_skills.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Skills,
            title: "Add Missing Skills".to_string(),
            description: "These skills are mentioned in the job description but not in your CV"
                .to_string(),
            items: missing_skills,
        });
    }

    let missing_keywords = missing_keywords(&resume_lower, &description);
    if !missing_keywords.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Keywords,
            title: "Include Relevant Keywords".to_string(),
            description: "Adding these keywords can improve your match score".to_string(),
            items: missing_keywords,
        });
    }

    if let Some(years) = required_years(&description) {
        if !resume_lower.contains("year") {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Experience,
                title: "Highlight Experience".to_string(),
                description: "The job requires specific years of experience".to_string(),
                items: vec![format!("Mention your {years}+ years of experience")],
            });
        }
    }

    CvSuggestions {
        has_improvements: !suggestions.is_empty(),
        suggestions,
        match_score,
    }
}

/// Vocabulary terms the job mentions that the résumé doesn't.
fn missing_skills(resume_lower: &str, title: &str, description: &str) -> Vec<String> {
    gap_vocabulary()
        .filter(|skill| {
            (description.contains(skill) || title.contains(skill)) && !resume_lower.contains(skill)
        })
        .take(MAX_SKILL_ITEMS)
        .map(str::to_string)
        .collect()
}

/// Most frequent long description words absent from the résumé; ties keep first-seen order.
fn missing_keywords(resume_lower: &str, description: &str) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for word in LONG_WORD.find_iter(description).map(|m| m.as_str()) {
        if KEYWORD_STOPWORDS.contains(&word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order
        .into_iter()
        .filter(|word| !resume_lower.contains(word))
        .map(|word| (word, counts[word]))
        .collect();
    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(MAX_KEYWORD_ITEMS)
        .map(|(word, _)| word.to_string())
        .collect()
}

fn required_years(description: &str) -> Option<String> {
    YEARS_REQUIRED
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn job(title: &str, description: &str) -> JobPosting {
        JobPosting {
            id: "job_0".to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Colombo".to_string(),
            description: description.to_string(),
            apply_link: String::new(),
            provider: "LinkedIn".to_string(),
            posted_at: None,
            posted_at_raw: None,
            schedule: None,
            salary: None,
            thumbnail: None,
            raw: Value::Null,
        }
    }

    const RESUME: &str =
        "5 years experience with JavaScript, React, Node.js, MongoDB, Express and REST APIs";

    #[test]
    fn test_missing_aws_is_a_skills_gap() {
        let result = generate_suggestions(
            RESUME,
            &job(
                "React Developer",
                "Looking for a React developer with Node.js and AWS experience",
            ),
            0.39,
        );
        let skills = result
            .suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Skills)
            .expect("skills suggestion");
        assert_eq!(skills.items, vec!["aws"]);
        assert!(result.has_improvements);
        assert_eq!(result.match_score, 0.39);
    }

    #[test]
    fn test_skill_gaps_capped_at_five() {
        let result = generate_suggestions(
            "I write documentation and review pull requests for the team.",
            &job(
                "Engineer",
                "python docker kubernetes azure graphql typescript redis",
            ),
            0.1,
        );
        let skills = &result.suggestions[0];
        assert_eq!(skills.kind, SuggestionKind::Skills);
        assert_eq!(skills.items.len(), MAX_SKILL_ITEMS);
        assert_eq!(skills.items[0], "python");
    }

    #[test]
    fn test_title_only_skill_counts_as_gap() {
        let result = generate_suggestions(RESUME, &job("Kotlin Engineer", "Mobile role"), 0.0);
        assert_eq!(result.suggestions[0].items, vec!["kotlin"]);
    }

    #[test]
    fn test_keyword_gap_ranked_by_frequency_then_first_seen() {
        let description = "terraform ansible terraform pulumi ansible terraform helm charts";
        let keywords = missing_keywords("nothing relevant here", description);
        assert_eq!(keywords, vec!["terraform", "ansible", "pulumi", "charts"]);
    }

    #[test]
    fn test_keyword_gap_skips_stopwords_and_known_words() {
        let keywords = missing_keywords(
            "experienced with kafka",
            "which kafka streams would scale streams",
        );
        assert_eq!(keywords, vec!["streams", "scale"]);
    }

    #[test]
    fn test_keyword_gap_words_are_ascii() {
        // "développement" splits at the accented letters
        let keywords = missing_keywords("", "développement logiciel");
        assert_eq!(keywords, vec!["veloppement", "logiciel"]);
    }

    #[test]
    fn test_keyword_gap_capped_at_five() {
        let keywords = missing_keywords(
            "",
            "alpha1 bravo2 charlie delta3 echo55 foxtrot golfer",
        );
        assert_eq!(keywords.len(), MAX_KEYWORD_ITEMS);
    }

    #[test]
    fn test_experience_gap_when_resume_has_no_years() {
        let result = generate_suggestions(
            "Rust developer building low latency trading engines and tooling",
            &job("Rust Developer", "We need 3+ years of Rust"),
            0.5,
        );
        let experience = result
            .suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Experience)
            .expect("experience suggestion");
        assert_eq!(experience.items, vec!["Mention your 3+ years of experience"]);
    }

    #[test]
    fn test_no_experience_gap_when_resume_mentions_years() {
        let result = generate_suggestions(RESUME, &job("Dev", "Need 3 years of React"), 0.5);
        assert!(result
            .suggestions
            .iter()
            .all(|s| s.kind != SuggestionKind::Experience));
    }

    #[test]
    fn test_no_improvements_for_identical_text() {
        let result = generate_suggestions(RESUME, &job("", RESUME), 1.0);
        assert!(result.suggestions.is_empty());
        assert!(!result.has_improvements);
    }

    #[test]
    fn test_serializes_type_field() {
        let suggestion = Suggestion {
            kind: SuggestionKind::Keywords,
            title: "t".into(),
            description: "d".into(),
            items: vec![],
        };
        let value = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(value["type"], "keywords");
    }
}
