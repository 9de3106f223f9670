//! CV text normalization and validation.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::cv::skills::{extract_experience_years, extract_skills};
use crate::models::resume::ResumeDocument;

/// Minimum CV length, in characters, before and after cleaning.
pub const MIN_CV_CHARS: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("CV text is too short. Please provide a more detailed CV.")]
    TooShort { length: usize },

    #[error("CV validation failed: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
// ASCII word characters only; anything else outside the punctuation set is dropped.
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s.,;:()\-+#@]").expect("valid regex"));

/// Collapses whitespace, strips disallowed characters and enforces the minimum length.
pub fn clean(raw: &str) -> Result<String, ValidationError> {
    let collapsed = WHITESPACE.replace_all(raw, " ");
    let cleaned = DISALLOWED.replace_all(collapsed.trim(), "").into_owned();

    let length = cleaned.chars().count();
    if length < MIN_CV_CHARS {
        return Err(ValidationError::TooShort { length });
    }
    Ok(cleaned)
}

/// Non-destructive check of the raw input.
pub fn validate(raw: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        errors.push("CV text is required".to_string());
    } else if trimmed.chars().count() < MIN_CV_CHARS {
        errors.push(format!(
            "CV is too short (minimum {MIN_CV_CHARS} characters)"
        ));
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Validates, cleans and tags raw CV text.
pub fn parse_resume(raw: &str, file_name: Option<&str>) -> Result<ResumeDocument, ValidationError> {
    let report = validate(raw);
    if !report.is_valid {
        return Err(ValidationError::Invalid(report.errors));
    }

    let text = clean(raw)?;
    let skills = extract_skills(&text);
    let experience_years = extract_experience_years(&text);

    Ok(ResumeDocument {
        text,
        skills,
        experience_years,
        uploaded_at: Utc::now(),
        file_name: file_name.unwrap_or("pasted_text").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CV: &str = "Senior engineer with 6 years experience in Python,   Django and AWS.\n\nLed a team of 4.";

    #[test]
    fn test_clean_collapses_whitespace() {
        let cleaned = clean(CV).unwrap();
        assert!(!cleaned.contains("  "));
        assert!(!cleaned.contains('\n'));
        assert!(cleaned.starts_with("Senior engineer"));
    }

    #[test]
    fn test_clean_strips_special_characters() {
        let raw = format!("{CV} Contact: me@example.com | C# & C++ ★ (remote)");
        let cleaned = clean(&raw).unwrap();
        assert!(cleaned.contains("me@example.com"));
        assert!(cleaned.contains("C#"));
        assert!(cleaned.contains("C++"));
        assert!(cleaned.contains("(remote)"));
        assert!(!cleaned.contains('|'));
        assert!(!cleaned.contains('&'));
        assert!(!cleaned.contains('★'));
    }

    #[test]
    fn test_clean_rejects_short_text() {
        for raw in ["", "   ", "too short", "★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★★ ab"] {
            assert!(
                matches!(clean(raw), Err(ValidationError::TooShort { .. })),
                "expected failure for {raw:?}"
            );
        }
    }

    #[test]
    fn test_clean_accepts_exactly_minimum() {
        let raw = "a".repeat(MIN_CV_CHARS);
        assert_eq!(clean(&raw).unwrap().len(), MIN_CV_CHARS);
    }

    #[test]
    fn test_validate_reports_missing_and_short() {
        let empty = validate("  ");
        assert!(!empty.is_valid);
        assert_eq!(empty.errors, vec!["CV text is required"]);

        let short = validate("hello");
        assert!(!short.is_valid);
        assert!(short.errors[0].contains("minimum 50"));

        assert!(validate(CV).is_valid);
    }

    #[test]
    fn test_parse_resume_populates_document() {
        let doc = parse_resume(CV, None).unwrap();
        assert_eq!(doc.file_name, "pasted_text");
        assert!(doc.skills.contains(&"python".to_string()));
        assert!(doc.skills.contains(&"aws".to_string()));
        assert_eq!(doc.experience_years, Some(6));
    }

    #[test]
    fn test_parse_resume_validation_message() {
        let err = parse_resume("short", Some("cv.txt")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CV validation failed: CV is too short (minimum 50 characters)"
        );
    }
}
