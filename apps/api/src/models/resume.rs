use chrono::{DateTime, Utc};
use serde::Serialize;

/// A cleaned résumé held in the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub text: String,
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    pub file_name: String,
}

impl ResumeDocument {
    pub const PREVIEW_CHARS: usize = 200;

    pub fn preview(&self) -> String {
        let head: String = self.text.chars().take(Self::PREVIEW_CHARS).collect();
        format!("{head}...")
    }

    pub fn length(&self) -> usize {
        self.text.chars().count()
    }
}
