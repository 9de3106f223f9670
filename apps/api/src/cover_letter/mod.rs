//! Cover letter generation with a deterministic template fallback.

pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cover_letter::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, TEMPLATE_LETTER,
};
use crate::cv::skills::extract_skills;
use crate::llm_client::{ChatParams, LlmError, OpenAiClient};

/// Résumé characters included in the prompt.
const RESUME_PROMPT_CHARS: usize = 1500;
const COVER_LETTER_PARAMS: ChatParams = ChatParams {
    temperature: 0.7,
    max_tokens: 800,
};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.chat(system, prompt, COVER_LETTER_PARAMS).await
    }
}

/// The subset of a posting (or match result) a letter needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub matched_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterSource {
    Ai,
    Template,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    pub cover_letter: String,
    pub generated_with: LetterSource,
}

pub struct CoverLetterService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CoverLetterService {
    /// `None` means every letter comes from the template.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        resume_text: &str,
        job: &CoverLetterJob,
        user_name: Option<&str>,
    ) -> Result<CoverLetter, LlmError> {
        let skills = matched_skills(resume_text, job);

        let Some(generator) = &self.generator else {
            info!("No text generator configured, using template cover letter");
            return Ok(template_letter(job, &skills, user_name));
        };

        info!("Generating cover letter for {} at {}", job.title, job.company);
        let prompt = build_prompt(resume_text, job, &skills, user_name);

        match generator.generate(COVER_LETTER_SYSTEM, &prompt).await {
            Ok(text) => Ok(CoverLetter {
                cover_letter: text,
                generated_with: LetterSource::Ai,
            }),
            Err(e) if e.is_quota_exhausted() => {
                warn!("Cover letter quota exhausted, using template: {e}");
                Ok(template_letter(job, &skills, user_name))
            }
            Err(e) => Err(e),
        }
    }
}

/// Supplied skills, else résumé skills that the job also mentions.
fn matched_skills(resume_text: &str, job: &CoverLetterJob) -> Vec<String> {
    if let Some(skills) = job.matched_skills.as_ref().filter(|s| !s.is_empty()) {
        return skills.clone();
    }

    let job_skills = extract_skills(&format!("{} {}", job.title, job.description));
    extract_skills(resume_text)
        .into_iter()
        .filter(|skill| job_skills.contains(skill))
        .collect()
}

fn build_prompt(
    resume_text: &str,
    job: &CoverLetterJob,
    skills: &[String],
    user_name: Option<&str>,
) -> String {
    let match_score = job
        .match_score
        .filter(|s| *s > 0.0)
        .map(|s| format!("{}%", (s * 100.0).round()))
        .unwrap_or_else(|| "high".to_string());
    let skills = if skills.is_empty() {
        "relevant skills".to_string()
    } else {
        skills.join(", ")
    };
    let resume: String = resume_text.chars().take(RESUME_PROMPT_CHARS).collect();

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{title}", &job.title)
        .replace("{company}", &job.company)
        .replace(
            "{location}",
            job.location
                .as_deref()
                .filter(|l| !l.is_empty())
                .unwrap_or("Not specified"),
        )
        .replace("{match_score}", &match_score)
        .replace("{matched_skills}", &skills)
        .replace("{candidate}", user_name.unwrap_or("the applicant"))
        .replace("{resume}", &resume)
}

fn template_letter(job: &CoverLetterJob, skills: &[String], user_name: Option<&str>) -> CoverLetter {
    let skills = if skills.is_empty() {
        "relevant technical skills".to_string()
    } else {
        skills.join(", ")
    };

    CoverLetter {
        cover_letter: TEMPLATE_LETTER
            .replace("{title}", &job.title)
            .replace("{company}", &job.company)
            .replace("{matched_skills}", &skills)
            .replace("{signature}", user_name.unwrap_or("[Your Name]")),
        generated_with: LetterSource::Template,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Returns a canned reply or a canned error, recording the last prompt.
    pub struct FakeGenerator {
        pub reply: Result<String, (u16, String)>,
        pub last_prompt: Mutex<Option<String>>,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        pub fn failing(status: u16, message: &str) -> Self {
            Self {
                reply: Err((status, message.to_string())),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err((status, message)) => Err(LlmError::Api {
                    status: *status,
                    message: message.clone(),
                }),
            }
        }
    }
}
