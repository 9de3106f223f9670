use axum::{extract::State, Json};
use serde::Deserialize;

use crate::cover_letter::{CoverLetter, CoverLetterJob};
use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    #[serde(default)]
    pub job: Option<CoverLetterJob>,
    #[serde(default)]
    pub cv_text: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// POST /api/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<ApiResponse<CoverLetter>>, AppError> {
    let job = req
        .job
        .ok_or_else(|| AppError::Validation("Job details are required".to_string()))?;

    let resume = state
        .resume_text(req.cv_text.as_deref())
        .await
        .ok_or_else(|| {
            AppError::Validation(
                "CV is required. Either upload via POST /api/cv or include cvText in request"
                    .to_string(),
            )
        })?;

    let user_name = req.user_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let letter = state
        .cover_letters
        .generate(&resume, &job, user_name)
        .await?;

    Ok(Json(ApiResponse::ok(letter)))
}
