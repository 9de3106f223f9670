use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cv::extract::extract_upload;
use crate::cv::normalizer::parse_resume;
use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::snapshot::CV_SNAPSHOT;
use crate::state::AppState;

const FILE_FIELD: &str = "cvFile";
const TEXT_FIELD: &str = "cvText";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvTextBody {
    #[serde(default)]
    pub cv_text: Option<String>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// `POST /api/cv` body: JSON, urlencoded form, or multipart with a file and/or text field.
#[derive(Debug, Default)]
pub struct CvUpload {
    pub text: Option<String>,
    pub file: Option<UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for CvUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let body = if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(body) = Form::<CvTextBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            body
        } else {
            let Json(body) = Json::<CvTextBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            body
        };

        Ok(CvUpload {
            text: body.cv_text,
            file: None,
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<CvUpload, AppError> {
    let mut upload = CvUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(FILE_FIELD) => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                upload.file = Some(UploadedFile {
                    name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some(TEXT_FIELD) => {
                upload.text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    Ok(upload)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub skills: Vec<String>,
    pub length: usize,
    pub experience_years: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCvResponse {
    pub skills: Vec<String>,
    pub length: usize,
    pub experience_years: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    pub file_name: String,
    pub preview: String,
}

/// POST /api/cv
pub async fn handle_upload(
    State(state): State<AppState>,
    upload: CvUpload,
) -> Result<Json<ApiResponse<UploadResponse>>, AppError> {
    let (text, file_name) = match upload.file {
        Some(file) => {
            let text = extract_upload(&file.name, file.content_type.as_deref(), file.bytes).await?;
            (Some(text), Some(file.name))
        }
        None => (upload.text, None),
    };

    let text = text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        AppError::Validation(
            "CV text is required. Please paste your CV or upload a PDF/TXT file.".to_string(),
        )
    })?;

    let resume = parse_resume(&text, file_name.as_deref())?;
    info!(
        "Stored CV {} ({} chars, {} skills)",
        resume.file_name,
        resume.length(),
        resume.skills.len()
    );

    state.snapshots.write(CV_SNAPSHOT, &resume).await;

    let message = match &file_name {
        Some(name) => format!("CV file \"{name}\" uploaded successfully"),
        None => "CV uploaded successfully".to_string(),
    };
    let response = UploadResponse {
        skills: resume.skills.clone(),
        length: resume.length(),
        experience_years: resume.experience_years,
        uploaded_at: resume.uploaded_at,
        file_name: resume.file_name.clone(),
    };
    state.session.write().await.store_resume(resume);

    Ok(Json(ApiResponse::with_message(message, response)))
}

/// GET /api/cv
pub async fn handle_get(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StoredCvResponse>>, AppError> {
    let session = state.session.read().await;
    let resume = session
        .resume
        .as_ref()
        .ok_or_else(|| AppError::NotFound("No CV uploaded yet".to_string()))?;

    Ok(Json(ApiResponse::ok(StoredCvResponse {
        skills: resume.skills.clone(),
        length: resume.length(),
        experience_years: resume.experience_years,
        uploaded_at: resume.uploaded_at,
        file_name: resume.file_name.clone(),
        preview: resume.preview(),
    })))
}

/// DELETE /api/cv
pub async fn handle_delete(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.session.write().await.clear_resume();
    Json(ApiResponse::message("CV cleared successfully"))
}
