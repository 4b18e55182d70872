//! Axum route handlers for the Applications API.

use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        OriginalUri, Path, State,
    },
    http::{Method, StatusCode},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;

use crate::codec::{self, ResumeFile};
use crate::errors::AppError;
use crate::models::{Application, ApplicationSummary, NewApplication, ResumeUpload};
use crate::routes::parse_json;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Raw creation payload as the public form submits it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub name: Option<String>,
    pub contact_info: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub year: Option<String>,
    pub experience: Option<String>,
    pub resume_file_name: Option<String>,
    pub resume_file_content: Option<String>,
    pub resume_file_type: Option<String>,
}

impl CreateApplicationRequest {
    /// Checks required fields and normalizes the résumé upload.
    pub fn validate(self) -> Result<NewApplication, AppError> {
        let name = non_empty(self.name);
        let department = non_empty(self.department);

        let missing: Vec<&str> = [("name", &name), ("department", &department)]
            .into_iter()
            .filter(|(_, v)| v.is_none())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let resume = match (
            non_empty(self.resume_file_name),
            non_empty(self.resume_file_content),
        ) {
            (None, None) => None,
            (Some(file_name), Some(content)) => {
                let content = codec::normalize_upload(&content)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                Some(ResumeUpload {
                    file_name,
                    content,
                    mime_type: non_empty(self.resume_file_type),
                })
            }
            // The form can submit the name before the file reader has produced content.
            (file_name, _) => {
                warn!(
                    "Dropping incomplete resume upload (file name present: {})",
                    file_name.is_some()
                );
                None
            }
        };

        Ok(NewApplication {
            name: name.unwrap_or_default(),
            contact_info: self.contact_info.unwrap_or_default(),
            department: department.unwrap_or_default(),
            branch: self.branch.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
            resume,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Numeric path ids only; anything else (including segments that are not valid UTF-8) is a
/// routing miss, not a bad request.
fn parse_id(
    raw: Result<Path<String>, PathRejection>,
    method: &Method,
    uri: &OriginalUri,
) -> Result<i64, AppError> {
    let miss = || AppError::route_not_found(method, uri.0.path());
    let Ok(Path(raw)) = raw else {
        return Err(miss());
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(miss());
    }
    raw.parse::<i64>().map_err(|_| miss())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /applications
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<ApplicationSummary>> {
    Json(state.storage.list_applications().await)
}

/// GET /applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    method: Method,
    uri: OriginalUri,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Application>, AppError> {
    let id = parse_id(raw_id, &method, &uri)?;
    state
        .storage
        .get_application(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

/// GET /applications/:id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    method: Method,
    uri: OriginalUri,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<ResumeFile, AppError> {
    let id = parse_id(raw_id, &method, &uri)?;
    state
        .storage
        .get_application_resume(id)
        .await
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// POST /applications
pub async fn handle_create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let request: CreateApplicationRequest = parse_json(&body?)?;
    let new = request.validate()?;
    let application = state.storage.create_application(new).await?;
    tracing::info!(
        "Application {} received for {}",
        application.id,
        application.department
    );
    Ok((StatusCode::CREATED, Json(application)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, department: Option<&str>) -> CreateApplicationRequest {
        CreateApplicationRequest {
            name: name.map(String::from),
            department: department.map(String::from),
            ..CreateApplicationRequest::default()
        }
    }

    fn validation_message(result: Result<NewApplication, AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        let msg = validation_message(request(None, None).validate());
        assert_eq!(msg, "Missing required fields: name, department");
        let msg = validation_message(request(Some("Ada"), Some("  ")).validate());
        assert_eq!(msg, "Missing required fields: department");
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let new = request(Some("Ada"), Some("Engineering")).validate().unwrap();
        assert_eq!(new.contact_info, "");
        assert_eq!(new.experience, "");
        assert!(new.resume.is_none());
    }

    #[test]
    fn test_resume_is_normalized() {
        let payload = codec::encode(b"%PDF-1.7");
        let req = CreateApplicationRequest {
            resume_file_name: Some("cv.pdf".to_string()),
            resume_file_content: Some(format!("data:application/pdf;base64,{payload}")),
            resume_file_type: Some("application/pdf".to_string()),
            ..request(Some("Ada"), Some("Engineering"))
        };
        let resume = req.validate().unwrap().resume.unwrap();
        assert_eq!(resume.content, payload);
        assert_eq!(resume.mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_incomplete_resume_is_dropped_not_rejected() {
        let name_only = CreateApplicationRequest {
            resume_file_name: Some("cv.pdf".to_string()),
            ..request(Some("Ada"), Some("Engineering"))
        };
        let new = name_only.validate().unwrap();
        assert_eq!(new.name, "Ada");
        assert!(new.resume.is_none());

        let content_only = CreateApplicationRequest {
            resume_file_name: Some("  ".to_string()),
            resume_file_content: Some(codec::encode(b"%PDF")),
            ..request(Some("Ada"), Some("Engineering"))
        };
        assert!(content_only.validate().unwrap().resume.is_none());
    }

    #[test]
    fn test_invalid_resume_payload_is_rejected() {
        let req = CreateApplicationRequest {
            resume_file_name: Some("cv.pdf".to_string()),
            resume_file_content: Some("%%% not base64".to_string()),
            ..request(Some("Ada"), Some("Engineering"))
        };
        let msg = validation_message(req.validate());
        assert!(msg.contains("base64"));
    }
}
