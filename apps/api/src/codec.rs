//! Résumé transport codec.
//!
//! Résumés travel inside JSON as base64 text. Browsers upload them as data URLs
//! (`data:<mime>;base64,<payload>`), so the prefix is stripped once at upload time and
//! only the bare payload is stored. Downloads send the stored text back unchanged,
//! marked as base64 transport, with the headers a browser needs to save the file.

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("résumé content is empty")]
    Empty,

    #[error("résumé content is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Drops a `data:<mime>;base64,` prefix if present. Only the text after the first comma is kept.
pub fn strip_data_url(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(',') {
        Some((_, payload)) => payload,
        None => text,
    }
}

#[cfg(test)]
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(BASE64.decode(text)?)
}

/// Turns client-supplied résumé text into the canonical stored form: prefix stripped,
/// whitespace removed, payload verified to be base64.
pub fn normalize_upload(text: &str) -> Result<String, CodecError> {
    let payload: String = strip_data_url(text.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(CodecError::Empty);
    }
    decode(&payload)?;
    Ok(payload)
}

/// A downloadable résumé as stored: base64 text plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub file_name: String,
    pub content: String,
    pub mime_type: Option<String>,
}

impl ResumeFile {
    /// Returns `None` unless both a file name and content are present.
    pub fn from_parts(
        file_name: Option<String>,
        content: Option<String>,
        mime_type: Option<String>,
    ) -> Option<Self> {
        let file_name = file_name.filter(|s| !s.is_empty())?;
        let content = content.filter(|s| !s.is_empty())?;
        Some(ResumeFile {
            file_name,
            content,
            mime_type: mime_type.filter(|s| !s.is_empty()),
        })
    }

    pub fn content_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// `filename` carries an ASCII-safe fallback. When that fallback had to alter the name,
    /// `filename*` (RFC 6266) carries the original, UTF-8 and percent-encoded.
    pub fn content_disposition(&self) -> String {
        let fallback = sanitize_file_name(&self.file_name);
        if fallback == self.file_name {
            format!("attachment; filename=\"{fallback}\"")
        } else {
            format!(
                "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
                urlencoding::encode(&self.file_name)
            )
        }
    }
}

impl IntoResponse for ResumeFile {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(self.content_type())
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
        let disposition = HeaderValue::from_str(&self.content_disposition())
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (
                    HeaderName::from_static("content-transfer-encoding"),
                    HeaderValue::from_static("base64"),
                ),
            ],
            self.content,
        )
            .into_response()
    }
}

/// Makes a file name safe to place inside a quoted header parameter.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() || !c.is_ascii() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}
