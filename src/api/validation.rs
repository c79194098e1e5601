use crate::api::errors::ApiError;
use std::path::Path;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 32;
const MIN_USERNAME_LEN: usize = 3;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let len_ok = (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username.chars().count());
    let chars_ok = username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));

    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Username must be 3-32 lowercase letters, digits, '.', '_' or '-'".to_string(),
        ))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_document_upload(
    filename: &str,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")));
    }

    let mime = content_type.trim().to_ascii_lowercase();
    if mime_allowed_for_extension(&mime, &extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "MIME type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    match extension {
        "pdf" => matches!(mime, "application/pdf" | "application/x-pdf"),
        _ => false,
    }
}

/// Keeps the basename and replaces anything outside [A-Za-z0-9._-].
pub(crate) fn sanitized_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("paper.pdf");

    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}
