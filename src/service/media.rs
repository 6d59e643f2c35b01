// service/media.rs
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::error::ServiceError;
use crate::config::Config;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

pub fn validate_image(content_type: &str, size: usize) -> Result<(), ServiceError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ServiceError::Validation(
            "Profile picture must be a JPEG, PNG, GIF or WEBP image".to_string(),
        ));
    }
    if size == 0 || size > MAX_IMAGE_BYTES {
        return Err(ServiceError::Validation(
            "Profile picture must be smaller than 5 MB".to_string(),
        ));
    }
    Ok(())
}

/// Unsigned uploads to a Cloudinary preset.
pub struct CloudinaryClient {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: config.cloudinary_upload_url.clone(),
            upload_preset: config.cloudinary_upload_preset.clone(),
        }
    }

    /// Returns the hosted image's `secure_url`.
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ServiceError> {
        if self.upload_url.is_empty() {
            return Err(ServiceError::ExternalApi("CLOUDINARY_UPLOAD_URL is not set".to_string()));
        }

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Cloudinary upload failed: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Cloudinary response: {}", e)))?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("upload rejected");
            return Err(ServiceError::ExternalApi(format!("Cloudinary: {}", message)));
        }

        body["secure_url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::ExternalApi("Cloudinary response had no secure_url".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_image_types() {
        for content_type in ALLOWED_IMAGE_TYPES {
            assert!(validate_image(content_type, 1024).is_ok());
        }
    }

    #[test]
    fn rejects_other_types_and_oversized_files() {
        assert!(validate_image("application/pdf", 1024).is_err());
        assert!(validate_image("image/png", MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image("image/png", 0).is_err());
    }
}
