// service/contact_service.rs
use serde::{Deserialize, Serialize};

use super::error::ServiceError;
use crate::{config::Config, dtos::jobdtos::ContactDto};

#[derive(Debug, Serialize)]
struct Web3FormsPayload<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    message: &'a str,
    subject: String,
}

#[derive(Debug, Deserialize)]
pub struct Web3FormsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

pub struct Web3FormsClient {
    http: reqwest::Client,
    url: String,
    access_key: String,
}

impl Web3FormsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.web3forms_url.clone(),
            access_key: config.web3forms_access_key.clone(),
        }
    }

    pub async fn submit(&self, contact: &ContactDto) -> Result<String, ServiceError> {
        if self.access_key.is_empty() {
            return Err(ServiceError::ExternalApi("WEB3FORMS_ACCESS_KEY is not set".to_string()));
        }

        let payload = Web3FormsPayload {
            access_key: &self.access_key,
            name: contact.name.trim(),
            email: contact.email.trim(),
            message: contact.message.trim(),
            subject: format!("HIRE.me contact from {}", contact.name.trim()),
        };

        let reply: Web3FormsReply = self
            .http
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Web3Forms request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Web3Forms response: {}", e)))?;

        reply_outcome(reply)
    }
}

pub fn reply_outcome(reply: Web3FormsReply) -> Result<String, ServiceError> {
    if reply.success {
        tracing::info!("Contact form relayed to Web3Forms");
        Ok(reply.message)
    } else {
        tracing::warn!("Web3Forms rejected submission: {}", reply.message);
        let message = if reply.message.is_empty() {
            "Contact form submission failed".to_string()
        } else {
            reply.message
        };
        Err(ServiceError::ExternalApi(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn failed_reply_maps_to_bad_gateway() {
        let reply: Web3FormsReply =
            serde_json::from_str(r#"{"success": false, "message": "Invalid access key"}"#).unwrap();
        let err = reply_outcome(reply).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("Invalid access key"));
    }

    #[test]
    fn successful_reply_passes_message_through() {
        let reply: Web3FormsReply =
            serde_json::from_str(r#"{"success": true, "message": "Email sent successfully!"}"#).unwrap();
        assert_eq!(reply_outcome(reply).unwrap(), "Email sent successfully!");
    }
}
