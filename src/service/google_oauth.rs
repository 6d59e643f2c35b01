// service/google_oauth.rs
use serde::{Deserialize, Deserializer};

use super::error::ServiceError;
use crate::config::Config;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    pub email: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub email_verified: bool,
    pub name: Option<String>,
}

// tokeninfo sends "true"/"false" as strings
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(value) => value.eq_ignore_ascii_case("true"),
    })
}

pub struct GoogleAuthService {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleAuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
        }
    }

    /// Verifies a Google ID token and returns its verified email.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleTokenInfo, ServiceError> {
        if self.client_id.is_empty() {
            return Err(ServiceError::ExternalApi("GOOGLE_CLIENT_ID is not set".to_string()));
        }

        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Google tokeninfo failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Validation("Invalid Google token".to_string()));
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Google tokeninfo body: {}", e)))?;

        check_token_info(info, &self.client_id)
    }
}

pub fn check_token_info(info: GoogleTokenInfo, client_id: &str) -> Result<GoogleTokenInfo, ServiceError> {
    if info.aud != client_id {
        return Err(ServiceError::Validation("Google token was issued for another client".to_string()));
    }
    if !info.email_verified {
        return Err(ServiceError::Validation("Google account email is not verified".to_string()));
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: &str) -> GoogleTokenInfo {
        serde_json::from_str(&format!(
            r#"{{"aud": "{}", "email": "asha@example.com", "email_verified": "{}", "name": "Asha"}}"#,
            aud, verified
        ))
        .unwrap()
    }

    #[test]
    fn accepts_matching_audience() {
        let checked = check_token_info(info("client-1", "true"), "client-1").unwrap();
        assert_eq!(checked.email, "asha@example.com");
    }

    #[test]
    fn rejects_foreign_audience_and_unverified_email() {
        assert!(check_token_info(info("client-2", "true"), "client-1").is_err());
        assert!(check_token_info(info("client-1", "false"), "client-1").is_err());
    }
}
