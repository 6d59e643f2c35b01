use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::usermodel::{User, UserRole},
    utils::validation::{validate_password_strength, validate_phone_10},
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    pub role: UserRole,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(custom = "validate_phone_10")]
    pub phone: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        custom = "validate_password_strength"
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct GoogleLoginDto {
    #[validate(length(min = 1, message = "Google id token is required"))]
    pub id_token: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequestDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequestDto {
    #[validate(length(min = 1, message = "Token is required."))]
    pub token: String,

    #[validate(
        length(min = 1, message = "New password is required."),
        custom = "validate_password_strength"
    )]
    pub new_password: String,

    #[validate(
        length(min = 1, message = "New password confirm is required."),
        must_match(other = "new_password", message = "New passwords do not match")
    )]
    pub new_password_confirm: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_key: String,
    pub phone: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            email_key: user.email_key.to_owned(),
            phone: user.phone.to_owned(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
    pub role: String,
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register_body(password: &str, confirm: &str) -> RegisterUserDto {
        serde_json::from_value(json!({
            "role": "seeker",
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9876543210",
            "password": password,
            "passwordConfirm": confirm,
        }))
        .unwrap()
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register_body("Hire@2024x", "Hire@2024x").validate().is_ok());
    }

    #[test]
    fn weak_password_is_rejected() {
        let errors = register_body("password", "password").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let errors = register_body("Hire@2024x", "Hire@2024y").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("passwordConfirm"));
    }

    #[test]
    fn unknown_role_does_not_deserialize() {
        let body = json!({
            "role": "admin",
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9876543210",
            "password": "Hire@2024x",
            "passwordConfirm": "Hire@2024x",
        });
        assert!(serde_json::from_value::<RegisterUserDto>(body).is_err());
    }
}
