use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::profilemodel::{
        CommunicationMethod, ProviderProfile, ProviderProfileDraft, SeekerProfile,
    },
    utils::validation::{clean_text, validate_not_blank, validate_phone_10, validate_skills},
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfileDto {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(max = 255, message = "Organization name is too long"))]
    pub organization_name: Option<String>,

    #[validate(custom = "validate_phone_10")]
    pub phone_number: String,

    pub professional_details: Option<String>,

    #[validate(custom = "validate_not_blank")]
    pub location: String,

    #[validate(length(min = 4, max = 12, message = "Pincode is required"))]
    pub pincode: String,

    #[validate(length(min = 1, max = 100, message = "Business type is required"))]
    pub business_type: String,

    pub communication_method: CommunicationMethod,

    pub identity_verification: Option<String>,
}

impl ProviderProfileDto {
    pub fn into_draft(self) -> ProviderProfileDraft {
        ProviderProfileDraft {
            full_name: self.full_name.trim().to_string(),
            organization_name: self.organization_name.map(|s| s.trim().to_string()),
            phone_number: self.phone_number,
            professional_details: self.professional_details.map(|s| clean_text(&s)),
            location: self.location.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            business_type: self.business_type.trim().to_string(),
            communication_method: self.communication_method,
            identity_verification: self.identity_verification,
        }
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SeekerProfileDto {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(custom = "validate_phone_10")]
    pub phone_number: String,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(custom = "validate_skills")]
    pub skills: Vec<String>,

    #[validate(range(min = 0, max = 60, message = "Experience must be between 0 and 60 years"))]
    pub experience_years: i32,

    #[validate(custom = "validate_not_blank")]
    pub location: String,

    #[validate(length(min = 4, max = 12, message = "Pincode is required"))]
    pub pincode: String,

    #[validate(length(min = 1, max = 100, message = "Expected pay range is required"))]
    pub expected_pay_range: String,
}

impl SeekerProfileDto {
    /// Trimmed skills with blanks dropped.
    pub fn clean_skills(&self) -> Vec<String> {
        self.skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
pub enum MyProfile {
    Provider(ProviderProfile),
    Seeker(SeekerProfile),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfilePictureResponse {
    pub profile_picture: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeker_profile_requires_a_skill() {
        let dto: SeekerProfileDto = serde_json::from_value(json!({
            "full_name": "Ravi",
            "phone_number": "9876543210",
            "skills": ["  "],
            "experience_years": 3,
            "location": "Andheri East, Mumbai",
            "pincode": "400069",
            "expected_pay_range": "1000-1500",
        }))
        .unwrap();

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("skills"));
    }

    #[test]
    fn provider_profile_accepts_communication_labels() {
        let dto: ProviderProfileDto = serde_json::from_value(json!({
            "full_name": "Meera",
            "phone_number": "9876543210",
            "location": "Kothrud, Pune",
            "pincode": "411038",
            "business_type": "Construction",
            "communication_method": "Phone",
        }))
        .unwrap();

        assert!(dto.validate().is_ok());
        assert_eq!(dto.into_draft().communication_method, CommunicationMethod::Phone);
    }

    #[test]
    fn blank_skills_are_dropped() {
        let dto: SeekerProfileDto = serde_json::from_value(json!({
            "full_name": "Ravi",
            "phone_number": "9876543210",
            "skills": [" Plumbing ", "", "Tiling"],
            "experience_years": 3,
            "location": "Andheri East, Mumbai",
            "pincode": "400069",
            "expected_pay_range": "1000-1500",
        }))
        .unwrap();

        assert_eq!(dto.clean_skills(), vec!["Plumbing", "Tiling"]);
    }
}
