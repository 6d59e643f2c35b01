use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{
        jobmodel::{Application, ApplicationStatus, Job, JobType},
        profilemodel::SeekerProfile,
    },
    utils::validation::{validate_contact_number, validate_not_blank, validate_phone_10, validate_skills},
};

pub const JOBS_PER_PAGE: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub status: String,
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = ((total.max(0) as u32) + limit - 1) / limit.max(1);
        Self {
            status: "success".to_string(),
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 150, message = "Job title is required"))]
    pub job_title: String,

    pub job_type: JobType,

    #[validate(length(min = 1, max = 255, message = "Category is required"))]
    pub categories: String,

    #[validate(custom = "validate_skills")]
    pub skills_required: Vec<String>,

    #[validate(length(max = 100))]
    pub experience_level: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Budget range is required"))]
    pub budget_range: String,

    #[validate(custom = "validate_not_blank")]
    pub location: String,

    #[validate(length(min = 4, max = 12, message = "Pincode is required"))]
    pub pincode: String,

    pub job_date: NaiveDate,

    pub apply_by: NaiveDate,

    #[validate(custom = "validate_not_blank")]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Contact person name is required"))]
    pub contact_person_name: String,

    #[validate(custom = "validate_phone_10")]
    pub contact_person_phone: String,
}

#[derive(Validate, Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobDto {
    #[validate(length(min = 1, max = 150))]
    pub job_title: Option<String>,
    pub job_type: Option<JobType>,
    #[validate(length(min = 1, max = 255))]
    pub categories: Option<String>,
    #[validate(custom = "validate_skills")]
    pub skills_required: Option<Vec<String>>,
    #[validate(length(max = 100))]
    pub experience_level: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub budget_range: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub location: Option<String>,
    #[validate(length(min = 4, max = 12))]
    pub pincode: Option<String>,
    pub job_date: Option<NaiveDate>,
    pub apply_by: Option<NaiveDate>,
    #[validate(custom = "validate_not_blank")]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub contact_person_name: Option<String>,
    #[validate(custom = "validate_phone_10")]
    pub contact_person_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub job_type: Option<JobType>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    #[default]
    Straight,
    Road,
}

#[derive(Debug, Deserialize)]
pub struct SearchJobsQuery {
    pub skill: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub distance: DistanceMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobWithDistance {
    #[serde(flatten)]
    pub job: Job,
    pub distance_km: Option<f64>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ApplyJobDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,

    #[validate(custom = "validate_not_blank")]
    pub cover_letter: String,

    #[validate(custom = "validate_contact_number")]
    pub contact_number: String,

    /// `data:<mime>;base64,<payload>`
    pub resume: Option<String>,

    #[validate(length(max = 255))]
    pub resume_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusDto {
    pub status: ApplicationStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RateApplicationDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationsQuery {
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantView {
    #[serde(flatten)]
    pub application: Application,
    pub applicant_profile: Option<SeekerProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobWithApplications {
    #[serde(flatten)]
    pub job: Job,
    pub applications: Vec<ApplicantView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequestDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub budget: f64,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RecordActivityDto {
    pub job_id: Uuid,
    #[validate(range(min = 1, message = "Time spent must be positive"))]
    pub time_spent: i64,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ContactDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardDto {
    Provider {
        current_jobs: i64,
        completed_jobs: i64,
        pending_applications: i64,
    },
    Seeker {
        profile_complete: bool,
        pending: i64,
        approved: i64,
        rejected: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_body() -> serde_json::Value {
        json!({
            "job_title": "Electrician",
            "job_type": "Part-time",
            "categories": "Electrical",
            "skills_required": ["Wiring"],
            "budget_range": "1,000 - 1,500",
            "location": "Baner, Pune",
            "pincode": "411045",
            "job_date": "2026-11-20",
            "apply_by": "2026-11-10",
            "description": "Rewire a 2BHK flat",
            "contact_person_name": "Meera",
            "contact_person_phone": "9876543210",
        })
    }

    #[test]
    fn create_job_validates() {
        let dto: CreateJobDto = serde_json::from_value(job_body()).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.job_type, JobType::PartTime);
    }

    #[test]
    fn create_job_rejects_bad_contact_phone() {
        let mut body = job_body();
        body["contact_person_phone"] = json!("12345");
        let dto: CreateJobDto = serde_json::from_value(body).unwrap();
        assert!(dto.validate().unwrap_err().field_errors().contains_key("contact_person_phone"));
    }

    #[test]
    fn rating_range_is_enforced() {
        assert!(RateApplicationDto { rating: 0 }.validate().is_err());
        assert!(RateApplicationDto { rating: 6 }.validate().is_err());
        assert!(RateApplicationDto { rating: 5 }.validate().is_ok());
    }

    #[test]
    fn search_query_defaults() {
        let query: SearchJobsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.sort, SortOrder::Newest);
        assert_eq!(query.distance, DistanceMode::Straight);
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 13, 1, 6);
        assert_eq!(page.total_pages, 3);
    }
}
