use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "communication_method", rename_all = "snake_case")]
pub enum CommunicationMethod {
    Email,
    Phone,
    Message,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ProviderProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub organization_name: Option<String>,
    pub phone_number: String,
    pub professional_details: Option<String>,
    pub location: String,
    pub pincode: String,
    pub business_type: String,
    pub communication_method: CommunicationMethod,
    pub identity_verification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct SeekerProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub profile_picture: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub location: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub expected_pay_range: String,
    pub rating: Option<f64>,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProviderProfileDraft {
    pub full_name: String,
    pub organization_name: Option<String>,
    pub phone_number: String,
    pub professional_details: Option<String>,
    pub location: String,
    pub pincode: String,
    pub business_type: String,
    pub communication_method: CommunicationMethod,
    pub identity_verification: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SeekerProfileDraft {
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub location: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub expected_pay_range: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct SeekerActivity {
    pub seeker_id: Uuid,
    pub job_id: Uuid,
    /// Accumulated seconds spent on the job's detail view.
    pub time_spent: i64,
    pub updated_at: DateTime<Utc>,
}
