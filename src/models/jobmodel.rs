use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_state", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Current,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Pending moves to Approved or Rejected, anything can be reset to
    /// Pending. Approved and Rejected never flip directly.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        match (self, next) {
            (_, ApplicationStatus::Pending) => true,
            (ApplicationStatus::Pending, _) => true,
            (current, next) => *current == next,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub provider_email: String,
    pub job_title: String,
    pub job_type: JobType,
    pub categories: String,
    pub skills_required: Vec<String>,
    pub experience_level: Option<String>,
    pub budget_range: String,
    pub budget_value: f64,
    pub location: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub job_date: NaiveDate,
    pub apply_by: NaiveDate,
    pub description: String,
    pub contact_person_name: String,
    pub contact_person_phone: String,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_email: String,
    pub applicant_key: String,
    pub applicant_name: String,
    pub contact_number: String,
    pub cover_letter: String,
    pub resume_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_data: Option<String>,
    pub status: ApplicationStatus,
    pub rating: Option<i16>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitised field set written when a job is created or updated.
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub job_title: String,
    pub job_type: JobType,
    pub categories: String,
    pub skills_required: Vec<String>,
    pub experience_level: Option<String>,
    pub budget_range: String,
    pub budget_value: f64,
    pub location: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub job_date: NaiveDate,
    pub apply_by: NaiveDate,
    pub description: String,
    pub contact_person_name: String,
    pub contact_person_phone: String,
}

impl From<&Job> for JobDraft {
    fn from(job: &Job) -> Self {
        JobDraft {
            job_title: job.job_title.clone(),
            job_type: job.job_type,
            categories: job.categories.clone(),
            skills_required: job.skills_required.clone(),
            experience_level: job.experience_level.clone(),
            budget_range: job.budget_range.clone(),
            budget_value: job.budget_value,
            location: job.location.clone(),
            pincode: job.pincode.clone(),
            latitude: job.latitude,
            longitude: job.longitude,
            job_date: job.job_date,
            apply_by: job.apply_by,
            description: job.description.clone(),
            contact_person_name: job.contact_person_name.clone(),
            contact_person_phone: job.contact_person_phone.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applicant_email: String,
    pub applicant_key: String,
    pub applicant_name: String,
    pub contact_number: String,
    pub cover_letter: String,
    pub resume_name: Option<String>,
    pub resume_data: Option<String>,
}

/// An application joined with the job it targets, as the seeker sees it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppliedJob {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_type: JobType,
    pub location: String,
    pub budget_range: String,
    pub job_date: NaiveDate,
    pub job_state: JobState,
    pub status: ApplicationStatus,
    pub rating: Option<i16>,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_decision() {
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Approved));
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Rejected));
    }

    #[test]
    fn any_status_resets_to_pending() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ] {
            assert!(status.can_transition_to(ApplicationStatus::Pending));
        }
    }

    #[test]
    fn decisions_do_not_flip_without_reset() {
        assert!(!ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Rejected.can_transition_to(ApplicationStatus::Approved));
        assert!(ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Approved));
    }

    #[test]
    fn job_type_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&JobType::PartTime).unwrap();
        assert_eq!(json, "\"Part-time\"");
        let parsed: JobType = serde_json::from_str("\"Full-time\"").unwrap();
        assert_eq!(parsed, JobType::FullTime);
    }
}
