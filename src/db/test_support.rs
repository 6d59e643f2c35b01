// db/test_support.rs
use chrono::{Duration, Utc};

use super::{db::DBClient, jobdb::JobExt, profiledb::ProfileExt, userdb::UserExt};
use crate::{
    models::{
        jobmodel::{Job, JobDraft, JobType, NewApplication},
        profilemodel::SeekerProfileDraft,
        usermodel::{User, UserRole},
    },
    utils::keys::sanitize_email,
};

pub async fn seed_user(db: &DBClient, email: &str, role: UserRole) -> User {
    let email_key = sanitize_email(email);
    db.save_user("Test User", email, email_key.as_str(), "9876543210", role, "hash")
        .await
        .unwrap()
}

pub async fn seed_seeker(db: &DBClient, email: &str) -> User {
    let user = seed_user(db, email, UserRole::Seeker).await;
    let draft = SeekerProfileDraft {
        full_name: "Ravi Kumar".to_string(),
        phone_number: "9876543210".to_string(),
        date_of_birth: None,
        skills: vec!["Plumbing".to_string()],
        experience_years: 3,
        location: "Andheri East, Mumbai".to_string(),
        pincode: "400069".to_string(),
        latitude: None,
        longitude: None,
        expected_pay_range: "1000-2000".to_string(),
    };
    db.upsert_seeker_profile(user.id, &user.email, &draft).await.unwrap();
    user
}

pub fn job_draft(title: &str) -> JobDraft {
    let today = Utc::now().date_naive();
    JobDraft {
        job_title: title.to_string(),
        job_type: JobType::Contract,
        categories: "Repairs".to_string(),
        skills_required: vec!["Plumbing".to_string()],
        experience_level: None,
        budget_range: "1500".to_string(),
        budget_value: 1500.0,
        location: "Andheri East, Mumbai".to_string(),
        pincode: "400069".to_string(),
        latitude: None,
        longitude: None,
        job_date: today + Duration::days(10),
        apply_by: today + Duration::days(5),
        description: "Fix a kitchen leak".to_string(),
        contact_person_name: "Meera".to_string(),
        contact_person_phone: "9876543210".to_string(),
    }
}

pub async fn seed_job(db: &DBClient, provider: &User, title: &str) -> Job {
    db.create_job(provider.id, &provider.email, &job_draft(title))
        .await
        .unwrap()
}

pub fn new_application(applicant: &User) -> NewApplication {
    NewApplication {
        applicant_email: applicant.email.clone(),
        applicant_key: sanitize_email(&applicant.email),
        applicant_name: applicant.name.clone(),
        contact_number: "9876543210".to_string(),
        cover_letter: "I have fixed many leaks".to_string(),
        resume_name: None,
        resume_data: None,
    }
}
