// service/job_service.rs
use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use uuid::Uuid;

use crate::{
    db::{
        applicationdb::ApplicationExt,
        cache::CacheHelper,
        db::{is_unique_violation, DBClient},
        jobdb::JobExt,
        profiledb::ProfileExt,
    },
    dtos::jobdtos::{
        ApplicantView, ApplyJobDto, CreateJobDto, DistanceMode, JobWithApplications,
        JobWithDistance, SearchJobsQuery, SortOrder, UpdateJobDto,
    },
    models::{
        jobmodel::{Application, ApplicationStatus, Job, JobDraft, JobState, NewApplication},
        usermodel::User,
    },
    service::{
        error::ServiceError,
        geocoding::{locate, GeoProvider},
    },
    utils::{
        geo::{haversine_km, round_to, Coordinates},
        keys::sanitize_email,
        parsing::parse_budget,
        validation::clean_text,
    },
};

pub const MAX_RESUME_BYTES: usize = 2 * 1024 * 1024;
const RESUME_TYPES: [&str; 2] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub struct JobService {
    db_client: Arc<DBClient>,
    geo: Arc<dyn GeoProvider>,
}

impl std::fmt::Debug for JobService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobService").field("db_client", &self.db_client).finish()
    }
}

impl JobService {
    pub fn new(db_client: Arc<DBClient>, geo: Arc<dyn GeoProvider>) -> Self {
        Self { db_client, geo }
    }

    pub async fn create_job(&self, provider: &User, dto: CreateJobDto) -> Result<Job, ServiceError> {
        check_dates(dto.job_date, dto.apply_by)?;

        let coordinates = locate(self.geo.as_ref(), &dto.location, &dto.pincode).await;
        let draft = JobDraft {
            job_title: clean_text(&dto.job_title),
            job_type: dto.job_type,
            categories: dto.categories.trim().to_string(),
            skills_required: clean_skills(&dto.skills_required),
            experience_level: dto.experience_level.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            budget_value: parse_budget(&dto.budget_range),
            budget_range: dto.budget_range.trim().to_string(),
            location: dto.location.trim().to_string(),
            pincode: dto.pincode.trim().to_string(),
            latitude: coordinates.map(|c| c.lat),
            longitude: coordinates.map(|c| c.lng),
            job_date: dto.job_date,
            apply_by: dto.apply_by,
            description: clean_text(&dto.description),
            contact_person_name: dto.contact_person_name.trim().to_string(),
            contact_person_phone: dto.contact_person_phone,
        };

        let job = self.db_client.create_job(provider.id, &provider.email, &draft).await?;
        tracing::info!("Job {} posted by {}", job.id, provider.id);
        self.invalidate_recommendations().await;
        Ok(job)
    }

    pub async fn update_job(
        &self,
        provider_id: Uuid,
        job_id: Uuid,
        dto: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self.owned_job(provider_id, job_id).await?;
        if job.state != JobState::Current {
            return Err(ServiceError::InvalidJobState(job_id, JobState::Current));
        }

        let mut draft = JobDraft::from(&job);
        let relocated = apply_update(&mut draft, dto);
        check_dates(draft.job_date, draft.apply_by)?;

        if relocated {
            let coordinates = locate(self.geo.as_ref(), &draft.location, &draft.pincode).await;
            draft.latitude = coordinates.map(|c| c.lat);
            draft.longitude = coordinates.map(|c| c.lng);
        }

        let updated = self
            .db_client
            .update_job(job_id, &draft)
            .await?
            .ok_or(ServiceError::InvalidJobState(job_id, JobState::Current))?;

        self.invalidate_recommendations().await;
        Ok(updated)
    }

    pub async fn delete_job(&self, provider_id: Uuid, job_id: Uuid) -> Result<(), ServiceError> {
        let job = self.owned_job(provider_id, job_id).await?;
        if job.state != JobState::Current || !self.db_client.delete_job(job_id).await? {
            return Err(ServiceError::InvalidJobState(job_id, JobState::Current));
        }

        tracing::info!("Job {} deleted by {}", job_id, provider_id);
        self.invalidate_recommendations().await;
        Ok(())
    }

    pub async fn complete_job(&self, provider_id: Uuid, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.owned_job(provider_id, job_id).await?;
        if job.state == JobState::Completed {
            return Err(ServiceError::AlreadyCompleted(job_id));
        }

        let completed = self
            .db_client
            .complete_job(job_id)
            .await?
            .ok_or(ServiceError::AlreadyCompleted(job_id))?;

        tracing::info!("Job {} marked completed", job_id);
        self.invalidate_recommendations().await;
        Ok(completed)
    }

    pub async fn apply(&self, seeker: &User, job_id: Uuid, dto: ApplyJobDto) -> Result<Application, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.state != JobState::Current {
            return Err(ServiceError::InvalidJobState(job_id, JobState::Current));
        }
        if Utc::now().date_naive() > job.apply_by {
            return Err(ServiceError::Validation("Applications for this job are closed".to_string()));
        }
        if let Some(resume) = &dto.resume {
            check_resume(resume)?;
        }

        let application = NewApplication {
            applicant_email: dto.email.trim().to_string(),
            applicant_key: sanitize_email(&seeker.email),
            applicant_name: dto.name.trim().to_string(),
            contact_number: dto.contact_number,
            cover_letter: clean_text(&dto.cover_letter),
            resume_name: dto.resume_name,
            resume_data: dto.resume,
        };

        match self.db_client.create_application(job_id, seeker.id, &application).await {
            Ok(created) => Ok(created),
            Err(e) if is_unique_violation(&e) => Err(ServiceError::DuplicateApplication),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_status(
        &self,
        provider_id: Uuid,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<Application, ServiceError> {
        let application = self.application(application_id).await?;
        let job = self.owned_job(provider_id, application.job_id).await?;

        if job.state != JobState::Current {
            return Err(ServiceError::InvalidJobState(job.id, JobState::Current));
        }
        if !application.status.can_transition_to(next) {
            return Err(ServiceError::InvalidStatusTransition(application.status, next));
        }
        if application.status == next {
            return Ok(application);
        }

        Ok(self.db_client.update_application_status(application_id, next).await?)
    }

    pub async fn rate_application(
        &self,
        provider_id: Uuid,
        application_id: Uuid,
        rating: i16,
    ) -> Result<Application, ServiceError> {
        let application = self.application(application_id).await?;
        let job = self.owned_job(provider_id, application.job_id).await?;

        if job.state != JobState::Completed {
            return Err(ServiceError::InvalidJobState(job.id, JobState::Completed));
        }
        if application.rating.is_some() {
            return Err(ServiceError::AlreadyRated);
        }
        if application.status != ApplicationStatus::Approved {
            return Err(ServiceError::Validation(
                "Only approved applicants can be rated".to_string(),
            ));
        }

        let rated = self
            .db_client
            .rate_application(application_id, application.applicant_id, rating)
            .await?
            .ok_or(ServiceError::AlreadyRated)?;

        tracing::info!("Application {} rated {}", application_id, rating);
        Ok(rated)
    }

    pub async fn search_jobs(&self, seeker: &User, query: SearchJobsQuery) -> Result<Vec<JobWithDistance>, ServiceError> {
        let skill = query.skill.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let jobs = self.db_client.search_current_jobs(skill).await?;

        let origin = self
            .db_client
            .get_seeker_profile(seeker.id)
            .await?
            .and_then(|profile| Coordinates::from_parts(profile.latitude, profile.longitude));

        let mut results = match origin {
            None => jobs
                .into_iter()
                .map(|job| JobWithDistance { job, distance_km: None })
                .collect(),
            Some(origin) => self.with_distances(origin, jobs, query.distance).await,
        };

        sort_for_search(&mut results, query.sort);
        Ok(results)
    }

    async fn with_distances(&self, origin: Coordinates, jobs: Vec<Job>, mode: DistanceMode) -> Vec<JobWithDistance> {
        let lookups = jobs.into_iter().map(|job| async move {
            let distance_km = match Coordinates::from_parts(job.latitude, job.longitude) {
                None => None,
                Some(destination) => match mode {
                    DistanceMode::Straight => Some(round_to(haversine_km(origin, destination), 2)),
                    DistanceMode::Road => match self.geo.road_distance_km(origin, destination).await {
                        Ok(distance) => distance,
                        Err(e) => {
                            tracing::warn!("Road distance failed for job {}: {}", job.id, e);
                            None
                        }
                    },
                },
            };
            JobWithDistance { job, distance_km }
        });

        join_all(lookups).await
    }

    pub async fn similar_jobs(&self, job_id: Uuid) -> Result<Vec<Job>, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        Ok(self.db_client.get_similar_jobs(&job).await?)
    }

    /// The provider's jobs in `state`, each with its applications and the
    /// applicants' seeker profiles.
    pub async fn jobs_with_applications(
        &self,
        provider_id: Uuid,
        state: JobState,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<JobWithApplications>, ServiceError> {
        let jobs = self.db_client.get_all_provider_jobs(provider_id, state).await?;
        let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
        let applications = self.db_client.get_applications_for_jobs(&job_ids, status).await?;

        let mut applicant_ids: Vec<Uuid> = applications.iter().map(|a| a.applicant_id).collect();
        applicant_ids.sort();
        applicant_ids.dedup();
        let profiles: HashMap<Uuid, _> = self
            .db_client
            .get_seeker_profiles(&applicant_ids)
            .await?
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();

        let mut by_job: HashMap<Uuid, Vec<ApplicantView>> = HashMap::new();
        for application in applications {
            let applicant_profile = profiles.get(&application.applicant_id).cloned();
            by_job.entry(application.job_id).or_default().push(ApplicantView {
                application,
                applicant_profile,
            });
        }

        Ok(jobs
            .into_iter()
            .map(|job| {
                let applications = by_job.remove(&job.id).unwrap_or_default();
                JobWithApplications { job, applications }
            })
            .collect())
    }

    async fn owned_job(&self, provider_id: Uuid, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.provider_id != provider_id {
            return Err(ServiceError::UnauthorizedJobAccess(provider_id, job_id));
        }
        Ok(job)
    }

    async fn application(&self, application_id: Uuid) -> Result<Application, ServiceError> {
        self.db_client
            .get_application(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))
    }

    async fn invalidate_recommendations(&self) {
        if let Some(redis) = &self.db_client.redis_client {
            if let Err(e) = CacheHelper::delete_pattern(redis, "reco:*").await {
                tracing::warn!("Failed to invalidate recommendation cache: {}", e);
            }
        }
    }
}

fn clean_skills(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn check_dates(job_date: NaiveDate, apply_by: NaiveDate) -> Result<(), ServiceError> {
    if apply_by > job_date {
        return Err(ServiceError::Validation(
            "Apply-by date cannot be after the job date".to_string(),
        ));
    }
    Ok(())
}

/// Merges a partial update into `draft`. Returns true when the location or
/// pincode changed and the job needs geocoding again.
pub fn apply_update(draft: &mut JobDraft, dto: UpdateJobDto) -> bool {
    let mut relocated = false;

    if let Some(title) = dto.job_title {
        draft.job_title = clean_text(&title);
    }
    if let Some(job_type) = dto.job_type {
        draft.job_type = job_type;
    }
    if let Some(categories) = dto.categories {
        draft.categories = categories.trim().to_string();
    }
    if let Some(skills) = dto.skills_required {
        draft.skills_required = clean_skills(&skills);
    }
    if let Some(level) = dto.experience_level {
        let level = level.trim().to_string();
        draft.experience_level = if level.is_empty() { None } else { Some(level) };
    }
    if let Some(budget) = dto.budget_range {
        draft.budget_value = parse_budget(&budget);
        draft.budget_range = budget.trim().to_string();
    }
    if let Some(location) = dto.location {
        let location = location.trim().to_string();
        relocated |= location != draft.location;
        draft.location = location;
    }
    if let Some(pincode) = dto.pincode {
        let pincode = pincode.trim().to_string();
        relocated |= pincode != draft.pincode;
        draft.pincode = pincode;
    }
    if let Some(job_date) = dto.job_date {
        draft.job_date = job_date;
    }
    if let Some(apply_by) = dto.apply_by {
        draft.apply_by = apply_by;
    }
    if let Some(description) = dto.description {
        draft.description = clean_text(&description);
    }
    if let Some(name) = dto.contact_person_name {
        draft.contact_person_name = name.trim().to_string();
    }
    if let Some(phone) = dto.contact_person_phone {
        draft.contact_person_phone = phone;
    }

    relocated
}

/// Resumes arrive as `data:<mime>;base64,<payload>` and must be a PDF or DOCX
/// of at most 2 MB.
pub fn check_resume(data_url: &str) -> Result<(), ServiceError> {
    let invalid = || ServiceError::Validation("Resume must be a PDF or DOCX file".to_string());

    let rest = data_url.strip_prefix("data:").ok_or_else(invalid)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    if !RESUME_TYPES.contains(&mime) {
        return Err(invalid());
    }

    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(ServiceError::Validation("Resume must be smaller than 2 MB".to_string()));
    }
    Ok(())
}

/// Jobs with a distance first (nearest first, ties by date), then the rest by date.
pub fn sort_for_search(jobs: &mut [JobWithDistance], order: SortOrder) {
    jobs.sort_by(|a, b| {
        let by_date = match order {
            SortOrder::Newest => b.job.job_date.cmp(&a.job.job_date),
            SortOrder::Oldest => a.job.job_date.cmp(&b.job.job_date),
        };

        match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y).then(by_date),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_date,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_support::{seed_job, seed_seeker, seed_user},
        models::{jobmodel::JobType, usermodel::UserRole},
    };

    fn job(title: &str, job_date: &str) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            provider_email: "owner@example.com".to_string(),
            job_title: title.to_string(),
            job_type: JobType::Contract,
            categories: "Repairs".to_string(),
            skills_required: vec!["Plumbing".to_string()],
            experience_level: None,
            budget_range: "1000".to_string(),
            budget_value: 1000.0,
            location: "Andheri East, Mumbai".to_string(),
            pincode: "400069".to_string(),
            latitude: None,
            longitude: None,
            job_date: job_date.parse().unwrap(),
            apply_by: job_date.parse().unwrap(),
            description: "Fix a leak".to_string(),
            contact_person_name: "Meera".to_string(),
            contact_person_phone: "9876543210".to_string(),
            state: JobState::Current,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn entry(title: &str, date: &str, distance_km: Option<f64>) -> JobWithDistance {
        JobWithDistance { job: job(title, date), distance_km }
    }

    fn titles(jobs: &[JobWithDistance]) -> Vec<&str> {
        jobs.iter().map(|j| j.job.job_title.as_str()).collect()
    }

    #[test]
    fn distance_sorted_jobs_come_before_unknown_distances() {
        let mut jobs = vec![
            entry("no-distance-new", "2026-12-01", None),
            entry("far", "2026-11-01", Some(12.5)),
            entry("no-distance-old", "2026-10-01", None),
            entry("near", "2026-11-05", Some(2.0)),
        ];
        sort_for_search(&mut jobs, SortOrder::Newest);
        assert_eq!(titles(&jobs), vec!["near", "far", "no-distance-new", "no-distance-old"]);
    }

    #[test]
    fn equal_distances_follow_date_order() {
        let mut jobs = vec![
            entry("older", "2026-10-01", Some(3.0)),
            entry("newer", "2026-12-01", Some(3.0)),
        ];
        sort_for_search(&mut jobs, SortOrder::Newest);
        assert_eq!(titles(&jobs), vec!["newer", "older"]);

        sort_for_search(&mut jobs, SortOrder::Oldest);
        assert_eq!(titles(&jobs), vec!["older", "newer"]);
    }

    #[test]
    fn apply_by_after_job_date_is_rejected() {
        let job_date: NaiveDate = "2026-11-20".parse().unwrap();
        assert!(check_dates(job_date, "2026-11-20".parse().unwrap()).is_ok());
        assert!(check_dates(job_date, "2026-11-21".parse().unwrap()).is_err());
    }

    #[test]
    fn update_marks_relocation_only_on_change() {
        let original = job("Plumber", "2026-11-20");
        let mut draft = JobDraft::from(&original);

        let same_place = UpdateJobDto {
            location: Some(" Andheri East, Mumbai ".to_string()),
            budget_range: Some("1,000 - 2,000".to_string()),
            ..Default::default()
        };
        assert!(!apply_update(&mut draft, same_place));
        assert_eq!(draft.budget_value, 1500.0);

        let moved = UpdateJobDto {
            pincode: Some("400072".to_string()),
            ..Default::default()
        };
        assert!(apply_update(&mut draft, moved));
        assert_eq!(draft.pincode, "400072");
    }

    #[test]
    fn resume_must_be_pdf_or_docx_data_url() {
        let pdf = format!("data:application/pdf;base64,{}", STANDARD.encode(b"%PDF-1.4"));
        assert!(check_resume(&pdf).is_ok());

        let png = format!("data:image/png;base64,{}", STANDARD.encode(b"png"));
        assert!(check_resume(&png).is_err());
        assert!(check_resume("not a data url").is_err());
        assert!(check_resume("data:application/pdf;base64,***").is_err());
    }

    #[test]
    fn oversized_resume_is_rejected() {
        let big = vec![0u8; MAX_RESUME_BYTES + 1];
        let url = format!("data:application/pdf;base64,{}", STANDARD.encode(big));
        assert!(check_resume(&url).is_err());
    }

    struct NoGeo;

    #[async_trait::async_trait]
    impl GeoProvider for NoGeo {
        async fn geocode(&self, _: &str, _: &str) -> Result<Option<Coordinates>, ServiceError> {
            Ok(None)
        }

        async fn road_distance_km(&self, _: Coordinates, _: Coordinates) -> Result<Option<f64>, ServiceError> {
            Ok(None)
        }
    }

    fn service(pool: sqlx::PgPool) -> (JobService, Arc<DBClient>) {
        let db = Arc::new(DBClient::new(pool));
        (JobService::new(db.clone(), Arc::new(NoGeo)), db)
    }

    fn apply_dto(seeker: &User) -> ApplyJobDto {
        ApplyJobDto {
            name: seeker.name.clone(),
            email: seeker.email.clone(),
            cover_letter: "I have fixed many leaks".to_string(),
            contact_number: "9876543210".to_string(),
            resume: None,
            resume_name: None,
        }
    }

    fn status_of(err: ServiceError) -> axum::http::StatusCode {
        crate::error::HttpError::from(err).status
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn second_completion_is_a_conflict(pool: sqlx::PgPool) {
        let (jobs, db) = service(pool);
        let provider = seed_user(&db, "meera@example.com", UserRole::Provider).await;
        let job = seed_job(&db, &provider, "Fix kitchen leak").await;

        jobs.complete_job(provider.id, job.id).await.unwrap();
        let err = jobs.complete_job(provider.id, job.id).await.unwrap_err();
        assert_eq!(status_of(err), axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn applying_twice_is_a_conflict(pool: sqlx::PgPool) {
        let (jobs, db) = service(pool);
        let provider = seed_user(&db, "meera@example.com", UserRole::Provider).await;
        let seeker = seed_seeker(&db, "ravi@example.com").await;
        let job = seed_job(&db, &provider, "Fix kitchen leak").await;

        jobs.apply(&seeker, job.id, apply_dto(&seeker)).await.unwrap();
        let err = jobs.apply(&seeker, job.id, apply_dto(&seeker)).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateApplication));
        assert_eq!(status_of(err), axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rating_needs_approval_and_happens_once(pool: sqlx::PgPool) {
        let (jobs, db) = service(pool);
        let provider = seed_user(&db, "meera@example.com", UserRole::Provider).await;
        let seeker = seed_seeker(&db, "ravi@example.com").await;
        let job = seed_job(&db, &provider, "Fix kitchen leak").await;
        let application = jobs.apply(&seeker, job.id, apply_dto(&seeker)).await.unwrap();

        let early = jobs.rate_application(provider.id, application.id, 5).await.unwrap_err();
        assert_eq!(status_of(early), axum::http::StatusCode::BAD_REQUEST);

        jobs.complete_job(provider.id, job.id).await.unwrap();
        let pending = jobs.rate_application(provider.id, application.id, 5).await.unwrap_err();
        assert_eq!(status_of(pending), axum::http::StatusCode::BAD_REQUEST);

        db.update_application_status(application.id, ApplicationStatus::Approved)
            .await
            .unwrap();
        let rated = jobs.rate_application(provider.id, application.id, 4).await.unwrap();
        assert_eq!(rated.rating, Some(4));

        let again = jobs.rate_application(provider.id, application.id, 5).await.unwrap_err();
        assert!(matches!(again, ServiceError::AlreadyRated));
        assert_eq!(status_of(again), axum::http::StatusCode::CONFLICT);
    }
}
