// db/applicationdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    models::jobmodel::{Application, ApplicationStatus, AppliedJob, NewApplication},
    utils::geo::round_to,
};

#[async_trait]
pub trait ApplicationExt {
    async fn create_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        application: &NewApplication,
    ) -> Result<Application, sqlx::Error>;

    async fn get_application(&self, application_id: Uuid) -> Result<Option<Application>, sqlx::Error>;

    async fn get_applications_for_jobs(
        &self,
        job_ids: &[Uuid],
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, sqlx::Error>;

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, sqlx::Error>;

    async fn get_applied_jobs(&self, applicant_id: Uuid) -> Result<Vec<AppliedJob>, sqlx::Error>;

    /// Stores a first rating on an approved application and refreshes the
    /// seeker's average in the same transaction. `None` when the application
    /// is not approved or already carries a rating.
    async fn rate_application(
        &self,
        application_id: Uuid,
        applicant_id: Uuid,
        rating: i16,
    ) -> Result<Option<Application>, sqlx::Error>;

    async fn count_pending_for_provider(&self, provider_id: Uuid) -> Result<i64, sqlx::Error>;

    async fn count_by_status(&self, applicant_id: Uuid) -> Result<Vec<(ApplicationStatus, i64)>, sqlx::Error>;

    async fn provider_has_applicant(&self, provider_id: Uuid, applicant_key: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ApplicationExt for DBClient {
    async fn create_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        application: &NewApplication,
    ) -> Result<Application, sqlx::Error> {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
            (job_id, applicant_id, applicant_email, applicant_key, applicant_name,
             contact_number, cover_letter, resume_name, resume_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(applicant_id)
        .bind(&application.applicant_email)
        .bind(&application.applicant_key)
        .bind(&application.applicant_name)
        .bind(&application.contact_number)
        .bind(&application.cover_letter)
        .bind(&application.resume_name)
        .bind(&application.resume_data)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_application(&self, application_id: Uuid) -> Result<Option<Application>, sqlx::Error> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_applications_for_jobs(
        &self,
        job_ids: &[Uuid],
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE job_id = ANY($1)
              AND ($2::application_status IS NULL OR status = $2)
            ORDER BY applied_at DESC
            "#,
        )
        .bind(job_ids)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, sqlx::Error> {
        sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_applied_jobs(&self, applicant_id: Uuid) -> Result<Vec<AppliedJob>, sqlx::Error> {
        sqlx::query_as::<_, AppliedJob>(
            r#"
            SELECT a.id AS application_id, j.id AS job_id, j.job_title, j.job_type, j.location,
                   j.budget_range, j.job_date, j.state AS job_state, a.status, a.rating, a.applied_at
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.applicant_id = $1
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn rate_application(
        &self,
        application_id: Uuid,
        applicant_id: Uuid,
        rating: i16,
    ) -> Result<Option<Application>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // serialises concurrent ratings of the same seeker
        sqlx::query("SELECT user_id FROM seeker_profiles WHERE user_id = $1 FOR UPDATE")
            .bind(applicant_id)
            .fetch_optional(&mut *tx)
            .await?;

        let rated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET rating = $2, updated_at = NOW()
            WHERE id = $1 AND rating IS NULL AND status = 'approved'::application_status
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(rating)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(rated) = rated else {
            tx.rollback().await?;
            return Ok(None);
        };

        let (average, count): (Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT AVG(rating)::float8, COUNT(rating)
            FROM applications
            WHERE applicant_id = $1 AND rating IS NOT NULL
            "#,
        )
        .bind(applicant_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE seeker_profiles
            SET rating = $2, rating_count = $3, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(applicant_id)
        .bind(average.map(|avg| round_to(avg, 1)))
        .bind(count as i32)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(rated))
    }

    async fn count_pending_for_provider(&self, provider_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE j.provider_id = $1
              AND j.state = 'current'::job_state
              AND a.status = 'pending'::application_status
            "#,
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_by_status(&self, applicant_id: Uuid) -> Result<Vec<(ApplicationStatus, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (ApplicationStatus, i64)>(
            r#"
            SELECT status, COUNT(*) FROM applications
            WHERE applicant_id = $1
            GROUP BY status
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn provider_has_applicant(&self, provider_id: Uuid, applicant_key: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications a
                JOIN jobs j ON j.id = a.job_id
                WHERE j.provider_id = $1 AND a.applicant_key = $2
            )
            "#,
        )
        .bind(provider_id)
        .bind(applicant_key)
        .fetch_one(&self.pool)
        .await
    }
}
