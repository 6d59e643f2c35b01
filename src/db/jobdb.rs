// db/jobdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::{Job, JobDraft, JobState, JobType};

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        provider_id: Uuid,
        provider_email: &str,
        draft: &JobDraft,
    ) -> Result<Job, sqlx::Error>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error>;

    /// Only current jobs are updated. `None` means the job is gone or completed.
    async fn update_job(&self, job_id: Uuid, draft: &JobDraft) -> Result<Option<Job>, sqlx::Error>;

    /// Deletes a current job and, through the foreign key, its applications.
    async fn delete_job(&self, job_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn get_provider_jobs(
        &self,
        provider_id: Uuid,
        state: JobState,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_all_provider_jobs(&self, provider_id: Uuid, state: JobState) -> Result<Vec<Job>, sqlx::Error>;

    async fn count_provider_jobs(&self, provider_id: Uuid, state: JobState) -> Result<i64, sqlx::Error>;

    async fn get_current_jobs(&self, job_type: Option<JobType>) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_latest_jobs(&self, job_type: Option<JobType>, limit: i64) -> Result<Vec<Job>, sqlx::Error>;

    /// Current jobs, optionally narrowed to those listing `skill` (case-insensitive).
    async fn search_current_jobs(&self, skill: Option<&str>) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_similar_jobs(&self, job: &Job) -> Result<Vec<Job>, sqlx::Error>;

    /// Current jobs with usable coordinates.
    async fn get_geocoded_jobs(&self) -> Result<Vec<Job>, sqlx::Error>;

    /// Moves a current job to completed inside one transaction.
    /// `None` when the job was not current any more.
    async fn complete_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        provider_id: Uuid,
        provider_email: &str,
        draft: &JobDraft,
    ) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
            (provider_id, provider_email, job_title, job_type, categories, skills_required,
             experience_level, budget_range, budget_value, location, pincode, latitude, longitude,
             job_date, apply_by, description, contact_person_name, contact_person_phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(provider_email)
        .bind(&draft.job_title)
        .bind(draft.job_type)
        .bind(&draft.categories)
        .bind(&draft.skills_required)
        .bind(&draft.experience_level)
        .bind(&draft.budget_range)
        .bind(draft.budget_value)
        .bind(&draft.location)
        .bind(&draft.pincode)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.job_date)
        .bind(draft.apply_by)
        .bind(&draft.description)
        .bind(&draft.contact_person_name)
        .bind(&draft.contact_person_phone)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_jobs_by_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Job>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ANY($1)")
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_job(&self, job_id: Uuid, draft: &JobDraft) -> Result<Option<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                job_title = $2, job_type = $3, categories = $4, skills_required = $5,
                experience_level = $6, budget_range = $7, budget_value = $8, location = $9,
                pincode = $10, latitude = $11, longitude = $12, job_date = $13, apply_by = $14,
                description = $15, contact_person_name = $16, contact_person_phone = $17,
                updated_at = NOW()
            WHERE id = $1 AND state = 'current'::job_state
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(&draft.job_title)
        .bind(draft.job_type)
        .bind(&draft.categories)
        .bind(&draft.skills_required)
        .bind(&draft.experience_level)
        .bind(&draft.budget_range)
        .bind(draft.budget_value)
        .bind(&draft.location)
        .bind(&draft.pincode)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.job_date)
        .bind(draft.apply_by)
        .bind(&draft.description)
        .bind(&draft.contact_person_name)
        .bind(&draft.contact_person_phone)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND state = 'current'::job_state")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_provider_jobs(
        &self,
        provider_id: Uuid,
        state: JobState,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let offset = (page.max(1) - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE provider_id = $1 AND state = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(provider_id)
        .bind(state)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_all_provider_jobs(&self, provider_id: Uuid, state: JobState) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE provider_id = $1 AND state = $2
            ORDER BY COALESCE(completed_at, created_at) DESC
            "#,
        )
        .bind(provider_id)
        .bind(state)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_provider_jobs(&self, provider_id: Uuid, state: JobState) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM jobs WHERE provider_id = $1 AND state = $2",
        )
        .bind(provider_id)
        .bind(state)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_current_jobs(&self, job_type: Option<JobType>) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE state = 'current'::job_state
              AND ($1::job_type IS NULL OR job_type = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(job_type)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_latest_jobs(&self, job_type: Option<JobType>, limit: i64) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE state = 'current'::job_state
              AND ($1::job_type IS NULL OR job_type = $1)
            ORDER BY job_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(job_type)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn search_current_jobs(&self, skill: Option<&str>) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE state = 'current'::job_state
              AND ($1::text IS NULL OR EXISTS (
                    SELECT 1 FROM unnest(skills_required) AS s WHERE lower(s) = lower($1)
              ))
            "#,
        )
        .bind(skill)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_similar_jobs(&self, job: &Job) -> Result<Vec<Job>, sqlx::Error> {
        let skills: Vec<String> = job
            .skills_required
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();

        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE state = 'current'::job_state
              AND id <> $1
              AND (
                lower(job_title) = lower($2)
                OR EXISTS (SELECT 1 FROM unnest(skills_required) AS s WHERE lower(s) = ANY($3))
              )
            ORDER BY job_date DESC
            "#,
        )
        .bind(job.id)
        .bind(&job.job_title)
        .bind(&skills)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_geocoded_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE state = 'current'::job_state
              AND latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude <> 0 AND longitude <> 0
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn complete_job(&self, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE id = $1 AND state = 'current'::job_state
            FOR UPDATE
            "#,
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let completed = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET state = 'completed'::job_state, completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(completed))
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::{
        db::test_support::{seed_job, seed_user},
        models::usermodel::UserRole,
    };

    #[sqlx::test(migrations = "./migrations")]
    async fn completing_twice_only_succeeds_once(pool: PgPool) {
        let db = DBClient::new(pool);
        let provider = seed_user(&db, "meera@example.com", UserRole::Provider).await;
        let job = seed_job(&db, &provider, "Fix kitchen leak").await;

        let completed = db.complete_job(job.id).await.unwrap().unwrap();
        assert_eq!(completed.state, JobState::Completed);
        assert!(completed.completed_at.is_some());

        assert!(db.complete_job(job.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn completed_jobs_leave_the_current_listing(pool: PgPool) {
        let db = DBClient::new(pool);
        let provider = seed_user(&db, "meera@example.com", UserRole::Provider).await;
        let done = seed_job(&db, &provider, "Paint the hallway").await;
        let open = seed_job(&db, &provider, "Fix kitchen leak").await;

        db.complete_job(done.id).await.unwrap();

        let current: Vec<Uuid> = db
            .get_current_jobs(None)
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.id)
            .collect();
        assert_eq!(current, vec![open.id]);

        let completed = db.get_all_provider_jobs(provider.id, JobState::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
    }
}
