// db/activitydb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::profilemodel::SeekerActivity;

#[async_trait]
pub trait ActivityExt {
    /// Adds `seconds` to the time the seeker has spent on the job.
    async fn record_activity(
        &self,
        seeker_id: Uuid,
        job_id: Uuid,
        seconds: i64,
    ) -> Result<SeekerActivity, sqlx::Error>;

    async fn get_top_viewed(&self, seeker_id: Uuid, limit: i64) -> Result<Vec<SeekerActivity>, sqlx::Error>;
}

#[async_trait]
impl ActivityExt for DBClient {
    async fn record_activity(
        &self,
        seeker_id: Uuid,
        job_id: Uuid,
        seconds: i64,
    ) -> Result<SeekerActivity, sqlx::Error> {
        sqlx::query_as::<_, SeekerActivity>(
            r#"
            INSERT INTO seeker_activity (seeker_id, job_id, time_spent)
            VALUES ($1, $2, $3)
            ON CONFLICT (seeker_id, job_id) DO UPDATE SET
                time_spent = seeker_activity.time_spent + EXCLUDED.time_spent,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(seeker_id)
        .bind(job_id)
        .bind(seconds)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_top_viewed(&self, seeker_id: Uuid, limit: i64) -> Result<Vec<SeekerActivity>, sqlx::Error> {
        sqlx::query_as::<_, SeekerActivity>(
            r#"
            SELECT * FROM seeker_activity
            WHERE seeker_id = $1
            ORDER BY time_spent DESC, updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(seeker_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
