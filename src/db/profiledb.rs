// db/profiledb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::profilemodel::{
    ProviderProfile, ProviderProfileDraft, SeekerProfile, SeekerProfileDraft,
};

#[async_trait]
pub trait ProfileExt {
    async fn upsert_provider_profile(
        &self,
        user_id: Uuid,
        email: &str,
        draft: &ProviderProfileDraft,
    ) -> Result<ProviderProfile, sqlx::Error>;

    async fn get_provider_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProviderProfile>, sqlx::Error>;

    /// Rating, rating count and picture survive an overwrite.
    async fn upsert_seeker_profile(
        &self,
        user_id: Uuid,
        email: &str,
        draft: &SeekerProfileDraft,
    ) -> Result<SeekerProfile, sqlx::Error>;

    async fn get_seeker_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SeekerProfile>, sqlx::Error>;

    async fn get_seeker_profile_by_key(
        &self,
        email_key: &str,
    ) -> Result<Option<SeekerProfile>, sqlx::Error>;

    async fn get_seeker_profiles(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<SeekerProfile>, sqlx::Error>;

    async fn update_profile_picture(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<Option<SeekerProfile>, sqlx::Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn upsert_provider_profile(
        &self,
        user_id: Uuid,
        email: &str,
        draft: &ProviderProfileDraft,
    ) -> Result<ProviderProfile, sqlx::Error> {
        sqlx::query_as::<_, ProviderProfile>(
            r#"
            INSERT INTO provider_profiles
            (user_id, email, full_name, organization_name, phone_number, professional_details,
             location, pincode, business_type, communication_method, identity_verification)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                organization_name = EXCLUDED.organization_name,
                phone_number = EXCLUDED.phone_number,
                professional_details = EXCLUDED.professional_details,
                location = EXCLUDED.location,
                pincode = EXCLUDED.pincode,
                business_type = EXCLUDED.business_type,
                communication_method = EXCLUDED.communication_method,
                identity_verification = EXCLUDED.identity_verification,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(&draft.full_name)
        .bind(&draft.organization_name)
        .bind(&draft.phone_number)
        .bind(&draft.professional_details)
        .bind(&draft.location)
        .bind(&draft.pincode)
        .bind(&draft.business_type)
        .bind(draft.communication_method)
        .bind(&draft.identity_verification)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_provider_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProviderProfile>, sqlx::Error> {
        sqlx::query_as::<_, ProviderProfile>("SELECT * FROM provider_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn upsert_seeker_profile(
        &self,
        user_id: Uuid,
        email: &str,
        draft: &SeekerProfileDraft,
    ) -> Result<SeekerProfile, sqlx::Error> {
        sqlx::query_as::<_, SeekerProfile>(
            r#"
            INSERT INTO seeker_profiles
            (user_id, email, full_name, phone_number, date_of_birth, skills, experience_years,
             location, pincode, latitude, longitude, expected_pay_range)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                phone_number = EXCLUDED.phone_number,
                date_of_birth = EXCLUDED.date_of_birth,
                skills = EXCLUDED.skills,
                experience_years = EXCLUDED.experience_years,
                location = EXCLUDED.location,
                pincode = EXCLUDED.pincode,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                expected_pay_range = EXCLUDED.expected_pay_range,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(&draft.full_name)
        .bind(&draft.phone_number)
        .bind(draft.date_of_birth)
        .bind(&draft.skills)
        .bind(draft.experience_years)
        .bind(&draft.location)
        .bind(&draft.pincode)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(&draft.expected_pay_range)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_seeker_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SeekerProfile>, sqlx::Error> {
        sqlx::query_as::<_, SeekerProfile>("SELECT * FROM seeker_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_seeker_profile_by_key(
        &self,
        email_key: &str,
    ) -> Result<Option<SeekerProfile>, sqlx::Error> {
        sqlx::query_as::<_, SeekerProfile>(
            r#"
            SELECT sp.* FROM seeker_profiles sp
            JOIN users u ON u.id = sp.user_id
            WHERE u.email_key = $1
            "#,
        )
        .bind(email_key)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_seeker_profiles(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<SeekerProfile>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, SeekerProfile>("SELECT * FROM seeker_profiles WHERE user_id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_profile_picture(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<Option<SeekerProfile>, sqlx::Error> {
        sqlx::query_as::<_, SeekerProfile>(
            r#"
            UPDATE seeker_profiles
            SET profile_picture = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
    }
}
