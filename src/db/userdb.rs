// db/userdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email_key: Option<&str>,
        reset_token_hash: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        email_key: T,
        phone: T,
        role: UserRole,
        password: T,
    ) -> Result<User, sqlx::Error>;

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    /// Stores the new hash and clears any pending reset token.
    async fn update_user_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email_key: Option<&str>,
        reset_token_hash: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(email_key) = email_key {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_key = $1")
                .bind(email_key)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(token_hash) = reset_token_hash {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        }

        Ok(user)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        email_key: T,
        phone: T,
        role: UserRole,
        password: T,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, email_key, phone, role, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name.into())
        .bind(email.into())
        .bind(email_key.into())
        .bind(phone.into())
        .bind(role)
        .bind(password.into())
        .fetch_one(&self.pool)
        .await
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password = $2, reset_token_hash = NULL, token_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(password)
        .fetch_one(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::db::test_support::seed_user;

    #[sqlx::test(migrations = "./migrations")]
    async fn users_are_found_by_id_key_or_reset_token(pool: PgPool) {
        let db = DBClient::new(pool);
        let user = seed_user(&db, "asha.rao@example.com", UserRole::Seeker).await;

        let by_id = db.get_user(Some(user.id), None, None).await.unwrap().unwrap();
        assert_eq!(by_id.email, "asha.rao@example.com");

        let by_key = db.get_user(None, Some("asha,rao@example,com"), None).await.unwrap().unwrap();
        assert_eq!(by_key.id, user.id);

        let expires_at = Utc::now() + chrono::Duration::minutes(30);
        db.set_reset_token(user.id, "token-hash", expires_at)
            .await
            .unwrap();
        let by_token = db.get_user(None, None, Some("token-hash")).await.unwrap().unwrap();
        assert_eq!(by_token.id, user.id);

        assert!(db.get_user(None, None, None).await.unwrap().is_none());
    }
}
