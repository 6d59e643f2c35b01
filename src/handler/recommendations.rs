use std::sync::Arc;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{activitydb::ActivityExt, jobdb::JobExt},
    dtos::jobdtos::{ApiResponse, RecommendRequestDto, RecordActivityDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::{User, UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn recommendations_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(recommend).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
        .route(
            "/me",
            get(my_recommendations).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
        .route(
            "/activity",
            post(record_activity).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
}

/// Ranks jobs for an explicit skills/location/budget signal from the caller.
pub async fn recommend(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RecommendRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    let recommendations = app_state
        .matching_service
        .recommend(own_signal(body, &auth.user))
        .await?;

    Ok(Json(ApiResponse::success("Recommendations loaded", recommendations)))
}

/// View history is always read for the caller, whatever email the body names.
fn own_signal(mut request: RecommendRequestDto, caller: &User) -> RecommendRequestDto {
    request.email = caller.email.clone();
    request
}

pub async fn my_recommendations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let recommendations = app_state
        .matching_service
        .recommend_for_seeker(&auth.user)
        .await?;

    Ok(Json(ApiResponse::success("Recommendations loaded", recommendations)))
}

pub async fn record_activity(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RecordActivityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .db_client
        .get_job(body.job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(ServiceError::JobNotFound(body.job_id))?;

    let activity = app_state
        .db_client
        .record_activity(auth.user.id, body.job_id, body.time_spent)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Activity recorded", activity)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn seeker(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ravi".to_string(),
            email: email.to_string(),
            email_key: email.replace('.', ","),
            phone: "9876543210".to_string(),
            role: UserRole::Seeker,
            password: "hash".to_string(),
            reset_token_hash: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn signal_email_is_replaced_by_the_caller() {
        let request = RecommendRequestDto {
            email: "someone.else@example.com".to_string(),
            skills: vec!["Plumbing".to_string()],
            latitude: 19.07,
            longitude: 72.87,
            experience: 2,
            budget: 1500.0,
        };

        let signal = own_signal(request, &seeker("ravi@example.com"));
        assert_eq!(signal.email, "ravi@example.com");
        assert_eq!(signal.skills, vec!["Plumbing".to_string()]);
    }
}
