use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::applicationdb::ApplicationExt,
    dtos::jobdtos::{
        ApiResponse, ApplicationsQuery, ApplyJobDto, RateApplicationDto,
        UpdateApplicationStatusDto,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{jobmodel::JobState, usermodel::UserRole},
    AppState,
};

pub fn applications_handler() -> Router {
    Router::new()
        .route(
            "/received",
            get(list_received_applications).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/:application_id/status",
            put(update_application_status).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/:application_id/rating",
            post(rate_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/mine",
            get(list_applied_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
}

pub async fn apply(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<ApplyJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state.job_service.apply(&auth.user, job_id, body).await?;
    tracing::info!("User {} applied to job {}", auth.user.id, job_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Application submitted", application)),
    ))
}

/// Applications on the provider's current jobs, grouped by job.
pub async fn list_received_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .job_service
        .jobs_with_applications(auth.user.id, JobState::Current, query.status)
        .await?;

    Ok(Json(ApiResponse::success("Applications loaded", jobs)))
}

pub async fn update_application_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<UpdateApplicationStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .job_service
        .update_status(auth.user.id, application_id, body.status)
        .await?;

    Ok(Json(ApiResponse::success(
        &format!("Application {}", application.status.to_str().to_lowercase()),
        application,
    )))
}

pub async fn rate_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<RateApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state
        .job_service
        .rate_application(auth.user.id, application_id, body.rating)
        .await?;

    Ok(Json(ApiResponse::success("Rating saved", application)))
}

pub async fn list_applied_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let applied = app_state
        .db_client
        .get_applied_jobs(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Applied jobs loaded", applied)))
}
