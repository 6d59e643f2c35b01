use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::jobdb::JobExt,
    dtos::jobdtos::{
        ApiResponse, ApplicationsQuery, CreateJobDto, JobListQuery, PaginatedResponse,
        SearchJobsQuery, UpdateJobDto, JOBS_PER_PAGE,
    },
    error::{ErrorMessage, HttpError},
    handler::applications::apply,
    middleware::{role_check, JWTAuthMiddeware},
    models::{jobmodel::JobState, usermodel::UserRole},
    service::{error::ServiceError, job_service::MAX_RESUME_BYTES},
    AppState,
};

const PREVIEW_JOBS: i64 = 5;

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", get(list_current_jobs).post(create_job))
        .route(
            "/mine",
            get(list_my_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/completed",
            get(list_completed_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/search",
            get(search_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
        .route("/:job_id", get(get_job).put(update_job).delete(delete_job))
        .route(
            "/:job_id/complete",
            post(complete_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route("/:job_id/similar", get(similar_jobs))
        .route(
            "/:job_id/apply",
            post(apply)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES * 2))
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Seeker])
                })),
        )
}

/// Routes reachable without a session.
pub fn public_jobs_handler() -> Router {
    Router::new().route("/preview", get(preview_jobs))
}

fn require_provider(auth: &JWTAuthMiddeware) -> Result<(), HttpError> {
    if auth.user.role != UserRole::Provider {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }
    Ok(())
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_provider(&auth)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job posted successfully", job)),
    ))
}

pub async fn list_current_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_current_jobs(query.job_type)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs loaded", jobs)))
}

pub async fn preview_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_latest_jobs(query.job_type, PREVIEW_JOBS)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs loaded", jobs)))
}

pub async fn list_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);

    let jobs = app_state
        .db_client
        .get_provider_jobs(auth.user.id, JobState::Current, page, JOBS_PER_PAGE)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total = app_state
        .db_client
        .count_provider_jobs(auth.user.id, JobState::Current)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PaginatedResponse::new(jobs, total, page, JOBS_PER_PAGE as u32)))
}

pub async fn list_completed_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .job_service
        .jobs_with_applications(auth.user.id, JobState::Completed, query.status)
        .await?;

    Ok(Json(ApiResponse::success("Completed jobs loaded", jobs)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(ServiceError::JobNotFound(job_id))?;

    Ok(Json(ApiResponse::success("Job loaded", job)))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_provider(&auth)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .update_job(auth.user.id, job_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Job updated successfully", job)))
}

pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_provider(&auth)?;

    app_state.job_service.delete_job(auth.user.id, job_id).await?;

    Ok(Json(ApiResponse::success("Job deleted successfully", job_id)))
}

pub async fn complete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.complete_job(auth.user.id, job_id).await?;

    Ok(Json(ApiResponse::success("Job marked as completed", job)))
}

pub async fn search_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<SearchJobsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.search_jobs(&auth.user, query).await?;

    Ok(Json(ApiResponse::success("Jobs loaded", jobs)))
}

pub async fn similar_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.similar_jobs(job_id).await?;

    Ok(Json(ApiResponse::success("Similar jobs loaded", jobs)))
}
