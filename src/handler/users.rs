use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    db::{applicationdb::ApplicationExt, jobdb::JobExt, profiledb::ProfileExt},
    dtos::{
        jobdtos::{ApiResponse, DashboardDto},
        userdtos::{FilterUserDto, UserData, UserResponseDto},
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::{
        jobmodel::{ApplicationStatus, JobState},
        usermodel::UserRole,
    },
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route("/dashboard", get(get_dashboard))
}

pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData { user: filtered_user },
    }))
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let user = &auth.user;
    let db = &app_state.db_client;

    let dashboard = match user.role {
        UserRole::Provider => {
            let current_jobs = db
                .count_provider_jobs(user.id, JobState::Current)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            let completed_jobs = db
                .count_provider_jobs(user.id, JobState::Completed)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            let pending_applications = db
                .count_pending_for_provider(user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            DashboardDto::Provider {
                current_jobs,
                completed_jobs,
                pending_applications,
            }
        }
        UserRole::Seeker => {
            let profile_complete = db
                .get_seeker_profile(user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .is_some();
            let counts = db
                .count_by_status(user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            let count_for = |status: ApplicationStatus| {
                counts
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map(|(_, count)| *count)
                    .unwrap_or(0)
            };

            DashboardDto::Seeker {
                profile_complete,
                pending: count_for(ApplicationStatus::Pending),
                approved: count_for(ApplicationStatus::Approved),
                rejected: count_for(ApplicationStatus::Rejected),
            }
        }
    };

    Ok(Json(ApiResponse::success("Dashboard loaded", dashboard)))
}
