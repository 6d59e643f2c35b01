use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    models::jobmodel::{ApplicationStatus, JobState},
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error("Profile not found. Please complete your profile.")]
    ProfileNotFound,

    #[error("Job {0} is not {1:?}")]
    InvalidJobState(Uuid, JobState),

    #[error("Cannot move application from {0:?} to {1:?}; reset it to Pending first")]
    InvalidStatusTransition(ApplicationStatus, ApplicationStatus),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("You have already applied for this job")]
    DuplicateApplication,

    #[error("Job {0} has already been completed")]
    AlreadyCompleted(Uuid),

    #[error("Only approved applications without a rating can be rated")]
    AlreadyRated,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("External service error: {0}")]
    ExternalApi(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::ProfileNotFound
            | ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidJobState(_, _)
            | ServiceError::InvalidStatusTransition(_, _)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedJobAccess(_, _) => StatusCode::FORBIDDEN,

            ServiceError::DuplicateApplication
            | ServiceError::AlreadyCompleted(_)
            | ServiceError::AlreadyRated => StatusCode::CONFLICT,

            ServiceError::ExternalApi(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("{}", error);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
            StatusCode::BAD_GATEWAY => {
                tracing::warn!("{}", error);
                HttpError::bad_gateway(error.to_string())
            }
            status => HttpError::new(error.to_string(), status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        let http: HttpError = ServiceError::DuplicateApplication.into();
        assert_eq!(http.status, StatusCode::CONFLICT);
        let http: HttpError = ServiceError::AlreadyCompleted(Uuid::nil()).into();
        assert_eq!(http.status, StatusCode::CONFLICT);
    }

    #[test]
    fn bad_transition_is_a_client_error() {
        let http: HttpError =
            ServiceError::InvalidStatusTransition(ApplicationStatus::Approved, ApplicationStatus::Rejected).into();
        assert_eq!(http.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_hide_details() {
        let http: HttpError = ServiceError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!http.message.contains("RowNotFound"));
    }
}
