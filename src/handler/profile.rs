use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{
        applicationdb::ApplicationExt,
        cache::{recommendation_key, CacheHelper},
        profiledb::ProfileExt,
    },
    dtos::{
        jobdtos::ApiResponse,
        profiledtos::{MyProfile, ProfilePictureResponse, ProviderProfileDto, SeekerProfileDto},
    },
    error::{ErrorMessage, HttpError},
    middleware::{role_check, JWTAuthMiddeware},
    models::{profilemodel::SeekerProfileDraft, usermodel::UserRole},
    service::{
        geocoding::locate,
        media::{validate_image, MAX_IMAGE_BYTES},
    },
    utils::keys::sanitize_email,
    AppState,
};

pub fn profile_handler() -> Router {
    Router::new()
        .route("/me", get(get_my_profile))
        .route(
            "/provider",
            put(upsert_provider_profile).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
        .route(
            "/seeker",
            put(upsert_seeker_profile).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Seeker])
            })),
        )
        .route(
            "/seeker/picture",
            post(upload_profile_picture)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Seeker])
                })),
        )
        .route(
            "/seekers/:email_key",
            get(get_applicant_profile).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider])
            })),
        )
}

pub async fn upsert_provider_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ProviderProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state
        .db_client
        .upsert_provider_profile(auth.user.id, &auth.user.email, &body.into_draft())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Profile saved", profile)))
}

pub async fn upsert_seeker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<SeekerProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let coordinates = locate(app_state.geo.as_ref(), &body.location, &body.pincode).await;

    let draft = SeekerProfileDraft {
        full_name: body.full_name.trim().to_string(),
        phone_number: body.phone_number.clone(),
        date_of_birth: body.date_of_birth,
        skills: body.clean_skills(),
        experience_years: body.experience_years,
        location: body.location.trim().to_string(),
        pincode: body.pincode.trim().to_string(),
        latitude: coordinates.map(|c| c.lat),
        longitude: coordinates.map(|c| c.lng),
        expected_pay_range: body.expected_pay_range.trim().to_string(),
    };

    let profile = app_state
        .db_client
        .upsert_seeker_profile(auth.user.id, &auth.user.email, &draft)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(redis) = &app_state.db_client.redis_client {
        if let Err(e) = CacheHelper::delete(redis, &recommendation_key(auth.user.id)).await {
            tracing::warn!("Failed to drop cached recommendations: {}", e);
        }
    }

    Ok(Json(ApiResponse::success("Profile saved", profile)))
}

pub async fn get_my_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let user = &auth.user;

    let profile = match user.role {
        UserRole::Provider => app_state
            .db_client
            .get_provider_profile(user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .map(MyProfile::Provider),
        UserRole::Seeker => app_state
            .db_client
            .get_seeker_profile(user.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .map(MyProfile::Seeker),
    };

    let profile =
        profile.ok_or_else(|| HttpError::not_found(ErrorMessage::ProfileIncomplete.to_string()))?;

    Ok(Json(ApiResponse::success("Profile loaded", profile)))
}

pub async fn upload_profile_picture(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("profile-picture").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.to_string()))?;

        upload = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| HttpError::bad_request("No file uploaded"))?;

    validate_image(&content_type, data.len())?;

    let url = app_state
        .media
        .upload_image(&file_name, &content_type, data)
        .await?;

    app_state
        .db_client
        .update_profile_picture(auth.user.id, &url)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ProfileIncomplete.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Profile picture updated",
        ProfilePictureResponse { profile_picture: url },
    )))
}

/// A provider may only read the profile of someone who applied to one of
/// their jobs.
pub async fn get_applicant_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(email_key): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let email_key = sanitize_email(&email_key);

    let is_applicant = app_state
        .db_client
        .provider_has_applicant(auth.user.id, &email_key)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !is_applicant {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let profile = app_state
        .db_client
        .get_seeker_profile_by_key(&email_key)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Seeker profile not found"))?;

    Ok(Json(ApiResponse::success("Profile loaded", profile)))
}
