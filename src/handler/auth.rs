use std::sync::Arc;

use axum::{
    http::header,
    middleware,
    response::{IntoResponse, Response as AxumResponse},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    db::{db::is_unique_violation, userdb::UserExt},
    dtos::userdtos::{
        FilterUserDto, ForgotPasswordRequestDto, GoogleLoginDto, LoginUserDto, RegisterUserDto,
        ResetPasswordRequestDto, Response, UserData, UserLoginResponseDto, UserResponseDto,
    },
    error::{ErrorMessage, HttpError},
    mail::mails::{create_reset_link, send_forgot_password_email},
    middleware::{login_rate_limit, RateLimiter},
    models::usermodel::User,
    utils::{
        keys::{generate_reset_token, hash_token, sanitize_email},
        password, token,
    },
    AppState,
};

const RESET_TOKEN_MINUTES: i64 = 30;

pub fn auth_handler() -> Router {
    let limiter = Arc::new(RateLimiter::login());

    Router::new()
        .route("/register", post(register))
        .route(
            "/login",
            post(login).layer(middleware::from_fn_with_state(limiter.clone(), login_rate_limit)),
        )
        .route(
            "/google",
            post(google_login).layer(middleware::from_fn_with_state(limiter, login_rate_limit)),
        )
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let email = body.email.trim().to_lowercase();
    let email_key = sanitize_email(&email);

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&email_key), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::conflict(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password = password::hash(&body.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(
            body.name.trim().to_string(),
            email,
            email_key,
            body.phone,
            body.role,
            hashed_password,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HttpError::conflict(ErrorMessage::EmailExist.to_string())
            } else {
                HttpError::server_error(e.to_string())
            }
        })?;

    tracing::info!("Registered {} as {}", user.id, user.role.to_str());

    Ok((
        axum::http::StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&sanitize_email(&body.email)), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    session_response(&app_state, &user)
}

pub async fn google_login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<GoogleLoginDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let info = app_state.google.verify_id_token(&body.id_token).await?;

    let user = app_state
        .db_client
        .get_user(None, Some(&sanitize_email(&info.email)), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotRegistered.to_string()))?;

    session_response(&app_state, &user)
}

/// Issues a JWT in both the body and the http-only `token` cookie.
fn session_response(app_state: &AppState, user: &User) -> Result<AxumResponse, HttpError> {
    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .build();

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
        role: user.role.to_str().to_string(),
    })
    .into_response();

    let cookie_header = cookie
        .to_string()
        .parse()
        .map_err(|_| HttpError::server_error(ErrorMessage::ServerError.to_string()))?;
    response.headers_mut().append(header::SET_COOKIE, cookie_header);

    Ok(response)
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::minutes(-1))
        .http_only(true)
        .build();

    let mut response = Json(Response {
        status: "success",
        message: "Logged out".to_string(),
    })
    .into_response();

    let cookie_header = cookie
        .to_string()
        .parse()
        .map_err(|_| HttpError::server_error(ErrorMessage::ServerError.to_string()))?;
    response.headers_mut().append(header::SET_COOKIE, cookie_header);

    Ok(response)
}

pub async fn forgot_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&sanitize_email(&body.email)), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Email not registered"))?;

    let reset_token = generate_reset_token();
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES);

    app_state
        .db_client
        .set_reset_token(user.id, &hash_token(&reset_token), expires_at)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let reset_link = create_reset_link(&app_state.env.app_url, &reset_token);

    if let Err(e) = send_forgot_password_email(&user.email, &reset_link, &user.name).await {
        tracing::error!("Failed to send forgot password email: {}", e);
        return Err(HttpError::server_error("Failed to send email"));
    }

    Ok(Json(Response {
        message: "Password reset link has been sent to your email.".to_string(),
        status: "success",
    }))
}

pub async fn reset_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, None, Some(&hash_token(&body.token)))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request("Invalid or expired token"))?;

    match user.token_expires_at {
        Some(expires_at) if Utc::now() <= expires_at => {}
        _ => return Err(HttpError::bad_request("Invalid or expired token")),
    }

    let hash_password = password::hash(&body.new_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_user_password(user.id, hash_password)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        message: "Password has been successfully reset.".to_string(),
        status: "success",
    }))
}
