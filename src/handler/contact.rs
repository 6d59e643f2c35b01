use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    dtos::{jobdtos::ContactDto, userdtos::Response},
    error::HttpError,
    AppState,
};

pub fn contact_handler() -> Router {
    Router::new().route("/", post(send_contact_message))
}

pub async fn send_contact_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ContactDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state.contact.submit(&body).await?;

    Ok(Json(Response {
        status: "success",
        message,
    }))
}
