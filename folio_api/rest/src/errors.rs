use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{contact::ApiContactFieldError, ApiMessage};

pub const INTERNAL_SERVER_ERROR: &str = "Error interno del servidor";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn message(code: StatusCode, message: &'static str) -> Response {
    (code, Json(ApiMessage { message })).into_response()
}

pub fn validation_error(message: &'static str, errors: Vec<ApiContactFieldError>) -> Response {
    #[derive(Serialize)]
    struct ApiValidationError {
        message: &'static str,
        errors: Vec<ApiContactFieldError>,
    }

    (
        StatusCode::BAD_REQUEST,
        Json(ApiValidationError { message, errors }),
    )
        .into_response()
}
