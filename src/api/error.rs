use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::Error;

const GENERIC_INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// Errors produced at the HTTP edge on top of the domain taxonomy.
#[derive(Debug)]
pub enum ApiError {
    Domain(Error),
    TooManyRequests { retry_after_secs: u64 },
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Domain(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

pub fn status_of(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Internal(_) | Error::IO(_) | Error::Csv(_) | Error::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(err) => {
                let status = status_of(&err);
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = ?err, "Request failed with internal error");
                    GENERIC_INTERNAL_MESSAGE.to_string()
                } else {
                    tracing::warn!(status = %status, error = %err, "Request rejected");
                    client_message(err)
                };
                (status, Json(ErrorResponse { message })).into_response()
            }
            ApiError::TooManyRequests { retry_after_secs } => {
                let mut res = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse {
                        message: "Too many requests. Please try again later.".to_string(),
                    }),
                )
                    .into_response();
                res.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                res
            }
        }
    }
}

fn client_message(err: Error) -> String {
    match err {
        Error::Validation(msg) | Error::NotFound(msg) | Error::Upstream(msg) => msg,
        other => other.to_string(),
    }
}
