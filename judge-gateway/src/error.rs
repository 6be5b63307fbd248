//! Maps [`JudgeError`] (and a couple of gateway-only failures) onto HTTP
//! status codes and a `{"error": "..."}` body, the shape every handler
//! returns on failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use judge_types::JudgeError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub enum AppError {
    Judge(JudgeError),
    Unauthorized(String),
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
}

impl From<JudgeError> for AppError {
    fn from(err: JudgeError) -> Self {
        AppError::Judge(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Judge(err) => (status_for(&err), err.to_string()),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

fn status_for(err: &JudgeError) -> StatusCode {
    match err {
        JudgeError::UnsupportedProcessor(_) => StatusCode::BAD_REQUEST,
        JudgeError::CompileError { .. }
        | JudgeError::RuntimeError { .. }
        | JudgeError::TimeLimitExceeded
        | JudgeError::MemoryLimitExceeded
        | JudgeError::SegmentationFault(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JudgeError::FileNotFound(_) => StatusCode::NOT_FOUND,
        JudgeError::EngineUnavailable(_) | JudgeError::BrokerFailure(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        JudgeError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        JudgeError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
