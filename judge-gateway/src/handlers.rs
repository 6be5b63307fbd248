//! The HTTP surface (spec §6): `/execute` and `/evaluate` enqueue a task
//! and await its response; `/health` is a liveness probe.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use judge_types::{EvaluateRequest, ExecuteOutcome, ExecuteRequest, Task};

use crate::auth::{decode_jwt, Claims};
use crate::contest_client::APPROVED_REGISTRATION_STATUS;
use crate::error::AppError;
use crate::state::{GatewayState, EVALUATE_TIMEOUT, EXECUTE_TIMEOUT};

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Judge pipeline gateway is running",
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing or malformed Authorization header".to_string()))
}

fn authenticate(headers: &HeaderMap, state: &GatewayState) -> Result<Claims, AppError> {
    let token = bearer_token(headers)?;
    decode_jwt(token, &state.jwt_secret)
        .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))
}

pub async fn execute(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteOutcome>, AppError> {
    authenticate(&headers, &state)?;

    let task = Task::execute(req);
    let correlation_id = task.correlation_id;
    let queue = task.queue_name();
    let payload = serde_json::to_vec(&task)
        .map_err(|e| AppError::BadRequest(format!("failed to serialize task: {e}")))?;

    let response = state
        .dispatcher
        .send_and_await(&state.broker, queue, correlation_id, payload, EXECUTE_TIMEOUT)
        .await?;

    if let Some(error) = response.error {
        return Err(AppError::BadRequest(error));
    }
    let result = response
        .result
        .ok_or_else(|| AppError::BadRequest("response carried neither a result nor an error".to_string()))?;
    let outcome: ExecuteOutcome = serde_json::from_value(result)
        .map_err(|e| AppError::BadRequest(format!("malformed execute outcome: {e}")))?;
    Ok(Json(outcome))
}

/// What a client submits to `/evaluate`; testcases are resolved
/// server-side from the contest catalog rather than trusted from the
/// client.
#[derive(Debug, Deserialize)]
pub struct EvaluateSubmission {
    pub processor_id: judge_types::ProcessorId,
    pub code: String,
    pub contest_id: String,
    pub problem_id: String,
    pub user_id: String,
}

pub async fn evaluate(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(submission): Json<EvaluateSubmission>,
) -> Result<Json<judge_types::EvaluateOutcome>, AppError> {
    let claims = authenticate(&headers, &state)?;

    if submission.contest_id.trim().is_empty() || submission.problem_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "contest_id and problem_id are required".to_string(),
        ));
    }

    let entry = match state.catalog.get_contest(&submission.contest_id).await? {
        Some(entry) if entry.problem_id == submission.problem_id => entry,
        _ => {
            state
                .core_service
                .fetch_problem(&submission.contest_id, &submission.problem_id)
                .await?
        }
    };

    let is_approved_registrant = entry.registrations.iter().any(|registration| {
        registration.user.id == claims.sub && registration.status == APPROVED_REGISTRATION_STATUS
    });
    if !is_approved_registrant {
        return Err(AppError::Forbidden(
            "user is not an approved registration for this contest".to_string(),
        ));
    }

    let submission_count = state
        .core_service
        .fetch_submission_count(&submission.contest_id, &claims.sub, &submission.problem_id)
        .await?;
    if submission_count >= entry.max_submissions {
        return Err(AppError::Forbidden(
            "submission limit reached for this problem".to_string(),
        ));
    }

    let req = EvaluateRequest {
        processor_id: submission.processor_id,
        code: submission.code,
        contest_id: submission.contest_id,
        problem_id: submission.problem_id,
        user_id: claims.sub,
        testcases: entry.testcases,
    };

    let task = Task::evaluate(req);
    let correlation_id = task.correlation_id;
    let queue = task.queue_name();
    let payload = serde_json::to_vec(&task)
        .map_err(|e| AppError::BadRequest(format!("failed to serialize task: {e}")))?;

    let response = state
        .dispatcher
        .send_and_await(&state.broker, queue, correlation_id, payload, EVALUATE_TIMEOUT)
        .await?;

    if let Some(error) = response.error {
        return Err(AppError::BadRequest(error));
    }
    let result = response
        .result
        .ok_or_else(|| AppError::BadRequest("response carried neither a result nor an error".to_string()))?;
    let outcome: judge_types::EvaluateOutcome = serde_json::from_value(result)
        .map_err(|e| AppError::BadRequest(format!("malformed evaluate outcome: {e}")))?;
    Ok(Json(outcome))
}

pub(crate) const INTERNAL_API_KEY_HEADER: &str = "x-internal-api-key";

/// Validates the `X-Internal-Api-Key` header used by server-to-server
/// calls (e.g. the contest catalog refresh) instead of a user JWT.
pub fn authenticate_internal(headers: &HeaderMap, state: &GatewayState) -> Result<(), AppError> {
    let presented = headers
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing internal API key".to_string()))?;
    if crate::auth::internal_key_matches(presented, &state.internal_api_key) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid internal API key".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_strips_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_authorization_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());
    }
}
