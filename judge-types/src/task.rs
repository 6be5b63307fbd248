//! The unit of work flowing through the broker: requests, tasks, and the
//! response envelope that carries a result back to the gateway.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::processor::ProcessorId;
use crate::result::EvaluationResult;
use crate::testcase::Testcase;

/// A one-shot code execution request (`POST /execute`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub processor_id: ProcessorId,
    pub code: String,
    #[serde(default)]
    pub stdin: Option<String>,
}

/// A full evaluation request (`POST /evaluate`), built up server-side from
/// the client's submission plus catalog-derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub processor_id: ProcessorId,
    pub code: String,
    pub contest_id: String,
    pub problem_id: String,
    pub user_id: String,
    pub testcases: Vec<Testcase>,
}

/// The payload half of a `Task`, tagged so the wire shape matches
/// `{"type": "execute" | "evaluate", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TaskPayload {
    Execute(ExecuteRequest),
    Evaluate(EvaluateRequest),
}

/// The unit of work flowing through the broker. `correlation_id` is a
/// fresh, unique token minted by the gateway at enqueue time and echoed
/// back in the matching response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub payload: TaskPayload,
    pub correlation_id: Uuid,
}

impl Task {
    pub fn execute(req: ExecuteRequest) -> Self {
        Self {
            payload: TaskPayload::Execute(req),
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn evaluate(req: EvaluateRequest) -> Self {
        Self {
            payload: TaskPayload::Evaluate(req),
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn queue_name(&self) -> &'static str {
        match self.payload {
            TaskPayload::Execute(_) => queues::CODE_EXECUTION_TASKS,
            TaskPayload::Evaluate(_) => queues::CODE_EVALUATION_TASKS,
        }
    }
}

/// Result of a one-shot `execute` task, as published back to the response
/// queue and returned by `POST /execute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecuteOutcome {
    Success {
        output: String,
        execution_time: f64,
    },
    Error {
        error_message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },
}

/// What an `evaluate` task resolves to: either the scored evaluation, or
/// an error that never reached scoring at all (distinct from a compile
/// error, which *does* produce a full `EvaluationResult`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluateOutcome {
    Scored(EvaluationResult),
    Error { error_message: String },
}

/// The `{correlation_id, result|error}` envelope published to
/// `response_queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub correlation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResponse {
    pub fn ok(correlation_id: Uuid, result: impl Serialize) -> Self {
        Self {
            correlation_id,
            result: Some(serde_json::to_value(result).expect("result must serialize")),
            error: None,
        }
    }

    pub fn err(correlation_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            correlation_id,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Broker queue names (spec §4.3.1 / §6).
pub mod queues {
    pub const CODE_EXECUTION_TASKS: &str = "code_execution_tasks";
    pub const CODE_EVALUATION_TASKS: &str = "code_evaluation_tasks";
    pub const RESPONSE_QUEUE: &str = "response_queue";
    /// TTL applied to `response_queue` messages, in milliseconds.
    pub const RESPONSE_QUEUE_TTL_MS: u32 = 5_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_queue_name_matches_payload_type() {
        let exec_task = Task::execute(ExecuteRequest {
            processor_id: ProcessorId::from("python3"),
            code: "print(1)".to_string(),
            stdin: None,
        });
        assert_eq!(exec_task.queue_name(), queues::CODE_EXECUTION_TASKS);

        let eval_task = Task::evaluate(EvaluateRequest {
            processor_id: ProcessorId::from("c++17"),
            code: "int main(){}".to_string(),
            contest_id: "c1".to_string(),
            problem_id: "p1".to_string(),
            user_id: "u1".to_string(),
            testcases: vec![],
        });
        assert_eq!(eval_task.queue_name(), queues::CODE_EVALUATION_TASKS);
    }

    #[test]
    fn task_response_round_trips_through_json() {
        let id = Uuid::new_v4();
        let resp = TaskResponse::ok(id, serde_json::json!({"ok": true}));
        let raw = serde_json::to_string(&resp).unwrap();
        let back: TaskResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.correlation_id, id);
        assert!(back.error.is_none());
    }
}
