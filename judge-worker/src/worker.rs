//! The worker role's task-dispatch loop (C3): an async task pool, sized
//! by `--concurrency`, each member consuming one of the two task queues
//! and publishing its result to `response_queue`. Evaluations within a
//! single task still run their testcases strictly sequentially; only the
//! pool itself is concurrent.

use std::path::PathBuf;
use std::sync::Arc;

use broker::{Broker, MessageStream};
use judge_types::{queues, Task, TaskPayload, TaskResponse};
use sandbox_executor::Executor;
use tokio::task::JoinSet;

use crate::core_client::CoreServiceClient;
use crate::pipeline::{evaluate_task, execute_task};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent consumers per queue.
    pub concurrency: usize,
    pub base_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            base_dir: PathBuf::from(sandbox_executor::workdir::DEFAULT_BASE_DIR),
        }
    }
}

/// Runs the worker pool until every consumer task exits (which in
/// practice means until the process is killed or the broker connection
/// is lost beyond its own retry budget).
pub async fn run(
    broker: Arc<dyn Broker>,
    executor: Arc<Executor>,
    core_client: Arc<dyn CoreServiceClient>,
    config: WorkerConfig,
) -> Result<(), judge_types::JudgeError> {
    broker.declare_queue(queues::CODE_EXECUTION_TASKS).await?;
    broker.declare_queue(queues::CODE_EVALUATION_TASKS).await?;
    broker
        .declare_ttl_queue(queues::RESPONSE_QUEUE, queues::RESPONSE_QUEUE_TTL_MS)
        .await?;

    let mut pool = JoinSet::new();
    for _ in 0..config.concurrency {
        pool.spawn(execution_consumer(
            broker.clone(),
            executor.clone(),
            config.base_dir.clone(),
        ));
    }
    for _ in 0..config.concurrency {
        pool.spawn(evaluation_consumer(
            broker.clone(),
            executor.clone(),
            core_client.clone(),
            config.base_dir.clone(),
        ));
    }

    while let Some(outcome) = pool.join_next().await {
        if let Err(e) = outcome {
            tracing::error!(error = %e, "worker consumer task panicked");
        }
    }
    Ok(())
}

async fn execution_consumer(broker: Arc<dyn Broker>, executor: Arc<Executor>, base_dir: PathBuf) {
    let mut stream = match broker.consume(queues::CODE_EXECUTION_TASKS).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to execution queue");
            return;
        }
    };

    while let Some(delivery) = stream.next().await {
        let task: Task = match serde_json::from_slice(&delivery.payload) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(error = %e, "dropping malformed execution task");
                let _ = delivery.nack(false).await;
                continue;
            }
        };

        let TaskPayload::Execute(req) = task.payload else {
            tracing::error!("execution queue carried a non-execute task, dropping");
            let _ = delivery.nack(false).await;
            continue;
        };

        let outcome = execute_task(&executor, &base_dir, &req).await;
        let response = TaskResponse::ok(task.correlation_id, outcome);
        publish_response(&broker, &response).await;
        let _ = delivery.ack().await;
    }
}

async fn evaluation_consumer(
    broker: Arc<dyn Broker>,
    executor: Arc<Executor>,
    core_client: Arc<dyn CoreServiceClient>,
    base_dir: PathBuf,
) {
    let mut stream = match broker.consume(queues::CODE_EVALUATION_TASKS).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to evaluation queue");
            return;
        }
    };

    while let Some(delivery) = stream.next().await {
        let task: Task = match serde_json::from_slice(&delivery.payload) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(error = %e, "dropping malformed evaluation task");
                let _ = delivery.nack(false).await;
                continue;
            }
        };

        let TaskPayload::Evaluate(req) = task.payload else {
            tracing::error!("evaluation queue carried a non-evaluate task, dropping");
            let _ = delivery.nack(false).await;
            continue;
        };

        let outcome = evaluate_task(&executor, &base_dir, &req).await;

        if let judge_types::EvaluateOutcome::Scored(result) = &outcome {
            if let Err(e) = core_client
                .update_leaderboard(&req.contest_id, &req.user_id, &req.problem_id, result)
                .await
            {
                tracing::error!(error = %e, "leaderboard update failed");
            }
            if let Err(e) = core_client
                .store_submission(&req.contest_id, &req.user_id, &req.problem_id, &req.code, result)
                .await
            {
                tracing::error!(error = %e, "submission store failed");
            }
        }

        let response = TaskResponse::ok(task.correlation_id, outcome);
        publish_response(&broker, &response).await;
        let _ = delivery.ack().await;
    }
}

async fn publish_response(broker: &Arc<dyn Broker>, response: &TaskResponse) {
    let payload = match serde_json::to_vec(response) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize task response");
            return;
        }
    };
    if let Err(e) = broker.publish(queues::RESPONSE_QUEUE, payload).await {
        tracing::error!(error = %e, "failed to publish task response");
    }
}
