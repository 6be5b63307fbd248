//! Correlates outbound tasks with their eventual response.
//!
//! The original pipeline polled `response_queue` in a loop, matching
//! correlation ids client-side. That wastes a request thread per
//! in-flight call and adds polling latency. Here, one background task
//! owns the only consumer of `response_queue`; callers register a
//! correlation id before publishing their task and then await a
//! `oneshot` that the dispatcher wakes the instant the matching response
//! arrives, bounded by [`CorrelationDispatcher::await_response`]'s
//! timeout.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use judge_types::{queues, JudgeError, TaskResponse};
use tokio::sync::oneshot;
use uuid::Uuid;

use broker::{Broker, MessageStream};

pub struct CorrelationDispatcher {
    pending: DashMap<Uuid, oneshot::Sender<TaskResponse>>,
}

impl CorrelationDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: DashMap::new(),
        })
    }

    /// Registers interest in `correlation_id` before the task carrying it
    /// is published, so a response that arrives immediately after
    /// publish is never missed.
    fn register(&self, correlation_id: Uuid) -> oneshot::Receiver<TaskResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(correlation_id, tx);
        rx
    }

    /// Wakes whichever caller is waiting on this response's correlation
    /// id; a response with no registered waiter (already timed out, or
    /// a stray redelivery) is dropped.
    fn dispatch(&self, response: TaskResponse) {
        if let Some((_, tx)) = self.pending.remove(&response.correlation_id) {
            let _ = tx.send(response);
        } else {
            tracing::warn!(correlation_id = %response.correlation_id, "no waiter registered for response");
        }
    }

    /// Registers, publishes `payload` on `queue`, and awaits the matching
    /// response for up to `timeout`. On timeout, de-registers the waiter
    /// so a late response doesn't find a stale slot.
    pub async fn send_and_await(
        &self,
        broker: &Arc<dyn Broker>,
        queue: &str,
        correlation_id: Uuid,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<TaskResponse, JudgeError> {
        let rx = self.register(correlation_id);
        broker.publish(queue, payload).await?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(JudgeError::Unknown(
                "response dispatcher dropped without a reply".to_string(),
            )),
            Err(_) => {
                self.pending.remove(&correlation_id);
                Err(JudgeError::Timeout)
            }
        }
    }
}

/// The background task that owns `response_queue`'s only consumer and
/// wakes waiters as responses arrive. Runs until the broker connection
/// is lost beyond its own retry budget.
pub async fn run(broker: Arc<dyn Broker>, dispatcher: Arc<CorrelationDispatcher>) {
    let mut stream = match broker.consume(queues::RESPONSE_QUEUE).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "failed to subscribe to response queue");
            return;
        }
    };

    while let Some(delivery) = stream.next().await {
        match serde_json::from_slice::<TaskResponse>(&delivery.payload) {
            Ok(response) => dispatcher.dispatch(response),
            Err(e) => tracing::error!(error = %e, "dropping malformed task response"),
        }
        let _ = delivery.ack().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker::InMemoryBroker;
    use judge_types::EvaluateOutcome;

    #[tokio::test]
    async fn waiter_is_woken_by_a_matching_response() {
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new());
        broker.declare_queue(queues::RESPONSE_QUEUE).await.unwrap();
        let dispatcher = CorrelationDispatcher::new();

        let dispatch_broker = broker.clone();
        let dispatch_task = dispatcher.clone();
        let consumer = tokio::spawn(run(dispatch_broker, dispatch_task));

        let correlation_id = Uuid::new_v4();
        let rx = dispatcher.register(correlation_id);

        let response = TaskResponse::err(correlation_id, "boom");
        broker
            .publish(
                queues::RESPONSE_QUEUE,
                serde_json::to_vec(&response).unwrap(),
            )
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.correlation_id, correlation_id);
        assert_eq!(received.error.as_deref(), Some("boom"));
        consumer.abort();
    }

    #[tokio::test]
    async fn send_and_await_times_out_when_nothing_replies() {
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new());
        broker.declare_queue("orphan").await.unwrap();
        let dispatcher = CorrelationDispatcher::new();

        let correlation_id = Uuid::new_v4();
        let result = dispatcher
            .send_and_await(
                &broker,
                "orphan",
                correlation_id,
                b"irrelevant".to_vec(),
                Duration::from_millis(50),
            )
            .await;

        assert!(matches!(result, Err(JudgeError::Timeout)));
        assert!(!dispatcher.pending.contains_key(&correlation_id));
    }

    #[tokio::test]
    async fn send_and_await_resolves_once_dispatcher_wakes_it() {
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new());
        broker.declare_queue(queues::RESPONSE_QUEUE).await.unwrap();
        broker.declare_queue("tasks").await.unwrap();
        let dispatcher = CorrelationDispatcher::new();

        let consumer = tokio::spawn(run(broker.clone(), dispatcher.clone()));

        let correlation_id = Uuid::new_v4();
        let broker_for_responder = broker.clone();
        let responder = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let response = TaskResponse::ok(correlation_id, EvaluateOutcome::Error {
                error_message: "unused".to_string(),
            });
            broker_for_responder
                .publish(
                    queues::RESPONSE_QUEUE,
                    serde_json::to_vec(&response).unwrap(),
                )
                .await
                .unwrap();
        });

        let result = dispatcher
            .send_and_await(
                &broker,
                "tasks",
                correlation_id,
                b"task-payload".to_vec(),
                Duration::from_secs(2),
            )
            .await
            .unwrap();

        assert_eq!(result.correlation_id, correlation_id);
        responder.await.unwrap();
        consumer.abort();
    }
}
