//! The `Broker` seam: durable FIFO queues with publish, non-destructive
//! get-one, and a consumer stream, matching the semantics spec §4.3.1
//! assumes of the underlying message broker.

use async_trait::async_trait;
use judge_types::JudgeError;

/// A single message pulled off a queue, carrying an acknowledgement
/// handle so the worker can ack on success or nack (requeue) on failure.
pub struct Delivery {
    pub payload: Vec<u8>,
    pub(crate) ack: AckHandle,
}

impl Delivery {
    pub async fn ack(self) -> Result<(), JudgeError> {
        self.ack.ack().await
    }

    pub async fn nack(self, requeue: bool) -> Result<(), JudgeError> {
        self.ack.nack(requeue).await
    }
}

pub(crate) enum AckHandle {
    Amqp(lapin::acker::Acker),
    /// The in-memory broker has no redelivery queue; ack/nack are no-ops
    /// beyond bookkeeping already done at `get`/`next` time.
    InMemory,
}

impl AckHandle {
    async fn ack(self) -> Result<(), JudgeError> {
        match self {
            AckHandle::Amqp(acker) => acker
                .ack(lapin::options::BasicAckOptions::default())
                .await
                .map_err(|e| JudgeError::BrokerFailure(e.to_string())),
            AckHandle::InMemory => Ok(()),
        }
    }

    async fn nack(self, requeue: bool) -> Result<(), JudgeError> {
        match self {
            AckHandle::Amqp(acker) => acker
                .nack(lapin::options::BasicNackOptions {
                    requeue,
                    ..Default::default()
                })
                .await
                .map_err(|e| JudgeError::BrokerFailure(e.to_string())),
            AckHandle::InMemory => Ok(()),
        }
    }
}

/// A stream of deliveries from one `consume` subscription.
#[async_trait]
pub trait MessageStream: Send {
    async fn next(&mut self) -> Option<Delivery>;
}

/// Durable FIFO queues, published to by the gateway and consumed by
/// workers; `response_queue` additionally carries a per-message TTL.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn declare_queue(&self, queue: &str) -> Result<(), JudgeError>;

    /// Declares a queue whose messages expire after `ttl_ms` — used for
    /// `response_queue` so an abandoned correlation-id self-purges.
    async fn declare_ttl_queue(&self, queue: &str, ttl_ms: u32) -> Result<(), JudgeError>;

    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), JudgeError>;

    /// Non-destructive get-one: pops and auto-acks a single message if
    /// one is available, or returns `None` immediately.
    async fn get_one(&self, queue: &str) -> Result<Option<Vec<u8>>, JudgeError>;

    async fn consume(&self, queue: &str) -> Result<Box<dyn MessageStream>, JudgeError>;
}
