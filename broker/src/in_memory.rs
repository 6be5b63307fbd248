//! An in-process [`Broker`] fake for tests: per-queue FIFO backed by a
//! `VecDeque`, with TTL expiry evaluated lazily on read.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use judge_types::JudgeError;

use crate::queue::{AckHandle, Broker, Delivery, MessageStream};

struct Entry {
    payload: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Default)]
struct Queues {
    ttl: HashMap<String, Duration>,
    messages: HashMap<String, VecDeque<Entry>>,
}

impl Queues {
    fn pop_front(&mut self, queue: &str) -> Option<Vec<u8>> {
        let pending = self.messages.get_mut(queue)?;
        while let Some(front) = pending.front() {
            if front.is_expired() {
                pending.pop_front();
                continue;
            }
            break;
        }
        pending.pop_front().map(|e| e.payload)
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A FIFO-per-queue broker fake with no network dependency, used by
/// worker and gateway tests in place of a running RabbitMQ.
#[derive(Default, Clone)]
pub struct InMemoryBroker {
    queues: Arc<Mutex<Queues>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn declare_queue(&self, queue: &str) -> Result<(), JudgeError> {
        self.queues
            .lock()
            .await
            .messages
            .entry(queue.to_string())
            .or_default();
        Ok(())
    }

    async fn declare_ttl_queue(&self, queue: &str, ttl_ms: u32) -> Result<(), JudgeError> {
        let mut queues = self.queues.lock().await;
        queues.messages.entry(queue.to_string()).or_default();
        queues
            .ttl
            .insert(queue.to_string(), Duration::from_millis(ttl_ms as u64));
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), JudgeError> {
        let mut queues = self.queues.lock().await;
        let ttl = queues.ttl.get(queue).copied();
        queues
            .messages
            .entry(queue.to_string())
            .or_default()
            .push_back(Entry {
                payload,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            });
        Ok(())
    }

    async fn get_one(&self, queue: &str) -> Result<Option<Vec<u8>>, JudgeError> {
        Ok(self.queues.lock().await.pop_front(queue))
    }

    async fn consume(&self, queue: &str) -> Result<Box<dyn MessageStream>, JudgeError> {
        self.queues
            .lock()
            .await
            .messages
            .entry(queue.to_string())
            .or_default();
        Ok(Box::new(InMemoryMessageStream {
            queue: queue.to_string(),
            queues: self.queues.clone(),
        }))
    }
}

/// Polls the shared queue on a short interval since the fake has no
/// blocking-wait primitive backing it.
struct InMemoryMessageStream {
    queue: String,
    queues: Arc<Mutex<Queues>>,
}

#[async_trait]
impl MessageStream for InMemoryMessageStream {
    async fn next(&mut self) -> Option<Delivery> {
        loop {
            if let Some(payload) = self.queues.lock().await.pop_front(&self.queue) {
                return Some(Delivery {
                    payload,
                    ack: AckHandle::InMemory,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_are_delivered_fifo() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q").await.unwrap();
        broker.publish("q", b"first".to_vec()).await.unwrap();
        broker.publish("q", b"second".to_vec()).await.unwrap();

        assert_eq!(broker.get_one("q").await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(
            broker.get_one("q").await.unwrap(),
            Some(b"second".to_vec())
        );
        assert_eq!(broker.get_one("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_one_on_undeclared_queue_is_none() {
        let broker = InMemoryBroker::new();
        assert_eq!(broker.get_one("nope").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_entries_expire_before_being_delivered() {
        let broker = InMemoryBroker::new();
        broker.declare_ttl_queue("responses", 100).await.unwrap();
        broker.publish("responses", b"stale".to_vec()).await.unwrap();

        tokio::time::advance(Duration::from_millis(150)).await;

        assert_eq!(broker.get_one("responses").await.unwrap(), None);
    }

    #[tokio::test]
    async fn consume_yields_published_messages_in_order() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q").await.unwrap();
        broker.publish("q", b"one".to_vec()).await.unwrap();

        let mut stream = broker.consume("q").await.unwrap();
        let delivery = stream.next().await.expect("message available");
        assert_eq!(delivery.payload, b"one");
        delivery.ack().await.unwrap();
    }
}
