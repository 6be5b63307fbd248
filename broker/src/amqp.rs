//! [`Broker`] over RabbitMQ via `lapin`, the async-native equivalent of
//! the `pika`-based client this judge's earlier Python incarnation used.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::options::{BasicConsumeOptions, BasicGetOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;

use judge_types::JudgeError;

use crate::queue::{AckHandle, Broker, Delivery, MessageStream};

const RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connects (with bounded retry) and holds a single channel shared across
/// publishes and gets; `consume` opens its own channel per subscription.
pub struct AmqpBroker {
    url: String,
    connection: Mutex<Connection>,
    channel: Mutex<Channel>,
}

impl AmqpBroker {
    pub async fn connect(url: impl Into<String>) -> Result<Self, JudgeError> {
        let url = url.into();
        let connection = connect_with_retry(&url).await?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        Ok(Self {
            url,
            connection: Mutex::new(connection),
            channel: Mutex::new(channel),
        })
    }

    async fn reconnect(&self) -> Result<(), JudgeError> {
        let connection = connect_with_retry(&self.url).await?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        *self.connection.lock().await = connection;
        *self.channel.lock().await = channel;
        Ok(())
    }
}

async fn connect_with_retry(url: &str) -> Result<Connection, JudgeError> {
    let mut last_err = None;
    for attempt in 1..=RECONNECT_ATTEMPTS {
        match Connection::connect(url, ConnectionProperties::default()).await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                tracing::error!(attempt, attempts = RECONNECT_ATTEMPTS, error = %e, "failed to connect to broker");
                last_err = Some(e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
    Err(JudgeError::BrokerFailure(format!(
        "failed to connect to broker after {RECONNECT_ATTEMPTS} attempts: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

#[async_trait]
impl Broker for AmqpBroker {
    async fn declare_queue(&self, queue: &str) -> Result<(), JudgeError> {
        self.channel
            .lock()
            .await
            .queue_declare(queue, QueueDeclareOptions {
                durable: true,
                ..Default::default()
            }, FieldTable::default())
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        Ok(())
    }

    async fn declare_ttl_queue(&self, queue: &str, ttl_ms: u32) -> Result<(), JudgeError> {
        let mut args = FieldTable::default();
        args.insert("x-message-ttl".into(), AMQPValue::LongUInt(ttl_ms));
        self.channel
            .lock()
            .await
            .queue_declare(queue, QueueDeclareOptions {
                durable: true,
                ..Default::default()
            }, args)
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), JudgeError> {
        let result = self
            .channel
            .lock()
            .await
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await;

        match result {
            Ok(confirm) => confirm
                .await
                .map(|_| ())
                .map_err(|e| JudgeError::BrokerFailure(e.to_string())),
            Err(e) => {
                tracing::error!(error = %e, "publish failed, reconnecting");
                self.reconnect().await?;
                self.channel
                    .lock()
                    .await
                    .basic_publish(
                        "",
                        queue,
                        BasicPublishOptions::default(),
                        &payload,
                        BasicProperties::default().with_delivery_mode(2),
                    )
                    .await
                    .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?
                    .await
                    .map(|_| ())
                    .map_err(|e| JudgeError::BrokerFailure(e.to_string()))
            }
        }
    }

    async fn get_one(&self, queue: &str) -> Result<Option<Vec<u8>>, JudgeError> {
        let message = self
            .channel
            .lock()
            .await
            .basic_get(queue, BasicGetOptions { no_ack: true })
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        Ok(message.map(|m| m.data))
    }

    async fn consume(&self, queue: &str) -> Result<Box<dyn MessageStream>, JudgeError> {
        let channel = self
            .connection
            .lock()
            .await
            .create_channel()
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        let consumer = channel
            .basic_consume(
                queue,
                "judge-worker",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| JudgeError::BrokerFailure(e.to_string()))?;
        Ok(Box::new(AmqpMessageStream { consumer }))
    }
}

struct AmqpMessageStream {
    consumer: lapin::Consumer,
}

#[async_trait]
impl MessageStream for AmqpMessageStream {
    async fn next(&mut self) -> Option<Delivery> {
        use futures::StreamExt;
        let delivery = self.consumer.next().await?.ok()?;
        Some(Delivery {
            payload: delivery.data.clone(),
            ack: AckHandle::Amqp(delivery.acker),
        })
    }
}

/// Declares all of a job's queues and wires up its response-queue TTL, the
/// bootstrap every worker/gateway process performs on start.
pub async fn declare_judge_queues(broker: &Arc<dyn Broker>) -> Result<(), JudgeError> {
    broker
        .declare_queue(judge_types::queues::CODE_EXECUTION_TASKS)
        .await?;
    broker
        .declare_queue(judge_types::queues::CODE_EVALUATION_TASKS)
        .await?;
    broker
        .declare_ttl_queue(
            judge_types::queues::RESPONSE_QUEUE,
            judge_types::queues::RESPONSE_QUEUE_TTL_MS,
        )
        .await?;
    Ok(())
}
