//! Durable FIFO queue transport shared by the gateway and workers: an
//! AMQP-backed implementation for production, and an in-memory fake for
//! tests. See [`Broker`] for the abstraction both implement.

pub mod amqp;
pub mod in_memory;
pub mod queue;

pub use amqp::{declare_judge_queues, AmqpBroker};
pub use in_memory::InMemoryBroker;
pub use queue::{Broker, Delivery, MessageStream};
