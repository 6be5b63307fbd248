//! Judge Pipeline, worker role (C3): consumes execution/evaluation
//! tasks off the broker, runs them through the sandbox executor, and
//! publishes results to `response_queue`. See [`worker::run`] for the
//! pool entry point and [`pipeline`] for the evaluation procedure.

pub mod core_client;
pub mod pipeline;
pub mod worker;

pub use core_client::{CoreServiceClient, HttpCoreServiceClient};
pub use pipeline::{evaluate_task, execute_task};
pub use worker::{run, WorkerConfig};
