//! Sandbox Executor (C2): compiles a submission once, then runs it once
//! per testcase inside a fresh, resource-capped, network-disabled
//! container. See [`Executor`] for the public operations and
//! [`ContainerEngine`] for the container-runtime seam.

pub mod bollard_engine;
pub mod engine;
pub mod executor;
pub mod policy;
pub mod workdir;

pub use bollard_engine::BollardEngine;
pub use engine::{ContainerEngine, ContainerOutcome, ContainerSpec};
pub use executor::Executor;
pub use policy::ContainerPolicy;
pub use workdir::WorkDir;
