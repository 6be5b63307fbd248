//! Shared bootstrap for the gateway and worker binaries: configuration
//! and logging setup.

pub mod config;

pub use config::{init_logging, ConfigError, JudgeConfig};
