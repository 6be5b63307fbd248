//! [`ContainerEngine`] implementation over the Docker Engine API via
//! `bollard`, the async-native equivalent of the `docker` SDK used by this
//! judge's earlier Python incarnation.

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::models::{HostConfig, ResourcesUlimits};
use bollard::Docker;
use futures::StreamExt;
use uuid::Uuid;

use judge_types::JudgeError;

use crate::engine::{ContainerEngine, ContainerOutcome, ContainerSpec};

pub struct BollardEngine {
    docker: Docker,
}

impl BollardEngine {
    /// Connects to the local Docker daemon using the same defaults as the
    /// `docker` CLI (`DOCKER_HOST`, or the platform's default socket).
    pub fn connect() -> Result<Self, JudgeError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| JudgeError::EngineUnavailable(e.to_string()))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerEngine for BollardEngine {
    async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutcome, JudgeError> {
        self.docker
            .ping()
            .await
            .map_err(|e| JudgeError::EngineUnavailable(e.to_string()))?;

        let work_dir = spec.work_dir.to_string_lossy().to_string();
        let container_name = format!("judge-{}", Uuid::new_v4());

        let ulimits = vec![
            ResourcesUlimits {
                name: Some("nofile".to_string()),
                soft: Some(spec.policy.nofile_soft),
                hard: Some(spec.policy.nofile_hard),
            },
            ResourcesUlimits {
                name: Some("nproc".to_string()),
                soft: Some(spec.policy.nproc_soft),
                hard: Some(spec.policy.nproc_hard),
            },
        ];

        let host_config = HostConfig {
            binds: Some(vec![format!("{work_dir}:{work_dir}:rw")]),
            memory: Some(spec.policy.memory_bytes),
            memory_reservation: Some(spec.policy.memory_reservation_bytes),
            memory_swap: Some(spec.policy.memory_swap_bytes),
            memory_swappiness: Some(spec.policy.memory_swappiness),
            cpu_quota: Some(spec.policy.cpu_quota_us),
            cpu_period: Some(spec.policy.cpu_period_us),
            pids_limit: Some(spec.policy.pids_limit),
            ulimits: Some(ulimits),
            network_mode: Some("none".to_string()),
            privileged: Some(false),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(vec![
                "bash".to_string(),
                "-c".to_string(),
                spec.command.clone(),
            ]),
            working_dir: Some(work_dir.clone()),
            network_disabled: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            host_config: Some(host_config),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: container_name.as_str(),
            platform: None,
        };

        let container = self
            .docker
            .create_container(Some(create_options), config)
            .await
            .map_err(|e| JudgeError::Unknown(format!("failed to create container: {e}")))?;

        self.docker
            .start_container(&container.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| JudgeError::Unknown(format!("failed to start container: {e}")))?;

        let mut logs = String::new();
        let mut log_stream = self.docker.logs(
            &container.id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                follow: true,
                ..Default::default()
            }),
        );
        while let Some(chunk) = log_stream.next().await {
            match chunk {
                Ok(LogOutput::StdOut { message }) | Ok(LogOutput::StdErr { message }) => {
                    logs.push_str(&String::from_utf8_lossy(&message));
                }
                _ => {}
            }
        }

        let mut exit_code = 0i32;
        let mut wait_stream = self.docker.wait_container(
            &container.id,
            Some(WaitContainerOptions {
                condition: "not-running",
            }),
        );
        if let Some(Ok(response)) = wait_stream.next().await {
            exit_code = response.status_code as i32;
        }

        let _ = self
            .docker
            .remove_container(
                &container.id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;

        Ok(ContainerOutcome { exit_code, logs })
    }
}
