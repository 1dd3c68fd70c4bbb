use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use anyhow::{Context, Result};
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::errors::Error as DockerError;
use bollard::Docker;
use crate::config::{DockerConfig, DEFAULT_DOCKER_SOCKET};
use super::{ContainerLabels, ContainerProvider, ProviderError};

/// Container metadata read from the Docker Engine API
#[derive(Clone)]
pub struct DockerProvider {
    client: Arc<Docker>,
}

impl DockerProvider {
    /// Build a client from configuration. Does not contact the daemon.
    pub fn connect(config: &DockerConfig) -> Result<Self> {
        let timeout = config.timeout_secs;
        let version = bollard::API_DEFAULT_VERSION;

        let client = match &config.host {
            Some(host) if host.starts_with("tcp://") || host.starts_with("http://") => {
                Docker::connect_with_http(host, timeout, version)
                    .with_context(|| format!("Failed to configure Docker client for {}", host))?
            }
            Some(host) => Docker::connect_with_socket(host, timeout, version)
                .with_context(|| format!("Failed to configure Docker client for {}", host))?,
            None if config.socket != Path::new(DEFAULT_DOCKER_SOCKET) => {
                let socket = config.socket.to_string_lossy();
                Docker::connect_with_socket(&socket, timeout, version)
                    .with_context(|| format!("Failed to configure Docker client for {}", socket))?
            }
            None => Docker::connect_with_defaults()
                .context("Failed to configure Docker client from defaults")?,
        };

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Check that the daemon answers
    pub async fn ping(&self) -> Result<()> {
        self.client
            .ping()
            .await
            .context("Docker daemon did not answer ping")?;
        Ok(())
    }
}

#[async_trait]
impl ContainerProvider for DockerProvider {
    async fn get_container(&self, id: &str) -> Result<ContainerLabels, ProviderError> {
        let container = self
            .client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| map_error(id, e))?;

        Ok(ContainerLabels {
            name: container.name.unwrap_or_else(|| id.to_string()),
            labels: container
                .config
                .and_then(|c| c.labels)
                .unwrap_or_default(),
        })
    }

    async fn list_containers(&self) -> Result<Vec<ContainerLabels>, ProviderError> {
        let options = Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        });
        let containers = self
            .client
            .list_containers(options)
            .await
            .map_err(|e| map_error("*", e))?;

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let name = c
                    .names
                    .and_then(|names| names.into_iter().next())
                    .or(c.id)?;
                Some(ContainerLabels {
                    name,
                    labels: c.labels.unwrap_or_default(),
                })
            })
            .collect())
    }
}

fn map_error(id: &str, err: DockerError) -> ProviderError {
    match err {
        DockerError::DockerResponseServerError {
            status_code: 404, ..
        } => ProviderError::NotFound(id.to_string()),
        DockerError::IOError { .. }
        | DockerError::RequestTimeoutError
        | DockerError::SocketNotFoundError(_)
        | DockerError::HyperLegacyError { .. } => ProviderError::Unavailable(err.to_string()),
        other => ProviderError::Other(other.to_string()),
    }
}
