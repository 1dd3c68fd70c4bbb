pub mod docker;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use crate::labels::RawLabels;

/// Name and raw labels of one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLabels {
    /// Runtime name. Docker reports it with a leading `/`.
    pub name: String,
    pub labels: RawLabels,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("container {0} not found")]
    NotFound(String),
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),
    #[error("container runtime error: {0}")]
    Other(String),
}

/// Read access to container names and labels.
///
/// Every call reflects whatever the runtime reports at that moment; the
/// implementation neither caches nor retries.
#[async_trait]
pub trait ContainerProvider: Send + Sync + 'static {
    /// Look up one container by name or id
    async fn get_container(&self, id: &str) -> Result<ContainerLabels, ProviderError>;

    /// Enumerate all containers, stopped ones included
    async fn list_containers(&self) -> Result<Vec<ContainerLabels>, ProviderError>;
}
