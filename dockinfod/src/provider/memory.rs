use async_trait::async_trait;
use crate::labels::RawLabels;
use super::{ContainerLabels, ContainerProvider, ProviderError};

/// Fixed container snapshot, in enumeration order
#[derive(Default)]
pub struct MemoryProvider {
    containers: Vec<ContainerLabels>,
    unavailable: bool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, labels: &[(&str, &str)]) -> Self {
        self.containers.push(ContainerLabels {
            name: format!("/{}", name),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<RawLabels>(),
        });
        self
    }

    /// Every call fails as if the runtime were down
    pub fn unavailable() -> Self {
        Self {
            containers: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl ContainerProvider for MemoryProvider {
    async fn get_container(&self, id: &str) -> Result<ContainerLabels, ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        self.containers
            .iter()
            .find(|c| c.name.trim_start_matches('/') == id.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerLabels>, ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(self.containers.clone())
    }
}
