use std::sync::Arc;
use shared::types::{FilteredPackageList, PackageList, ServiceRecord};
use crate::identity::{IdentityRequest, SelfIdentity};
use crate::labels::{FilterParseError, LabelFilter, LabelKeys};
use crate::provider::{ContainerProvider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{message}")]
    BadRequest {
        message: String,
        hint: Option<String>,
    },
    #[error("Container {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            hint: None,
        }
    }
}

impl From<ProviderError> for ResolveError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(id) => Self::NotFound(id),
            ProviderError::Unavailable(reason) => {
                tracing::warn!("Docker connection error: {}", reason);
                Self::Unavailable("Docker daemon not available".to_string())
            }
            ProviderError::Other(reason) => Self::Internal(reason),
        }
    }
}

/// Answers label queries against the current state of the runtime.
/// Holds only read-only state; each call is a fresh lookup.
pub struct QueryResolver {
    provider: Arc<dyn ContainerProvider>,
    keys: LabelKeys,
    self_identity: SelfIdentity,
}

impl QueryResolver {
    pub fn new(
        provider: Arc<dyn ContainerProvider>,
        keys: LabelKeys,
        self_identity: SelfIdentity,
    ) -> Self {
        Self {
            provider,
            keys,
            self_identity,
        }
    }

    /// Record for one container. Not gated on `<prefix>.enable`.
    pub async fn get_by_identifier(&self, id: &str) -> Result<ServiceRecord, ResolveError> {
        let container = self.provider.get_container(id).await?;
        Ok(self.keys.interpret(&container.labels, &container.name))
    }

    /// All containers that opted in, in runtime enumeration order
    pub async fn list_visible(&self) -> Result<PackageList, ResolveError> {
        let packages = self
            .provider
            .list_containers()
            .await?
            .iter()
            .map(|c| self.keys.interpret(&c.labels, &c.name))
            .filter(|record| record.visible)
            .collect::<Vec<_>>();

        Ok(PackageList::from(packages))
    }

    /// All containers carrying the exact label pair, whether or not they
    /// opted in
    pub async fn filter_by_label(&self, raw: &str) -> Result<FilteredPackageList, ResolveError> {
        let filter: LabelFilter = raw
            .parse()
            .map_err(|e: FilterParseError| ResolveError::bad_request(e.to_string()))?;

        let packages = self
            .provider
            .list_containers()
            .await?
            .iter()
            .filter(|c| filter.matches(&c.labels))
            .map(|c| self.keys.interpret(&c.labels, &c.name))
            .collect::<Vec<_>>();

        Ok(FilteredPackageList {
            filter: raw.to_string(),
            count: packages.len(),
            packages,
        })
    }

    /// Pick the target container named by the request
    pub fn resolve_identity<'a>(
        &self,
        request: &'a IdentityRequest,
    ) -> Result<&'a str, ResolveError> {
        let (source, id) = request.resolve().ok_or_else(|| ResolveError::BadRequest {
            message: "Container name required".to_string(),
            hint: Some("Set X-Container-Name header or container query parameter".to_string()),
        })?;
        tracing::debug!("Target container {} taken from {:?}", id, source);
        Ok(id)
    }

    /// Resolve the request's target and look it up
    pub async fn get_by_request(
        &self,
        request: &IdentityRequest,
    ) -> Result<ServiceRecord, ResolveError> {
        let id = self.resolve_identity(request)?;
        self.get_by_identifier(id).await
    }

    /// Record for the container this daemon runs in
    pub async fn self_record(&self) -> Result<ServiceRecord, ResolveError> {
        match &self.self_identity {
            SelfIdentity::Resolved(id) => self.get_by_identifier(id).await,
            SelfIdentity::Unresolved(reason) => {
                tracing::warn!("Self lookup refused, own container unresolved: {}", reason);
                Err(ResolveError::Unavailable(
                    "Own container could not be identified".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryProvider;

    fn resolver(provider: MemoryProvider) -> QueryResolver {
        QueryResolver::new(
            Arc::new(provider),
            LabelKeys::new("dockinfo"),
            SelfIdentity::Resolved("dockinfo".to_string()),
        )
    }

    fn fleet() -> MemoryProvider {
        MemoryProvider::new()
            .with(
                "svc-a",
                &[
                    ("dockinfo.enable", "true"),
                    ("dockinfo.name", "Svc A"),
                    ("dockinfo.service.url", "https://a.example"),
                ],
            )
            .with("svc-b", &[("dockinfo.enable", "TRUE"), ("dockinfo.name", "Svc B")])
            .with("svc-c", &[("team", "core")])
            .with(
                "dockinfo",
                &[
                    ("dockinfo.enable", "true"),
                    ("dockinfo.description", "Container metadata API"),
                    ("team", "core"),
                ],
            )
    }

    #[tokio::test]
    async fn test_get_by_identifier() {
        let record = resolver(fleet()).get_by_identifier("svc-a").await.unwrap();
        assert_eq!(record.name, "Svc A");
        assert_eq!(record.url.as_deref(), Some("https://a.example"));
        assert!(record.description.is_none());
    }

    #[tokio::test]
    async fn test_get_by_identifier_ignores_visibility() {
        let record = resolver(fleet()).get_by_identifier("svc-c").await.unwrap();
        assert_eq!(record.name, "svc-c");
        assert!(!record.visible);
    }

    #[tokio::test]
    async fn test_get_by_identifier_not_found() {
        let err = resolver(fleet()).get_by_identifier("ghost").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_list_visible_only_exact_true() {
        let list = resolver(fleet()).list_visible().await.unwrap();
        assert_eq!(list.count, 2);
        let names: Vec<_> = list.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Svc A", "dockinfo"]);
    }

    #[tokio::test]
    async fn test_filter_ignores_visibility() {
        let list = resolver(fleet()).filter_by_label("team=core").await.unwrap();
        assert_eq!(list.filter, "team=core");
        assert_eq!(list.count, 2);
        let names: Vec<_> = list.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["svc-c", "dockinfo"]);
    }

    #[tokio::test]
    async fn test_filter_on_enable_is_literal() {
        let list = resolver(fleet())
            .filter_by_label("dockinfo.enable=TRUE")
            .await
            .unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.packages[0].name, "Svc B");
        assert!(!list.packages[0].visible);
    }

    #[tokio::test]
    async fn test_filter_enable_true_matches_raw_pair() {
        let list = resolver(fleet())
            .filter_by_label("dockinfo.enable=true")
            .await
            .unwrap();
        let names: Vec<_> = list.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Svc A", "dockinfo"]);
    }

    #[tokio::test]
    async fn test_filter_malformed() {
        let err = resolver(fleet()).filter_by_label("team").await.unwrap_err();
        assert!(matches!(err, ResolveError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_request_without_identity() {
        let err = resolver(fleet())
            .get_by_request(&IdentityRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::BadRequest { hint: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_self_record() {
        let record = resolver(fleet()).self_record().await.unwrap();
        assert_eq!(record.name, "dockinfo");
        assert_eq!(record.description.as_deref(), Some("Container metadata API"));
    }

    #[tokio::test]
    async fn test_self_record_unresolved() {
        let resolver = QueryResolver::new(
            Arc::new(fleet()),
            LabelKeys::new("dockinfo"),
            SelfIdentity::Unresolved("not in a container".to_string()),
        );
        let err = resolver.self_record().await.unwrap_err();
        assert!(matches!(&err, ResolveError::Unavailable(_)));
        assert_eq!(err.to_string(), "Own container could not be identified");
    }

    #[tokio::test]
    async fn test_provider_down() {
        let err = resolver(MemoryProvider::unavailable())
            .list_visible()
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unavailable(_)));
    }
}
