use crate::provider::{ContainerProvider, ProviderError};

/// Where a target container name came from, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Path,
    Query,
    Header,
}

/// The candidate names a single request carries. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct IdentityRequest {
    pub path: Option<String>,
    pub query: Option<String>,
    pub header: Option<String>,
}

impl IdentityRequest {
    /// First source that is present, in precedence order
    pub fn resolve(&self) -> Option<(IdentitySource, &str)> {
        [
            (IdentitySource::Path, &self.path),
            (IdentitySource::Query, &self.query),
            (IdentitySource::Header, &self.header),
        ]
        .into_iter()
        .find_map(|(source, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (source, v))
        })
    }
}

/// This daemon's own container, resolved once at startup
#[derive(Debug, Clone)]
pub enum SelfIdentity {
    Resolved(String),
    Unresolved(String),
}

impl SelfIdentity {
    /// Confirm the candidate identifier against the runtime. An unknown
    /// container is kept as a failure for the life of the process; an
    /// unreachable runtime keeps the candidate, so later lookups can succeed.
    pub async fn resolve<P>(provider: &P, candidate: Option<String>) -> Self
    where
        P: ContainerProvider + ?Sized,
    {
        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            tracing::warn!("No container identifier available for self lookup");
            return Self::Unresolved("no container identifier configured".to_string());
        };

        match provider.get_container(&candidate).await {
            Ok(container) => {
                tracing::info!("Running as container {} ({})", container.name, candidate);
                Self::Resolved(candidate)
            }
            Err(ProviderError::Unavailable(reason)) => {
                tracing::warn!(
                    "Docker unavailable, keeping {} as own container unverified: {}",
                    candidate,
                    reason
                );
                Self::Resolved(candidate)
            }
            Err(e) => {
                tracing::warn!("Could not identify own container {}: {}", candidate, e);
                Self::Unresolved(e.to_string())
            }
        }
    }
}

/// Configured container name, else `HOSTNAME`, else the system hostname
pub fn candidate(configured: Option<&str>) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var("HOSTNAME").ok())
        .filter(|c| !c.is_empty())
        .or_else(|| {
            hostname::get()
                .ok()
                .map(|h| h.to_string_lossy().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryProvider;

    fn request(path: Option<&str>, query: Option<&str>, header: Option<&str>) -> IdentityRequest {
        IdentityRequest {
            path: path.map(str::to_string),
            query: query.map(str::to_string),
            header: header.map(str::to_string),
        }
    }

    #[test]
    fn test_path_beats_query_and_header() {
        let req = request(Some("from-path"), Some("from-query"), Some("from-header"));
        assert_eq!(req.resolve(), Some((IdentitySource::Path, "from-path")));
    }

    #[test]
    fn test_query_beats_header() {
        let req = request(None, Some("from-query"), Some("from-header"));
        assert_eq!(req.resolve(), Some((IdentitySource::Query, "from-query")));
    }

    #[test]
    fn test_header_alone() {
        let req = request(None, None, Some("from-header"));
        assert_eq!(req.resolve(), Some((IdentitySource::Header, "from-header")));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let req = request(None, Some(""), Some("from-header"));
        assert_eq!(req.resolve(), Some((IdentitySource::Header, "from-header")));
        assert_eq!(request(None, Some(""), None).resolve(), None);
        assert_eq!(IdentityRequest::default().resolve(), None);
    }

    #[test]
    fn test_configured_candidate_wins() {
        assert_eq!(candidate(Some("dockinfo")).as_deref(), Some("dockinfo"));
    }

    #[tokio::test]
    async fn test_self_identity_resolved() {
        let provider = MemoryProvider::new().with("dockinfo", &[]);
        let identity = SelfIdentity::resolve(&provider, Some("dockinfo".to_string())).await;
        assert!(matches!(identity, SelfIdentity::Resolved(id) if id == "dockinfo"));
    }

    #[tokio::test]
    async fn test_self_identity_unknown_container() {
        let provider = MemoryProvider::new();
        let identity = SelfIdentity::resolve(&provider, Some("3f2a9c".to_string())).await;
        assert!(matches!(identity, SelfIdentity::Unresolved(_)));
    }

    #[tokio::test]
    async fn test_self_identity_survives_runtime_outage() {
        let provider = MemoryProvider::unavailable();
        let identity = SelfIdentity::resolve(&provider, Some("dockinfo".to_string())).await;
        assert!(matches!(identity, SelfIdentity::Resolved(id) if id == "dockinfo"));
    }

    #[tokio::test]
    async fn test_self_identity_without_candidate() {
        let provider = MemoryProvider::new().with("dockinfo", &[]);
        let identity = SelfIdentity::resolve(&provider, None).await;
        assert!(matches!(identity, SelfIdentity::Unresolved(_)));
    }
}
