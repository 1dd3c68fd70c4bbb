use serde::{Deserialize, Serialize};

/// Discoverable identity of one container, derived from its labels.
/// Computed per request; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Display name, from labels or the container runtime name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the container opted into listings. Not part of the wire format.
    #[serde(skip)]
    pub visible: bool,
}

/// Body of `/packages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageList {
    pub count: usize,
    pub packages: Vec<ServiceRecord>,
}

impl From<Vec<ServiceRecord>> for PackageList {
    fn from(packages: Vec<ServiceRecord>) -> Self {
        Self {
            count: packages.len(),
            packages,
        }
    }
}

/// Body of `/by-label`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredPackageList {
    /// The filter exactly as the caller sent it
    pub filter: String,
    pub count: usize,
    pub packages: Vec<ServiceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
