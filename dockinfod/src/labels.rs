use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use shared::protocol::{
    ENABLE_VALUE, LABEL_DESCRIPTION, LABEL_ENABLE, LABEL_NAME, LABEL_SERVICE_NAME,
    LABEL_SERVICE_URL, LABEL_URL,
};
use shared::types::ServiceRecord;

/// Raw label mapping of one container, as reported by the runtime
pub type RawLabels = HashMap<String, String>;

/// Fully qualified label keys for one prefix, e.g. `dockinfo.enable`
#[derive(Debug, Clone)]
pub struct LabelKeys {
    pub enable: String,
    pub name: String,
    pub service_name: String,
    pub service_url: String,
    pub url: String,
    pub description: String,
}

impl LabelKeys {
    pub fn new(prefix: &str) -> Self {
        let key = |suffix: &str| format!("{}.{}", prefix, suffix);
        Self {
            enable: key(LABEL_ENABLE),
            name: key(LABEL_NAME),
            service_name: key(LABEL_SERVICE_NAME),
            service_url: key(LABEL_SERVICE_URL),
            url: key(LABEL_URL),
            description: key(LABEL_DESCRIPTION),
        }
    }

    /// Derive the service record for a container. Never fails: missing
    /// optional labels are simply left out of the record.
    pub fn interpret(&self, labels: &RawLabels, fallback_name: &str) -> ServiceRecord {
        let non_empty = |key: &String| labels.get(key).filter(|v| !v.is_empty());

        let name = non_empty(&self.name)
            .or_else(|| non_empty(&self.service_name))
            .cloned()
            .unwrap_or_else(|| fallback_name.trim_start_matches('/').to_string());

        let url = non_empty(&self.service_url)
            .or_else(|| labels.get(&self.url))
            .cloned();

        ServiceRecord {
            name,
            url,
            description: labels.get(&self.description).cloned(),
            visible: self.is_visible(labels),
        }
    }

    /// Only the exact, case-sensitive value `true` opts a container in
    pub fn is_visible(&self, labels: &RawLabels) -> bool {
        labels.get(&self.enable).map(String::as_str) == Some(ENABLE_VALUE)
    }
}

/// A single exact `key=value` match against a container's raw labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterParseError {
    #[error("Label filter must be in format key=value")]
    MissingSeparator,
    #[error("Label filter key must not be empty")]
    EmptyKey,
}

impl FromStr for LabelFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once('=').ok_or(FilterParseError::MissingSeparator)?;
        if key.is_empty() {
            return Err(FilterParseError::EmptyKey);
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl LabelFilter {
    pub fn matches(&self, labels: &RawLabels) -> bool {
        labels.get(&self.key) == Some(&self.value)
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
