/// Default prefix for the labels a container uses to describe itself
pub const DEFAULT_LABEL_PREFIX: &str = "dockinfo";

/// Label suffixes, joined to the prefix with a dot
pub const LABEL_ENABLE: &str = "enable";
pub const LABEL_NAME: &str = "name";
pub const LABEL_SERVICE_NAME: &str = "service.name";
pub const LABEL_SERVICE_URL: &str = "service.url";
pub const LABEL_URL: &str = "url";
pub const LABEL_DESCRIPTION: &str = "description";

/// Value `<prefix>.enable` must carry for a container to be listed
pub const ENABLE_VALUE: &str = "true";

/// Header a caller may use to name the container it asks about
pub const CONTAINER_HEADER: &str = "x-container-name";

/// Query parameters
pub const CONTAINER_QUERY: &str = "container";
pub const LABEL_QUERY: &str = "label";
