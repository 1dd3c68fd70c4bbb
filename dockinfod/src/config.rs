use std::path::{Path, PathBuf};
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::DEFAULT_LABEL_PREFIX;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/dockinfo/dockinfod.toml";
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    /// Engine URL, e.g. `unix:///var/run/docker.sock` or `tcp://10.0.0.2:2375`.
    /// Takes precedence over `socket`.
    pub host: Option<String>,
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Name or id of the container this daemon runs in. When unset the
    /// hostname is used, which Docker sets to the short container id.
    pub container: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` matches any run of characters
    #[serde(default = "default_origins")]
    pub origins: Vec<String>,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_socket() -> PathBuf {
    PathBuf::from(DEFAULT_DOCKER_SOCKET)
}

fn default_timeout() -> u64 {
    120
}

fn default_prefix() -> String {
    DEFAULT_LABEL_PREFIX.to_string()
}

fn default_origins() -> Vec<String> {
    vec!["https://royadler.de".to_string()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            host: None,
            socket: default_socket(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_origins(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `path` if given, otherwise from the default location when
    /// it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        match (var("HOST"), var("PORT")) {
            (Some(host), Some(port)) => self.api.listen = format!("{}:{}", host, port),
            (Some(host), None) => {
                let port = self.api.listen.rsplit(':').next().unwrap_or("8080").to_string();
                self.api.listen = format!("{}:{}", host, port);
            }
            (None, Some(port)) => {
                let host = self
                    .api
                    .listen
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                self.api.listen = format!("{}:{}", host, port);
            }
            (None, None) => {}
        }

        if let Some(host) = var("DOCKER_HOST") {
            self.docker.host = Some(host);
        }
        if let Some(socket) = var("DOCKER_SOCKET") {
            self.docker.socket = PathBuf::from(socket);
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.cors.origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(prefix) = var("DOCKINFO_LABEL_PREFIX") {
            self.labels.prefix = prefix;
        }
        if let Some(container) = var("DOCKINFO_CONTAINER") {
            self.identity.container = Some(container);
        }

        self
    }
}
