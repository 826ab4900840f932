//! Configuration management for pakcache.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration for the pakcache server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::Error::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed.
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Validate the configuration at startup.
    ///
    /// A configuration that fails here must prevent the service from
    /// becoming ready; these conditions are never reported per request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the store root does not exist, the
    /// token is empty, or no authentication headers are configured.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.storage.root.is_dir() {
            return Err(crate::Error::Config(format!(
                "store root {} does not exist or is not a directory",
                self.storage.root.display()
            )));
        }
        if self.auth.token.trim().is_empty() {
            return Err(crate::Error::Config("auth.token must not be empty".into()));
        }
        if self.auth.headers.is_empty() {
            return Err(crate::Error::Config("auth.headers must not be empty".into()));
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind: SocketAddr,
    /// Path to TLS certificate file (optional).
    pub tls_cert: Option<PathBuf>,
    /// Path to TLS private key file (optional).
    pub tls_key: Option<PathBuf>,
    /// Maximum request body size in bytes. Set to 0 for unlimited.
    ///
    /// Build artifacts can be arbitrarily large, so the default places
    /// no limit on uploads.
    pub max_body_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:15151".parse().expect("valid default address"),
            tls_cert: None,
            tls_key: None,
            max_body_size: 0,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory under which all cached artifacts live. Must exist at
    /// startup.
    pub root: PathBuf,
    /// Extension forced onto every physical file name, replacing
    /// whatever extension the requested key carries. Keys differing
    /// only in extension then alias to one artifact.
    pub enforce_extension: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("./cache"), enforce_extension: None }
    }
}

impl StorageConfig {
    /// Returns the enforced extension normalized to start with a dot,
    /// or `None` if the setting is absent or blank.
    #[must_use]
    pub fn enforced_extension(&self) -> Option<String> {
        let ext = self.enforce_extension.as_deref()?.trim();
        if ext.is_empty() {
            return None;
        }
        if ext.starts_with('.') {
            Some(ext.to_string())
        } else {
            Some(format!(".{ext}"))
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The shared secret expected in `Token <secret>` credentials.
    pub token: String,
    /// Names of the headers inspected for a credential, in order.
    pub headers: Vec<String>,
    /// Whether retrieval and existence checks are public. Store,
    /// delete and list always require the token.
    pub public_reads: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token: String::new(), headers: vec!["Authorization".to_string()], public_reads: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
    /// Include HTTP request/response logging.
    pub log_requests: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty, log_requests: true }
    }
}
