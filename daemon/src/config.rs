//! Server configuration with TOML file support.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `WICKET_*`
//! environment variables, command-line flags. clap resolves the last two
//! into [`Overrides`].

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

use wicket_challenge::{ChallengeConfig, SecretKey};
use wicket_gate::GateConfig;
use wicket_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddr(String),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Server-only challenge secret. Unset is allowed; affected requests
    /// fail with a configuration error.
    #[serde(default)]
    pub recaptcha_secret_key: Option<SecretKey>,

    /// Client-visible widget key.
    #[serde(default)]
    pub recaptcha_site_key: Option<String>,

    /// Session key for the gate flag.
    #[serde(default)]
    pub gate_storage_key: Option<String>,

    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,

    /// Allowed CORS origins. Empty disables CORS.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./wicket_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_verify_url() -> String {
    wicket_challenge::config::DEFAULT_VERIFY_URL.to_string()
}

fn default_verify_timeout_secs() -> u64 {
    wicket_challenge::config::DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── CLI / env overrides ────────────────────────────────────────────────

#[derive(Clone, Debug, Default, clap::Args)]
pub struct Overrides {
    /// Interface to listen on.
    #[arg(long, env = "WICKET_BIND_ADDR")]
    pub bind_addr: Option<String>,

    /// HTTP port.
    #[arg(long, env = "WICKET_PORT")]
    pub port: Option<u16>,

    /// Data directory for account storage.
    #[arg(long, env = "WICKET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// LMDB map size in MiB.
    #[arg(long, env = "WICKET_MAP_SIZE_MB")]
    pub map_size_mb: Option<usize>,

    /// reCAPTCHA secret key.
    #[arg(long, env = "WICKET_RECAPTCHA_SECRET_KEY", hide_env_values = true)]
    pub recaptcha_secret_key: Option<String>,

    /// reCAPTCHA site key.
    #[arg(long, env = "WICKET_RECAPTCHA_SITE_KEY")]
    pub recaptcha_site_key: Option<String>,

    /// Session storage key for the gate flag.
    #[arg(long, env = "WICKET_GATE_STORAGE_KEY")]
    pub gate_storage_key: Option<String>,

    /// Challenge verification endpoint.
    #[arg(long, env = "WICKET_VERIFY_URL")]
    pub verify_url: Option<String>,

    /// Challenge verification timeout in seconds.
    #[arg(long, env = "WICKET_VERIFY_TIMEOUT_SECS")]
    pub verify_timeout_secs: Option<u64>,

    /// Allowed CORS origins (comma-separated, "*" for any).
    #[arg(long, env = "WICKET_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "WICKET_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WICKET_LOG_LEVEL")]
    pub log_level: Option<String>,
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply environment / command-line values on top of this config.
    pub fn apply(&mut self, o: Overrides) {
        if let Some(v) = o.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = o.port {
            self.port = v;
        }
        if let Some(v) = o.data_dir {
            self.data_dir = v;
        }
        if let Some(v) = o.map_size_mb {
            self.map_size_mb = v;
        }
        if let Some(v) = o.recaptcha_secret_key {
            self.recaptcha_secret_key = Some(SecretKey::new(v));
        }
        if let Some(v) = o.recaptcha_site_key {
            self.recaptcha_site_key = Some(v);
        }
        if let Some(v) = o.gate_storage_key {
            self.gate_storage_key = Some(v);
        }
        if let Some(v) = o.verify_url {
            self.verify_url = v;
        }
        if let Some(v) = o.verify_timeout_secs {
            self.verify_timeout_secs = v;
        }
        if !o.cors_origins.is_empty() {
            self.cors_origins = o.cors_origins;
        }
        if let Some(v) = o.log_format {
            self.log_format = v;
        }
        if let Some(v) = o.log_level {
            self.log_level = v;
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn challenge_config(&self) -> ChallengeConfig {
        ChallengeConfig {
            secret_key: self.recaptcha_secret_key.clone(),
            site_key: self.recaptcha_site_key.clone(),
            verify_url: self.verify_url.clone(),
            timeout_secs: self.verify_timeout_secs,
        }
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new(
            self.recaptcha_site_key.clone(),
            self.gate_storage_key.clone(),
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            recaptcha_secret_key: None,
            recaptcha_site_key: None,
            gate_storage_key: None,
            verify_url: default_verify_url(),
            verify_timeout_secs: default_verify_timeout_secs(),
            cors_origins: Vec::new(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
