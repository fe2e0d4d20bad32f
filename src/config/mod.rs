//! Configuration management for the ospap proxy
//!
//! Configuration is read once at startup from a TOML or JSON file, then
//! selected fields can be overridden from `OSPAP_*` environment variables.
//! Everything here is immutable after [`Config::load`] returns.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Base name of the configuration file searched for when no path is given
pub const CONFIG_FILE_STEM: &str = "ospap";

/// Smallest accepted polling interval in seconds
pub const MIN_POLLING_INTERVAL_SECS: u64 = 2;

/// Default outbound request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Default pause between a connect command and the connection re-check
pub const DEFAULT_CONNECT_DELAY_MS: u64 = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address of this service's HTTP API (`host:port` or `:port`)
    #[serde(default = "default_server_address")]
    pub server_address: String,

    /// Seconds between poll cycles; zero when unset, which fails validation
    #[serde(default)]
    pub polling_interval: u64,

    /// Printer controllers to poll, in display order
    #[serde(default)]
    pub printers: Vec<PrinterConfig>,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Milliseconds to wait after a connect command before re-checking
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,

    /// Enable permissive CORS on the public API
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Enable HTTP request tracing
    #[serde(default = "default_true")]
    pub enable_request_logging: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// File the configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// One polled printer controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Display name, also the join key for clients
    pub name: String,

    /// Base URL of the controller, e.g. `http://octopi.local`
    pub server_address: String,

    /// Controller API key; empty means unauthenticated requests
    #[serde(default)]
    pub api_key: String,

    /// Ask the controller to connect to its printer when found disconnected
    #[serde(default)]
    pub auto_connect: bool,
}

impl PrinterConfig {
    /// Create a printer config with no key and auto-connect disabled
    pub fn new(name: impl Into<String>, server_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_address: server_address.into(),
            api_key: String::new(),
            auto_connect: false,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Enable/disable auto-connect
    pub fn with_auto_connect(mut self, enable: bool) -> Self {
        self.auto_connect = enable;
        self
    }

    /// API key, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn default_server_address() -> String {
    String::from("0.0.0.0:8080")
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_delay_ms() -> u64 {
    DEFAULT_CONNECT_DELAY_MS
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            polling_interval: 10,
            printers: Vec::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_delay_ms: DEFAULT_CONNECT_DELAY_MS,
            enable_cors: true,
            enable_request_logging: true,
            logging: LoggingConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Locate, read, override and validate the configuration
    ///
    /// With an explicit path only that file is used. Otherwise the first
    /// `ospap.toml` / `ospap.json` found in the executable's directory, the
    /// working directory or `$HOME` wins.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::discover(&Self::search_dirs()).ok_or_else(|| {
                Error::config(format!(
                    "no {CONFIG_FILE_STEM}.toml or {CONFIG_FILE_STEM}.json found; pass --config"
                ))
            })?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Directories searched for a configuration file, in priority order
    pub fn search_dirs() -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(dir);
        }
        dirs.push(PathBuf::from("."));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home));
        }
        dirs
    }

    /// First existing configuration file in the given directories
    pub fn discover(dirs: &[PathBuf]) -> Option<PathBuf> {
        dirs.iter()
            .flat_map(|dir| {
                ["toml", "json"]
                    .into_iter()
                    .map(move |ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            })
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from a file; `.json` files are JSON, everything else TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply `OSPAP_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(address) = std::env::var("OSPAP_SERVER_ADDRESS") {
            self.server_address = address;
        }

        if let Some(interval) = env_u64("OSPAP_POLLING_INTERVAL")? {
            self.polling_interval = interval;
        }

        if let Some(timeout) = env_u64("OSPAP_REQUEST_TIMEOUT")? {
            self.request_timeout_secs = timeout;
        }

        if let Ok(level) = std::env::var("OSPAP_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("OSPAP_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.polling_interval < MIN_POLLING_INTERVAL_SECS {
            return Err(Error::config(format!(
                "polling_interval not set or too low (got {}, minimum {MIN_POLLING_INTERVAL_SECS})",
                self.polling_interval
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }

        self.bind_address()?;

        for (index, printer) in self.printers.iter().enumerate() {
            if printer.name.trim().is_empty() {
                return Err(Error::config(format!("printers[{index}]: name is empty")));
            }

            let url = url::Url::parse(&printer.server_address).map_err(|e| {
                Error::config(format!(
                    "printers[{index}] ({}): invalid server_address '{}': {e}",
                    printer.name, printer.server_address
                ))
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::config(format!(
                    "printers[{index}] ({}): server_address must be http or https",
                    printer.name
                )));
            }
        }

        Ok(())
    }

    /// Socket address to bind; a bare `:port` binds all interfaces
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let address = self.server_address.trim();
        let address = if address.starts_with(':') {
            format!("0.0.0.0{address}")
        } else {
            address.to_string()
        };

        address.parse().map_err(|_| {
            Error::config(format!("invalid server_address '{}'", self.server_address))
        })
    }

    /// Polling interval as Duration
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Outbound request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Post-connect delay as Duration
    #[must_use]
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::config(format!("{name} must be a non-negative integer, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}
