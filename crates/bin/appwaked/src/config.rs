//! Daemon configuration: activation timing, logging, and the registry seed.
//!
//! Read from `appwake.toml` in the working directory, or from the path in
//! `APPWAKE_CONFIG`. A missing file means all defaults. `APPWAKE_LAUNCH_WAIT_MS`,
//! `APPWAKE_LOG` and `RUST_LOG` override what the file says.

use std::time::Duration;

use serde::Deserialize;

use appwake_domain::application::{Application, ProtocolVersion};
use appwake_domain::error::AppWakeError;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Activation timing and queue sizes.
    pub activation: ActivationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Applications the registry starts with.
    pub applications: Vec<ApplicationConfig>,
}

/// Activation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// How long a launched application has to register, in milliseconds.
    pub app_launch_wait_time_ms: u64,
    /// Capacity of the HMI notification broadcast channel.
    pub event_bus_capacity: usize,
    /// Capacity of the activation request queue.
    pub request_queue_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One seeded application.
///
/// An omitted `protocol_version` means v1, as for a freshly built application.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub app_id: u32,
    pub hmi_app_id: u32,
    pub device: u64,
    pub protocol_version: u8,
    pub registered: bool,
    pub foreground: bool,
    pub schema_url: String,
    pub package_name: String,
}

impl ApplicationConfig {
    /// Convert into a validated domain [`Application`].
    ///
    /// # Errors
    ///
    /// Returns [`AppWakeError::Validation`] for an unknown protocol version or
    /// any violated application invariant.
    pub fn to_application(&self) -> Result<Application, AppWakeError> {
        let version = ProtocolVersion::try_from(self.protocol_version)?;
        Application::builder()
            .app_id(self.app_id)
            .hmi_app_id(self.hmi_app_id)
            .device(self.device)
            .protocol_version(version)
            .registered(self.registered)
            .foreground(self.foreground)
            .schema_url(self.schema_url.as_str())
            .package_name(self.package_name.as_str())
            .build()
    }
}

impl Config {
    /// Load configuration from `appwake.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("APPWAKE_CONFIG").unwrap_or_else(|_| "appwake.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("APPWAKE_LAUNCH_WAIT_MS")
            && let Ok(ms) = val.parse()
        {
            self.activation.app_launch_wait_time_ms = ms;
        }
        if let Ok(val) = std::env::var("APPWAKE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check semantic constraints, including every seeded application.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for zero durations or capacities,
    /// and [`ConfigError::Application`] for an invalid seeded application.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activation.app_launch_wait_time_ms == 0 {
            return Err(ConfigError::Validation(
                "app_launch_wait_time_ms must be non-zero".to_string(),
            ));
        }
        if self.activation.event_bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "event_bus_capacity must be non-zero".to_string(),
            ));
        }
        if self.activation.request_queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "request_queue_capacity must be non-zero".to_string(),
            ));
        }
        self.seed_applications()?;
        Ok(())
    }

    /// Wait budget for a launched application.
    #[must_use]
    pub fn launch_wait(&self) -> Duration {
        Duration::from_millis(self.activation.app_launch_wait_time_ms)
    }

    /// Seeded applications as domain values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Application`] for the first invalid entry.
    pub fn seed_applications(&self) -> Result<Vec<Application>, ConfigError> {
        self.applications
            .iter()
            .map(|app| app.to_application().map_err(ConfigError::from))
            .collect()
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            app_launch_wait_time_ms: 5000,
            event_bus_capacity: 256,
            request_queue_capacity: 64,
        }
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            hmi_app_id: 0,
            device: 0,
            protocol_version: ProtocolVersion::V1.into(),
            registered: false,
            foreground: false,
            schema_url: String::new(),
            package_name: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "appwaked=info,appwake_app=info,appwake_adapter_memory=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A seeded application violates domain invariants.
    #[error("invalid seeded application")]
    Application(#[from] AppWakeError),
}
