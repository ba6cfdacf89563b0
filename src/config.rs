//! # Configuration Module
//!
//! Two layers:
//!
//! - [`RouterConfig`] is what a dispatch reads: the URL prefix applied to
//!   templates at registration, the event mapper, and the error handler. It is
//!   changed through [`Router::configure`](crate::Router::configure) with a
//!   [`ConfigOptions`].
//! - [`Settings`] is the plain-data part (prefix and logging) that can come from
//!   a TOML file and from environment variables, for deployments that do not
//!   want to hard-code it.
//!
//! ## Environment Variables
//!
//! | Variable                    | Overrides     |
//! |-----------------------------|---------------|
//! | `LAMBDA_ROUTER_URL_PREFIX`  | `url_prefix`  |
//! | `LAMBDA_ROUTER_LOG_LEVEL`   | `log_level`   |
//! | `LAMBDA_ROUTER_LOG_FORMAT`  | `log_format`  |
//!
//! ## Example
//!
//! ```rust
//! use lambda_router::config::Settings;
//! use lambda_router::Router;
//!
//! let settings = Settings::from_toml_str(r#"url_prefix = "/my-api""#).unwrap();
//! let mut router = Router::new();
//! router.configure(settings.into_options());
//! assert_eq!(router.config().url_prefix, "/my-api");
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::sync::Arc;

use crate::dispatcher::default_error_handler;
use crate::error::RouterError;
use crate::event::{identity_mapper, MappedEvent, RawEvent};
use crate::logging::{LogConfig, LogFormat};
use crate::response::ErrorResponse;

pub type EventMapper = Arc<dyn Fn(&RawEvent) -> Result<MappedEvent, RouterError> + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&RouterError) -> ErrorResponse + Send + Sync>;

pub const ENV_URL_PREFIX: &str = "LAMBDA_ROUTER_URL_PREFIX";
pub const ENV_LOG_LEVEL: &str = "LAMBDA_ROUTER_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LAMBDA_ROUTER_LOG_FORMAT";

/// Configuration read by every dispatch.
#[derive(Clone)]
pub struct RouterConfig {
    /// Prepended verbatim to every template registered after it is set
    pub url_prefix: String,
    pub event_mapper: EventMapper,
    pub error_handler: ErrorHandler,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            url_prefix: String::new(),
            event_mapper: Arc::new(identity_mapper),
            error_handler: Arc::new(default_error_handler),
        }
    }
}

impl RouterConfig {
    /// Build a configuration from `options`; omitted fields take defaults.
    #[must_use]
    pub fn from_options(options: ConfigOptions) -> Self {
        let defaults = Self::default();
        Self {
            url_prefix: options.url_prefix.unwrap_or(defaults.url_prefix),
            event_mapper: options.event_mapper.unwrap_or(defaults.event_mapper),
            error_handler: options.error_handler.unwrap_or(defaults.error_handler),
        }
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("url_prefix", &self.url_prefix)
            .finish_non_exhaustive()
    }
}

/// Fields accepted by [`Router::configure`](crate::Router::configure).
#[derive(Clone, Default)]
pub struct ConfigOptions {
    pub url_prefix: Option<String>,
    pub event_mapper: Option<EventMapper>,
    pub error_handler: Option<ErrorHandler>,
}

impl ConfigOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn event_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&RawEvent) -> Result<MappedEvent, RouterError> + Send + Sync + 'static,
    {
        self.event_mapper = Some(Arc::new(mapper));
        self
    }

    #[must_use]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RouterError) -> ErrorResponse + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }
}

/// Deployment settings loadable from TOML and the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub url_prefix: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse router settings")
    }

    /// Read settings from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router settings from {}", path.display()))?;
        Ok(Self::from_toml_str(&raw)?.with_env_overrides())
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment in
    /// production).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(prefix) = lookup(ENV_URL_PREFIX) {
            self.url_prefix = Some(prefix);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = Some(format);
        }
        self
    }

    /// Router options carrying the configured prefix, defaults elsewhere.
    #[must_use]
    pub fn into_options(self) -> ConfigOptions {
        ConfigOptions {
            url_prefix: self.url_prefix,
            ..ConfigOptions::default()
        }
    }

    /// Logging configuration from the environment with these settings on top.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.format = LogFormat::parse(format);
        }
        config
    }
}
