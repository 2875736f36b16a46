//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `SHARED_LISTS_*` environment variables and optional
//! configuration files. Raw strings are kept as loaded and interpreted by
//! the accessors so one bad value produces one descriptive [`ConfigError`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{ConcurrencyPolicy, Locale};

/// Which list sync strategy backs the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// In-memory store with artificial latency.
    #[default]
    Mock,
    /// HTTP Persistence Service.
    Remote,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mock => "mock",
            Self::Remote => "remote",
        })
    }
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "remote" => Ok(Self::Remote),
            _ => Err(ConfigError::UnknownSyncMode(value.to_owned())),
        }
    }
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `sync_mode` is neither `mock` nor `remote`.
    #[error("unknown sync mode '{0}', expected 'mock' or 'remote'")]
    UnknownSyncMode(String),
    /// Remote mode needs somewhere to talk to.
    #[error("persistence_url is required when sync_mode is 'remote'")]
    MissingPersistenceUrl,
    /// `persistence_url` did not parse.
    #[error("invalid persistence_url '{url}': {message}")]
    InvalidPersistenceUrl {
        /// Raw configured value.
        url: String,
        /// Parser message.
        message: String,
    },
    /// `locale` is not one of the shipped languages.
    #[error("unsupported locale '{0}', expected 'en' or 'cs'")]
    UnsupportedLocale(String),
}

/// Settings controlling how the core persists shopping lists.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHARED_LISTS")]
pub struct SharedListsSettings {
    /// `mock` or `remote`.
    pub sync_mode: Option<String>,
    /// Base URL of the Persistence Service.
    pub persistence_url: Option<String>,
    /// Upper bound on one persistence round trip.
    #[ortho_config(default = 5000)]
    pub request_timeout_ms: u64,
    /// Artificial delay applied by the mock strategy.
    #[ortho_config(default = 200)]
    pub mock_latency_ms: u64,
    /// Seed file for the mock strategy; the bundled seed is used otherwise.
    pub mock_seed_path: Option<PathBuf>,
    /// Send the last seen revision with every update.
    #[ortho_config(default = false)]
    pub optimistic_concurrency: bool,
    /// Default locale for user-facing messages.
    pub locale: Option<String>,
}

impl SharedListsSettings {
    /// Configured sync mode, defaulting to [`SyncMode::Mock`].
    pub fn sync_mode(&self) -> Result<SyncMode, ConfigError> {
        self.sync_mode
            .as_deref()
            .map_or(Ok(SyncMode::default()), str::parse)
    }

    /// Parsed Persistence Service URL, if one is configured.
    pub fn persistence_url(&self) -> Result<Option<Url>, ConfigError> {
        self.persistence_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|error| ConfigError::InvalidPersistenceUrl {
                    url: raw.to_owned(),
                    message: error.to_string(),
                })
            })
            .transpose()
    }

    /// Persistence Service URL, required in remote mode.
    pub fn require_persistence_url(&self) -> Result<Url, ConfigError> {
        self.persistence_url()?
            .ok_or(ConfigError::MissingPersistenceUrl)
    }

    /// Bound applied to every persistence call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Delay applied by the mock strategy before each call.
    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    /// Write policy implied by `optimistic_concurrency`.
    pub fn concurrency_policy(&self) -> ConcurrencyPolicy {
        if self.optimistic_concurrency {
            ConcurrencyPolicy::RevisionChecked
        } else {
            ConcurrencyPolicy::LastWriteWins
        }
    }

    /// Configured locale, defaulting to English.
    pub fn locale(&self) -> Result<Locale, ConfigError> {
        self.locale.as_deref().map_or(Ok(Locale::default()), |raw| {
            raw.parse()
                .map_err(|_| ConfigError::UnsupportedLocale(raw.to_owned()))
        })
    }
}
