//! RewardSync App
//!
//! Unified initialization for the RewardSync tools: logging + settings, plus
//! the validated run plans and the two top-level runs (`snapshot`, `claim`).

pub mod config;
pub mod run;

pub use config::{ClaimInputs, ClaimPlan, LedgerPlan, RewardSyncConfig, SnapshotPlan};
pub use run::{run_claim, run_snapshot};

use std::path::Path;

use rewardsync_logging::LogLevel;
use rewardsync_settings::{Settings, SettingsError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("Keystore error: {0}")]
    Keystore(#[from] rewardsync_keystore::KeystoreError),
    #[error(transparent)]
    Aggregator(#[from] rewardsync_aggregator::AggregatorError),
    #[error(transparent)]
    Ledger(#[from] rewardsync_ledger::LedgerError),
    #[error(transparent)]
    Claim(#[from] rewardsync_claimer::ClaimError),
}

/// Initialized application context
pub struct App<T> {
    pub service: String,
    pub settings: Settings<T>,
}

/// Builder for constructing an App with configurable options.
pub struct AppBuilder<T> {
    service: String,
    log_level: LogLevel,
    skip_logging: bool,
    skip_banner: bool,
    config_path: Option<String>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + Default> AppBuilder<T> {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            log_level: LogLevel::Info,
            skip_logging: false,
            skip_banner: false,
            config_path: None,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.log_level = LogLevel::from_verbose(verbose);
        self
    }

    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    /// Use an explicit settings file. It must exist.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> Result<App<T>, AppError> {
        // Initialize logging
        if !self.skip_logging {
            let _ = rewardsync_logging::try_init(self.log_level);
        }

        let settings = match self.config_path.as_deref() {
            Some(path) => Settings::load(Path::new(path))?,
            None => Settings::load_or_default(&self.service, None)?,
        };

        if !self.skip_banner {
            info!(
                "{} {} starting, settings: {}",
                self.service,
                env!("CARGO_PKG_VERSION"),
                settings.path().display(),
            );
        }

        Ok(App {
            service: self.service,
            settings,
        })
    }
}
