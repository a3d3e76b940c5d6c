use std::path::PathBuf;

use crate::app::error::{Result, ScrivenerError};
use crate::config::Config;
use crate::runner::Runner;
use crate::scraper::{HumanLoop, SessionManager};
use crate::store::FsStore;

/// Loaded configuration plus the factories for a run's components
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(p) => p,
            None => Config::default_config_path().map_err(config_error)?,
        };
        let config = Config::load_from(&config_path).map_err(config_error)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn with_config(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn store(&self) -> FsStore {
        FsStore::new(&self.config.output.dir)
    }

    pub fn human_loop(&self) -> HumanLoop {
        HumanLoop::new(
            self.config.interaction.mode,
            self.config.interaction.wait_strategy(),
        )
    }

    pub fn runner(&self) -> Result<Runner<FsStore>> {
        let sessions = SessionManager::new(&self.config.session)?;
        Ok(Runner::new(
            &self.config.scraper,
            &self.config.classifier,
            sessions,
            self.human_loop(),
            self.store(),
        ))
    }
}

fn config_error(e: crate::config::ConfigError) -> ScrivenerError {
    ScrivenerError::Config(e.to_string())
}
