pub mod config;
pub mod heartbeat;
pub mod nav;
pub mod state;
pub mod tasks;
pub mod upgrade;

pub use config::{Config, ConfigManager};
pub use state::AppState;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::store::StatusField;

pub struct App {
    pub state: AppState,
}

impl App {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        status_tx: UnboundedSender<StatusField>,
    ) -> Result<Self> {
        let config = Arc::new(RwLock::new(config));

        // Create config manager with hot reload
        let config_manager = ConfigManager::new(Arc::clone(&config), config_path.clone());

        // Start watching for config changes
        if let Err(e) = Arc::clone(&config_manager).watch() {
            log::warn!("Failed to start config hot reload: {:#}", e);
        } else {
            log::info!("Config hot reload enabled for {:?}", config_manager.config_path());
        }

        let state = AppState::new(config, config_path, status_tx)?;

        Ok(Self { state })
    }

    pub async fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        self.state.handle_event(event).await
    }
}
