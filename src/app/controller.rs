use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{FileStore, HttpStockService, LogNotifier, TomlConfigStore};
use crate::app::CartStore;
use crate::domain::{AppConfig, CartError};
use crate::infrastructure::init_logging;
use crate::ports::{ConfigStore, NotificationSink};

/// Application controller that wires configuration, logging, and the cart
/// engine together for embedding hosts.
pub struct AppController {
    config: RwLock<AppConfig>,
    config_store: Arc<TomlConfigStore>,
    cart: Arc<CartStore>,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize the application controller with the default
    /// tracing-backed notifier.
    pub fn new() -> Result<Self, CartError> {
        Self::with_notifier(Arc::new(LogNotifier))
    }

    /// Initialize with a host-provided notification sink (e.g. one that
    /// renders toasts).
    pub fn with_notifier(notifier: Arc<dyn NotificationSink>) -> Result<Self, CartError> {
        // Step 1: Initialize config store
        let config_store = Arc::new(TomlConfigStore::new()?);

        // Step 2: Load configuration
        let config = config_store.load()?;

        // Step 3: Initialize logging
        let log_guard = init_logging(
            &config_store.logs_dir(),
            &config.logging.level,
            config.logging.file_logging,
        )?;

        info!("Storecart starting up");

        // Step 4: Build adapters and the cart engine
        let stock = Arc::new(HttpStockService::new(&config.api.base_url)?);
        let store = Arc::new(FileStore::new()?);
        let cart = Arc::new(CartStore::new(
            stock,
            store,
            notifier,
            config.storage.cart_key.clone(),
        ));

        info!(
            base_url = %config.api.base_url,
            "AppController initialized"
        );

        Ok(Self {
            config: RwLock::new(config),
            config_store,
            cart,
            _log_guard: log_guard,
        })
    }

    /// The cart engine.
    pub fn cart(&self) -> Arc<CartStore> {
        self.cart.clone()
    }

    /// Get the current configuration.
    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Update the configuration.
    ///
    /// API and storage changes take effect on the next startup; the
    /// running cart engine keeps its wiring.
    pub fn update_config(&self, config: AppConfig) -> Result<(), CartError> {
        self.config_store.save(&config)?;
        *self.config.write() = config;
        info!("Configuration updated");
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }
}
