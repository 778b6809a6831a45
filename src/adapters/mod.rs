pub mod config_store;
pub mod file_store;
pub mod http_stock;
pub mod notifier;

pub use config_store::TomlConfigStore;
pub use file_store::FileStore;
pub use http_stock::HttpStockService;
pub use notifier::{ChannelNotifier, LogNotifier};
