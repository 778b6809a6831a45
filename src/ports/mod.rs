pub mod config;
pub mod notify;
pub mod stock;
pub mod store;

pub use config::ConfigStore;
pub use notify::NotificationSink;
pub use stock::StockService;
pub use store::PersistentStore;
