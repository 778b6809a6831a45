pub mod cart;
pub mod config;
pub mod error;

pub use cart::{Cart, Product, ProductInfo, StockRecord};
pub use config::AppConfig;
pub use error::CartError;
