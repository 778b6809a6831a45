#![forbid(unsafe_code)]

//! Client-side shopping cart state management.
//!
//! The cart engine ([`CartStore`]) holds the current cart, validates
//! every mutation against remote stock, mirrors successful mutations to
//! durable local storage, and reports failures to a notification sink.
//! The HTTP API, the storage backend, and the notification mechanism sit
//! behind ports; [`AppController`] wires the default adapters together.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use app::{AppController, CartStore};
pub use domain::{AppConfig, Cart, CartError, Product, ProductInfo, StockRecord};
pub use ports::{ConfigStore, NotificationSink, PersistentStore, StockService};
