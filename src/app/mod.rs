pub mod cart;
pub mod controller;

pub use cart::CartStore;
pub use controller::AppController;
