use thiserror::Error;

/// Domain-level errors for the cart engine.
#[derive(Error, Debug)]
pub enum CartError {
    #[error("requested quantity exceeds available stock for product {product_id}")]
    OutOfStock { product_id: u64 },

    #[error("product {product_id} is not in the cart")]
    ProductNotInCart { product_id: u64 },

    #[error("invalid cart amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("product {product_id} not found")]
    ProductNotFound { product_id: u64 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}
