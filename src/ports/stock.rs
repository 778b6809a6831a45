use async_trait::async_trait;

use crate::domain::{CartError, ProductInfo, StockRecord};

/// Stock/catalog lookup port. All product and stock reads go through
/// this interface; results are never cached by the cart.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the authoritative available quantity for a product.
    async fn stock(&self, product_id: u64) -> Result<StockRecord, CartError>;

    /// Fetch product metadata (title, price, image).
    async fn product(&self, product_id: u64) -> Result<ProductInfo, CartError>;
}
