use serde::{Deserialize, Serialize};

/// A product held in the cart, with the quantity currently selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: u64,
    /// Human-readable product title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Product image URI.
    pub image: String,
    /// Quantity of this product in the cart (always >= 1).
    pub amount: u32,
}

/// Product metadata as served by the catalog API, without a cart quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub image: String,
}

impl ProductInfo {
    /// Turn catalog metadata into a cart entry with the given quantity.
    pub fn into_product(self, amount: u32) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            amount,
        }
    }
}

/// Authoritative available quantity for a product, fetched on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: u64,
    pub amount: u32,
}

/// An ordered sequence of products, unique by id.
///
/// Cart values are immutable from the outside: every edit produces a new
/// Cart, leaving the original untouched. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by product id.
    pub fn get(&self, product_id: u64) -> Option<&Product> {
        self.items.iter().find(|p| p.id == product_id)
    }

    /// Whether the cart holds an entry for this product.
    pub fn contains(&self, product_id: u64) -> bool {
        self.get(product_id).is_some()
    }

    /// Quantity currently held for this product, 0 if absent.
    pub fn amount_of(&self, product_id: u64) -> u32 {
        self.get(product_id).map(|p| p.amount).unwrap_or(0)
    }

    /// New cart with the product appended.
    ///
    /// Callers must ensure the id is not already present; entries are
    /// unique by id.
    pub fn with_product(&self, product: Product) -> Cart {
        let mut items = self.items.clone();
        items.push(product);
        Cart { items }
    }

    /// New cart with the matching entry's amount replaced. All other
    /// entries and fields are unchanged, as is the ordering.
    pub fn with_amount(&self, product_id: u64, amount: u32) -> Cart {
        let items = self
            .items
            .iter()
            .map(|p| {
                if p.id == product_id {
                    Product { amount, ..p.clone() }
                } else {
                    p.clone()
                }
            })
            .collect();
        Cart { items }
    }

    /// New cart excluding the entry with this id.
    pub fn without(&self, product_id: u64) -> Cart {
        let items = self
            .items
            .iter()
            .filter(|p| p.id != product_id)
            .cloned()
            .collect();
        Cart { items }
    }

    /// Sum of `price * amount` over all entries.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|p| p.price * f64::from(p.amount))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Product>> for Cart {
    fn from(items: Vec<Product>) -> Self {
        Cart { items }
    }
}
