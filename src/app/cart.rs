use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Cart, CartError};
use crate::ports::{NotificationSink, PersistentStore, StockService};

/// Which cart operation failed; selects the user-facing message.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Add,
    Remove,
    Update,
}

/// User-facing message for a failed operation, keyed by operation and
/// error tag. Only stock exhaustion gets its own message; every other
/// failure collapses into the operation's generic one.
fn failure_message(op: Operation, err: &CartError) -> &'static str {
    match (op, err) {
        (_, CartError::OutOfStock { .. }) => "Requested quantity out of stock",
        (Operation::Add, _) => "Error adding product",
        (Operation::Remove, _) => "Error removing product",
        (Operation::Update, _) => "Error updating product quantity",
    }
}

/// The cart engine: owns the current cart, validates mutations against
/// remote stock, and mirrors every successful mutation to the persistent
/// store before exposing it.
///
/// Mutations are serialized by an async mutex held across the stock
/// fetches, so overlapping calls can never validate against the same
/// stale snapshot and over-allocate beyond stock. Reads take a snapshot
/// and never wait on the network.
///
/// Failures never reach the caller: each operation translates its error
/// into a message on the [`NotificationSink`] and leaves both the cart
/// and the persisted copy untouched.
pub struct CartStore {
    stock: Arc<dyn StockService>,
    store: Arc<dyn PersistentStore>,
    notifier: Arc<dyn NotificationSink>,
    cart_key: String,
    cart: RwLock<Cart>,
    write_lock: Mutex<()>,
}

impl CartStore {
    /// Create a CartStore, restoring the cart persisted under `cart_key`.
    /// An absent or unparseable persisted value yields an empty cart.
    pub fn new(
        stock: Arc<dyn StockService>,
        store: Arc<dyn PersistentStore>,
        notifier: Arc<dyn NotificationSink>,
        cart_key: impl Into<String>,
    ) -> Self {
        let cart_key = cart_key.into();
        let cart = Self::restore(store.as_ref(), &cart_key);

        info!(key = %cart_key, items = cart.len(), "CartStore initialized");

        Self {
            stock,
            store,
            notifier,
            cart_key,
            cart: RwLock::new(cart),
            write_lock: Mutex::new(()),
        }
    }

    fn restore(store: &dyn PersistentStore, key: &str) -> Cart {
        match store.read(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(key = key, error = %e, "Persisted cart unparseable, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read persisted cart, starting empty");
                Cart::new()
            }
        }
    }

    /// Read-only snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.cart.read().clone()
    }

    /// Sum of `price * amount` over the current cart.
    pub fn cart_total(&self) -> f64 {
        self.cart.read().total()
    }

    /// Add one unit of a product to the cart.
    ///
    /// New products enter with amount 1; products already in the cart get
    /// one more unit, capped by remote stock.
    pub async fn add_product(&self, product_id: u64) {
        if let Err(err) = self.try_add(product_id).await {
            self.report(Operation::Add, product_id, &err);
        }
    }

    /// Remove a product from the cart entirely.
    pub async fn remove_product(&self, product_id: u64) {
        if let Err(err) = self.try_remove(product_id).await {
            self.report(Operation::Remove, product_id, &err);
        }
    }

    /// Set the cart quantity of a product to an exact amount.
    ///
    /// Amounts below 1 are rejected without a stock lookup; use
    /// [`remove_product`](Self::remove_product) to drop an entry.
    pub async fn update_product_amount(&self, product_id: u64, amount: i64) {
        if let Err(err) = self.try_update(product_id, amount).await {
            self.report(Operation::Update, product_id, &err);
        }
    }

    /// Empty the cart, persisting the empty state.
    pub async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(err) = self.commit(Cart::new()) {
            warn!(error = %err, "Failed to clear cart");
        }
    }

    async fn try_add(&self, product_id: u64) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().await;

        let stock = self.stock.stock(product_id).await?;
        let current = self.cart.read().amount_of(product_id);
        let desired = current + 1;

        if desired > stock.amount {
            return Err(CartError::OutOfStock { product_id });
        }

        let next = if current == 0 {
            let info = self.stock.product(product_id).await?;
            self.cart.read().with_product(info.into_product(1))
        } else {
            self.cart.read().with_amount(product_id, desired)
        };

        self.commit(next)?;
        debug!(product_id, amount = desired, "Product added to cart");
        Ok(())
    }

    async fn try_remove(&self, product_id: u64) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().await;

        if !self.cart.read().contains(product_id) {
            return Err(CartError::ProductNotInCart { product_id });
        }

        let next = self.cart.read().without(product_id);
        self.commit(next)?;
        debug!(product_id, "Product removed from cart");
        Ok(())
    }

    async fn try_update(&self, product_id: u64, amount: i64) -> Result<(), CartError> {
        if amount < 1 {
            return Err(CartError::InvalidAmount { amount });
        }
        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidAmount { amount })?;

        let _guard = self.write_lock.lock().await;

        if !self.cart.read().contains(product_id) {
            return Err(CartError::ProductNotInCart { product_id });
        }

        let stock = self.stock.stock(product_id).await?;
        if amount > stock.amount {
            return Err(CartError::OutOfStock { product_id });
        }

        let next = self.cart.read().with_amount(product_id, amount);
        self.commit(next)?;
        debug!(product_id, amount, "Product amount updated");
        Ok(())
    }

    /// Persist a new cart value, then swap it in. A failing write aborts
    /// the mutation: the in-memory cart keeps its previous value.
    fn commit(&self, next: Cart) -> Result<(), CartError> {
        let bytes = serde_json::to_vec(&next)?;
        self.store.write(&self.cart_key, &bytes)?;
        *self.cart.write() = next;
        Ok(())
    }

    fn report(&self, op: Operation, product_id: u64, err: &CartError) {
        warn!(product_id, error = %err, "Cart operation failed");
        self.notifier.error(failure_message(op, err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex as PlMutex;

    use crate::domain::{Product, ProductInfo, StockRecord};

    struct FakeStockService {
        stock: HashMap<u64, u32>,
        products: HashMap<u64, ProductInfo>,
        stock_calls: AtomicUsize,
    }

    impl FakeStockService {
        fn new() -> Self {
            Self {
                stock: HashMap::new(),
                products: HashMap::new(),
                stock_calls: AtomicUsize::new(0),
            }
        }

        fn with_product(mut self, id: u64, title: &str, price: f64, image: &str, stock: u32) -> Self {
            self.stock.insert(id, stock);
            self.products.insert(
                id,
                ProductInfo {
                    id,
                    title: title.to_string(),
                    price,
                    image: image.to_string(),
                },
            );
            self
        }
    }

    #[async_trait::async_trait]
    impl StockService for FakeStockService {
        async fn stock(&self, product_id: u64) -> Result<StockRecord, CartError> {
            self.stock_calls.fetch_add(1, Ordering::SeqCst);
            self.stock
                .get(&product_id)
                .map(|&amount| StockRecord { id: product_id, amount })
                .ok_or(CartError::ProductNotFound { product_id })
        }

        async fn product(&self, product_id: u64) -> Result<ProductInfo, CartError> {
            self.products
                .get(&product_id)
                .cloned()
                .ok_or(CartError::ProductNotFound { product_id })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        values: PlMutex<HashMap<String, Vec<u8>>>,
        fail_writes: AtomicBool,
    }

    impl MemoryStore {
        fn value(&self, key: &str) -> Option<Vec<u8>> {
            self.values.lock().get(key).cloned()
        }
    }

    impl PersistentStore for MemoryStore {
        fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
            Ok(self.values.lock().get(key).cloned())
        }

        fn write(&self, key: &str, value: &[u8]) -> Result<(), CartError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CartError::Io("disk full".to_string()));
            }
            self.values.lock().insert(key.to_string(), value.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: PlMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().clone()
        }
    }

    impl NotificationSink for RecordingNotifier {
        fn error(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    const KEY: &str = "@storecart:cart";

    struct Harness {
        stock: Arc<FakeStockService>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        cart: CartStore,
    }

    fn harness(stock: FakeStockService) -> Harness {
        harness_with_store(stock, MemoryStore::default())
    }

    fn harness_with_store(stock: FakeStockService, store: MemoryStore) -> Harness {
        let stock = Arc::new(stock);
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let cart = CartStore::new(
            stock.clone(),
            store.clone(),
            notifier.clone(),
            KEY,
        );
        Harness { stock, store, notifier, cart }
    }

    fn seeded_store(cart: &Cart) -> MemoryStore {
        let store = MemoryStore::default();
        store.write(KEY, &serde_json::to_vec(cart).unwrap()).unwrap();
        store
    }

    fn entry(id: u64, amount: u32) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            price: 10.0,
            image: "u".to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_add_new_product_inserts_with_amount_one() {
        let h = harness(FakeStockService::new().with_product(5, "X", 9.99, "u", 10));

        h.cart.add_product(5).await;

        let cart = h.cart.cart();
        assert_eq!(cart.len(), 1);
        let p = cart.get(5).unwrap();
        assert_eq!(p.title, "X");
        assert_eq!(p.price, 9.99);
        assert_eq!(p.image, "u");
        assert_eq!(p.amount, 1);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_amount() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2), entry(2, 1)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(1, "A", 5.0, "a", 5),
            seeded,
        );

        h.cart.add_product(1).await;

        let cart = h.cart.cart();
        assert_eq!(cart.amount_of(1), 3);
        // the untouched entry keeps its original metadata and amount
        assert_eq!(cart.get(2).unwrap(), &entry(2, 1));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_a_no_op_with_one_notification() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(1, "A", 5.0, "a", 2),
            seeded,
        );
        let persisted_before = h.store.value(KEY).unwrap();

        h.cart.add_product(1).await;

        assert_eq!(h.cart.cart(), Cart::from(vec![entry(1, 2)]));
        assert_eq!(h.store.value(KEY).unwrap(), persisted_before);
        assert_eq!(h.notifier.messages(), vec!["Requested quantity out of stock"]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_generic_message() {
        let h = harness(FakeStockService::new());

        h.cart.add_product(99).await;

        assert!(h.cart.cart().is_empty());
        assert!(h.store.value(KEY).is_none());
        assert_eq!(h.notifier.messages(), vec!["Error adding product"]);
    }

    #[tokio::test]
    async fn test_add_persists_new_cart() {
        let h = harness(FakeStockService::new().with_product(5, "X", 9.99, "u", 10));

        h.cart.add_product(5).await;

        let persisted: Cart = serde_json::from_slice(&h.store.value(KEY).unwrap()).unwrap();
        assert_eq!(persisted, h.cart.cart());
    }

    #[tokio::test]
    async fn test_remove_present_product() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2), entry(2, 1)]));
        let h = harness_with_store(FakeStockService::new(), seeded);

        h.cart.remove_product(1).await;

        let cart = h.cart.cart();
        assert!(!cart.contains(1));
        assert_eq!(cart.get(2).unwrap(), &entry(2, 1));

        let persisted: Cart = serde_json::from_slice(&h.store.value(KEY).unwrap()).unwrap();
        assert_eq!(persisted, cart);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_product_is_a_no_op_with_one_notification() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2)]));
        let h = harness_with_store(FakeStockService::new(), seeded);
        let persisted_before = h.store.value(KEY).unwrap();

        h.cart.remove_product(7).await;

        assert_eq!(h.cart.cart(), Cart::from(vec![entry(1, 2)]));
        assert_eq!(h.store.value(KEY).unwrap(), persisted_before);
        assert_eq!(h.notifier.messages(), vec!["Error removing product"]);
    }

    #[tokio::test]
    async fn test_update_rejects_amount_below_one_without_stock_lookup() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(1, "A", 5.0, "a", 10),
            seeded,
        );

        h.cart.update_product_amount(1, 0).await;
        h.cart.update_product_amount(1, -3).await;

        assert_eq!(h.stock.stock_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.cart.cart(), Cart::from(vec![entry(1, 2)]));
        assert_eq!(
            h.notifier.messages(),
            vec!["Error updating product quantity", "Error updating product quantity"]
        );
    }

    #[tokio::test]
    async fn test_update_absent_product_reports_update_message() {
        let h = harness(FakeStockService::new().with_product(1, "A", 5.0, "a", 10));

        h.cart.update_product_amount(1, 2).await;

        assert!(h.cart.cart().is_empty());
        assert_eq!(h.notifier.messages(), vec!["Error updating product quantity"]);
    }

    #[tokio::test]
    async fn test_update_sets_exact_amount_and_preserves_order() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2), entry(2, 1), entry(3, 4)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(2, "B", 5.0, "b", 10),
            seeded,
        );

        h.cart.update_product_amount(2, 7).await;

        let cart = h.cart.cart();
        let ids: Vec<u64> = cart.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cart.amount_of(1), 2);
        assert_eq!(cart.amount_of(2), 7);
        assert_eq!(cart.amount_of(3), 4);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_beyond_stock_reports_stock_message() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(1, "A", 5.0, "a", 4),
            seeded,
        );

        h.cart.update_product_amount(1, 5).await;

        assert_eq!(h.cart.cart().amount_of(1), 2);
        assert_eq!(h.notifier.messages(), vec!["Requested quantity out of stock"]);
    }

    #[tokio::test]
    async fn test_startup_restores_persisted_cart() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2), entry(9, 1)]));
        let h = harness_with_store(FakeStockService::new(), seeded);

        assert_eq!(h.cart.cart(), Cart::from(vec![entry(1, 2), entry(9, 1)]));
    }

    #[tokio::test]
    async fn test_startup_with_garbage_payload_starts_empty() {
        let store = MemoryStore::default();
        store.write(KEY, b"not json at all").unwrap();
        let h = harness_with_store(FakeStockService::new(), store);

        assert!(h.cart.cart().is_empty());
    }

    #[tokio::test]
    async fn test_failing_persist_aborts_the_mutation() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 1)]));
        let h = harness_with_store(
            FakeStockService::new().with_product(1, "A", 5.0, "a", 10),
            seeded,
        );

        h.store.fail_writes.store(true, Ordering::SeqCst);
        h.cart.add_product(1).await;

        // in-memory cart unchanged, one generic notification
        assert_eq!(h.cart.cart().amount_of(1), 1);
        assert_eq!(h.notifier.messages(), vec!["Error adding product"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_cannot_exceed_stock() {
        let h = harness(FakeStockService::new().with_product(1, "A", 5.0, "a", 3));
        let cart = &h.cart;

        tokio::join!(
            cart.add_product(1),
            cart.add_product(1),
            cart.add_product(1),
            cart.add_product(1),
            cart.add_product(1),
        );

        assert_eq!(h.cart.cart().amount_of(1), 3);
        assert_eq!(h.notifier.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_and_persists() {
        let seeded = seeded_store(&Cart::from(vec![entry(1, 2), entry(2, 1)]));
        let h = harness_with_store(FakeStockService::new(), seeded);

        h.cart.clear().await;

        assert!(h.cart.cart().is_empty());
        let persisted: Cart = serde_json::from_slice(&h.store.value(KEY).unwrap()).unwrap();
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_cart_total() {
        let mut a = entry(1, 2);
        a.price = 9.99;
        let mut b = entry(2, 3);
        b.price = 1.0;
        let seeded = seeded_store(&Cart::from(vec![a, b]));
        let h = harness_with_store(FakeStockService::new(), seeded);

        assert!((h.cart.cart_total() - 22.98).abs() < 1e-9);
    }

    #[test]
    fn test_failure_message_table() {
        let out_of_stock = CartError::OutOfStock { product_id: 1 };
        let not_in_cart = CartError::ProductNotInCart { product_id: 1 };
        let invalid = CartError::InvalidAmount { amount: 0 };
        let http = CartError::Http("boom".to_string());

        assert_eq!(
            failure_message(Operation::Add, &out_of_stock),
            "Requested quantity out of stock"
        );
        assert_eq!(failure_message(Operation::Add, &http), "Error adding product");
        assert_eq!(
            failure_message(Operation::Remove, &not_in_cart),
            "Error removing product"
        );
        assert_eq!(
            failure_message(Operation::Update, &invalid),
            "Error updating product quantity"
        );
        assert_eq!(
            failure_message(Operation::Update, &out_of_stock),
            "Requested quantity out of stock"
        );
    }
}
