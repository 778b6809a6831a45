use crate::domain::CartError;

/// Durable key-value byte storage port.
///
/// Values written under a key must be read back byte-identical after a
/// process restart. The cart is read only at startup and overwritten
/// after every successful mutation.
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CartError>;

    /// Write `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &[u8]) -> Result<(), CartError>;
}
