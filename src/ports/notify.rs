/// User-facing notification port.
///
/// Fire-and-forget: delivery has no return value and no effect on cart
/// state. The UI layer decides how messages are rendered (toast, banner).
pub trait NotificationSink: Send + Sync {
    /// Display a human-readable error message to the user.
    fn error(&self, message: &str);
}
