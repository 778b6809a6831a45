use std::sync::mpsc;

use parking_lot::Mutex;
use tracing::error;

use crate::ports::NotificationSink;

/// NotificationSink that routes messages to the tracing pipeline.
///
/// Default sink for headless use; messages end up in the console and the
/// rotating log file like any other error.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn error(&self, message: &str) {
        error!(target: "storecart::notify", "{message}");
    }
}

/// NotificationSink that forwards messages over a channel.
///
/// For hosts that render toasts: the UI side holds the receiver and
/// drains it on its own schedule. A closed receiver drops messages
/// silently; notifications are fire-and-forget by contract.
pub struct ChannelNotifier {
    sender: Mutex<mpsc::Sender<String>>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }
}

impl NotificationSink for ChannelNotifier {
    fn error(&self, message: &str) {
        let _ = self.sender.lock().send(message.to_string());
    }
}
