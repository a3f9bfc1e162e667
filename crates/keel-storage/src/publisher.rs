use std::sync::Mutex;

use keel_core::notification::{EventPublisher, Notification};
use tokio::sync::broadcast;
use tracing::debug;

/// Fans notifications out to any number of async subscribers.
///
/// Publishing never blocks. Subscribers that fall behind by more than the
/// channel capacity lose the oldest notifications.
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            debug!("notification dropped, no subscribers");
        }
    }
}

/// Records everything published, in order.
#[derive(Default)]
pub struct InMemoryPublisher {
    published: Mutex<Vec<Notification>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl EventPublisher for InMemoryPublisher {
    fn publish(&self, notification: Notification) {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}
