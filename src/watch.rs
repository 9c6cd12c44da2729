//! Watch and notification types for reactive store updates.
//!
//! Backends publish a [`WatchEvent`] after every committed edit; the event
//! carries the full new set value, not a delta. Subscribers that fall
//! behind skip lagged events, so the guarantee is "eventually observes the
//! latest committed state", never "observes every intermediate state".

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::Stream;

/// Committed state of one store key, redelivered after each edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    /// The key that was edited.
    pub key: String,
    /// The full set value after the edit.
    pub members: BTreeSet<String>,
    /// The key's version after the edit.
    pub version: u64,
}

impl WatchEvent {
    /// Create a new event for a committed edit.
    pub fn new(key: impl Into<String>, members: BTreeSet<String>, version: u64) -> Self {
        Self {
            key: key.into(),
            members,
            version,
        }
    }
}

/// A stream of watch events for a single store key.
pub struct WatchStream {
    receiver: broadcast::Receiver<WatchEvent>,
    key: String,
}

impl WatchStream {
    /// Create a new watch stream for the given key.
    pub fn new(receiver: broadcast::Receiver<WatchEvent>, key: impl Into<String>) -> Self {
        Self {
            receiver,
            key: key.into(),
        }
    }

    /// Get the key this stream is watching.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn matches(&self, key: &str) -> bool {
        key == self.key
    }
}

impl Stream for WatchStream {
    type Item = WatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event.key) {
                        return Poll::Ready(Some(event));
                    }
                    // Event is for another key, continue polling
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    // Register waker and return pending
                    cx.waker().wake_by_ref();
                    return Poll::Pending;
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Poll::Ready(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    // Skip lagged events; only the latest state matters
                    continue;
                }
            }
        }
    }
}

/// Handle for sending watch events to subscribers.
#[derive(Clone)]
pub struct WatchSender {
    sender: broadcast::Sender<WatchEvent>,
}

impl WatchSender {
    /// Create a new watch sender with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send an event to all subscribers.
    pub fn send(&self, event: WatchEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events for one key.
    pub fn subscribe(&self, key: impl Into<String>) -> WatchStream {
        WatchStream::new(self.sender.subscribe(), key)
    }

    /// Get the number of current subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WatchSender {
    fn default() -> Self {
        Self::new(64)
    }
}

/// A live decoded view of one store key.
///
/// Yields one complete `Vec<T>` for the state at subscription time, then a
/// new complete `Vec<T>` after every committed edit. Both managers use this
/// for their list subscriptions: consumers replace their whole view on each
/// item rather than patching it.
pub struct ListWatch<T> {
    initial: Option<Vec<T>>,
    events: WatchStream,
    decode: fn(&BTreeSet<String>) -> Vec<T>,
}

impl<T> ListWatch<T> {
    /// Build a live view from a snapshot, an event stream, and a decode pass.
    pub fn new(
        initial: Vec<T>,
        events: WatchStream,
        decode: fn(&BTreeSet<String>) -> Vec<T>,
    ) -> Self {
        Self {
            initial: Some(initial),
            events,
            decode,
        }
    }

    /// Get the key this view is watching.
    pub fn key(&self) -> &str {
        self.events.key()
    }
}

impl<T: Unpin> Stream for ListWatch<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(list) = this.initial.take() {
            return Poll::Ready(Some(list));
        }
        match Pin::new(&mut this.events).poll_next(cx) {
            Poll::Ready(Some(event)) => Poll::Ready(Some((this.decode)(&event.members))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn set(members: &[&str]) -> BTreeSet<String> {
        members.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_watch_event_new() {
        let event = WatchEvent::new("recipes", set(&["a", "b"]), 3);
        assert_eq!(event.key, "recipes");
        assert_eq!(event.members.len(), 2);
        assert_eq!(event.version, 3);
    }

    #[test]
    fn test_key_matching() {
        let sender = WatchSender::new(16);
        let stream = sender.subscribe("kitchen_items");

        assert!(stream.matches("kitchen_items"));
        assert!(!stream.matches("recipes"));
    }

    #[tokio::test]
    async fn test_stream_filters_other_keys() {
        let sender = WatchSender::new(16);
        let mut stream = sender.subscribe("kitchen_items");

        sender.send(WatchEvent::new("recipes", set(&["x"]), 1));
        sender.send(WatchEvent::new("kitchen_items", set(&["y"]), 1));

        let event = stream.next().await.unwrap();
        assert_eq!(event.key, "kitchen_items");
        assert_eq!(event.members, set(&["y"]));
    }

    #[tokio::test]
    async fn test_list_watch_initial_then_update() {
        let sender = WatchSender::new(16);
        let events = sender.subscribe("recipes");

        fn decode(members: &BTreeSet<String>) -> Vec<String> {
            members.iter().cloned().collect()
        }

        let mut view = ListWatch::new(vec!["seed".to_string()], events, decode);

        // Snapshot first, even before any event arrives
        assert_eq!(view.next().await.unwrap(), vec!["seed".to_string()]);

        sender.send(WatchEvent::new("recipes", set(&["a", "b"]), 1));
        assert_eq!(
            view.next().await.unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_receiver_count() {
        let sender = WatchSender::new(16);
        assert_eq!(sender.receiver_count(), 0);
        let _stream = sender.subscribe("recipes");
        assert_eq!(sender.receiver_count(), 1);
    }
}
