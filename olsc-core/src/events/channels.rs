//! Broadcast bus for change notifications.

use super::types::MatchChanged;
use tokio::sync::broadcast;
use tracing::trace;

/// Default buffer size for the change bus.
///
/// Bounded so a stalled observer cannot grow memory; a lagged receiver
/// gets `RecvError::Lagged` and re-reads current state instead of
/// replaying the backlog.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Receiver handle for change notifications.
pub type MatchChangedReceiver = broadcast::Receiver<MatchChanged>;

/// Fan-out bus for [`MatchChanged`] notifications.
///
/// `publish` never blocks the writer: with no subscribers the
/// notification is dropped, and a full buffer evicts the oldest entry
/// per `tokio::sync::broadcast` semantics.
#[derive(Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<MatchChanged>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_BUFFER)
    }
}

impl ChangeBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _rx) = broadcast::channel(buffer);
        Self { tx }
    }

    /// Subscribe to all future notifications.
    ///
    /// Subscribe before reading initial state so a racing mutation is
    /// observed either in the read or as a notification.
    pub fn subscribe(&self) -> MatchChangedReceiver {
        self.tx.subscribe()
    }

    /// Publish a notification to all current subscribers.
    pub fn publish(&self, changed: MatchChanged) {
        // Err means no subscribers, which is not a failure.
        if self.tx.send(changed).is_err() {
            trace!("change published with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::ChangeSource;

    #[tokio::test]
    async fn publish_without_subscribers_does_not_fail() {
        let bus = ChangeBus::default();
        bus.publish(MatchChanged::clock("m1"));
    }

    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();

        bus.publish(MatchChanged::feed("m1"));
        bus.publish(MatchChanged::clock("m2"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.match_id, "m1");
        assert_eq!(first.source, ChangeSource::Feed);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.match_id, "m2");
        assert_eq!(second.source, ChangeSource::Clock);
    }

    #[tokio::test]
    async fn lagged_receiver_resumes_with_recent_changes() {
        let bus = ChangeBus::new(2);
        let mut rx = bus.subscribe();

        for i in 0..5 {
            bus.publish(MatchChanged::clock(format!("m{i}")));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        // After the lag signal the receiver continues from what is
        // still buffered.
        assert_eq!(rx.recv().await.unwrap().match_id, "m3");
    }
}
