//! Broadcast-backed change hub.

use tokio::sync::broadcast;
use tracing::warn;

use crate::domain::ports::ChangePublisher;
use crate::domain::{ChangeEvent, UserId};

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out hub for row-change events.
///
/// All events flow through one broadcast channel; each subscription filters
/// down to its user's events. Dropping a [`ChangeFeed`] tears the
/// subscription down; the hub itself carries no per-subscriber state.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    /// Create a hub with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a hub buffering up to `capacity` undelivered events per
    /// subscriber before older ones are dropped.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to changes for one user. Events published before this call
    /// are not replayed.
    pub fn subscribe(&self, user_id: UserId) -> ChangeFeed {
        ChangeFeed {
            user_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePublisher for ChangeHub {
    fn publish(&self, event: ChangeEvent) {
        // send fails only when no subscriber exists, which is fine.
        let _ = self.sender.send(event);
    }
}

/// One user's view of the change stream.
pub struct ChangeFeed {
    user_id: UserId,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeFeed {
    /// Wait for the next event scoped to this feed's user.
    ///
    /// Returns `None` once the hub is gone. A slow consumer that lags past
    /// the buffer loses the oldest events and keeps receiving from the
    /// current position.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.user_id == self.user_id => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "change feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The user this feed is scoped to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeAction, RecordKind};
    use serde_json::json;

    fn event(user_id: UserId, marker: u32) -> ChangeEvent {
        ChangeEvent::insert(user_id, RecordKind::Link, &json!({ "marker": marker }))
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let hub = ChangeHub::new();
        let user_id = UserId::random();
        let mut feed = hub.subscribe(user_id);

        for marker in 0..3 {
            hub.publish(event(user_id, marker));
        }

        for marker in 0..3 {
            let received = feed.next().await.expect("event");
            assert_eq!(received.data["marker"], marker);
            assert_eq!(received.action, ChangeAction::Insert);
        }
    }

    #[tokio::test]
    async fn feeds_only_see_their_own_users_events() {
        let hub = ChangeHub::new();
        let mine = UserId::random();
        let mut feed = hub.subscribe(mine);

        hub.publish(event(UserId::random(), 1));
        hub.publish(event(mine, 2));

        let received = feed.next().await.expect("event");
        assert_eq!(received.user_id, mine);
        assert_eq!(received.data["marker"], 2);
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let hub = ChangeHub::new();
        let user_id = UserId::random();
        hub.publish(event(user_id, 1));

        let mut feed = hub.subscribe(user_id);
        hub.publish(event(user_id, 2));

        let received = feed.next().await.expect("event");
        assert_eq!(received.data["marker"], 2);
    }

    #[tokio::test]
    async fn dropping_a_feed_tears_the_subscription_down() {
        let hub = ChangeHub::new();
        let feed = hub.subscribe(UserId::random());
        assert_eq!(hub.subscriber_count(), 1);

        drop(feed);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn feed_ends_when_the_hub_is_gone() {
        let hub = ChangeHub::new();
        let mut feed = hub.subscribe(UserId::random());
        drop(hub);

        assert!(feed.next().await.is_none());
    }
}
