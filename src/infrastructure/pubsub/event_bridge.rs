//! Event Bridge
//!
//! Process-wide publish/subscribe bus keyed by [`Topic`]. Each topic owns its
//! own `tokio::sync::broadcast` channel, so publishes on unrelated topics never
//! contend on a shared lock and every subscriber gets its own receiver
//! (broadcast semantics: no subscriber consumes another's event).
//!
//! The bridge is in-process and best-effort: a subscriber that falls more than
//! `capacity` events behind skips the overflowed events.

use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;

use crate::domain::{Event, Topic};
use crate::infrastructure::metrics;

type TopicTable = DashMap<Topic, broadcast::Sender<Arc<Event>>>;

/// Events of one subscription, as an owned stream
pub type EventStream = BoxStream<'static, Arc<Event>>;

/// Topic-sharded broadcast bus. Cheap to clone.
#[derive(Clone)]
pub struct EventBridge {
    topics: Arc<TopicTable>,
    capacity: usize,
}

impl EventBridge {
    /// Create a bridge whose per-topic buffers hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Publish an event on a topic.
    ///
    /// Never blocks and never fails; returns how many subscribers were live at
    /// the moment of publishing (zero is a normal outcome).
    pub fn publish(&self, topic: Topic, event: Event) -> usize {
        // Clone the sender so the shard lock is not held while sending.
        let sender = self.topics.get(&topic).map(|entry| entry.value().clone());

        let reached = match sender {
            Some(tx) => tx.send(Arc::new(event)).unwrap_or(0),
            None => 0,
        };

        tracing::debug!(topic = %topic, subscribers = reached, "Event published");
        reached
    }

    /// Open an independent subscription on a topic.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        // The entry guard is held until the receiver exists, so a concurrent
        // last-subscriber cleanup cannot remove the channel in between.
        let receiver = self
            .topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        metrics::add_bridge_subscriptions(1);
        tracing::debug!(topic = %topic, "Subscription opened");

        Subscription {
            topic,
            receiver: Some(receiver),
            topics: Arc::clone(&self.topics),
        }
    }

    /// Number of topics with at least one live subscription.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics
            .get(&topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

/// A live interest registration on one topic.
///
/// Dropping it releases the receiver immediately; dropping the last one of a
/// topic also removes the topic's channel.
pub struct Subscription {
    topic: Topic,
    receiver: Option<broadcast::Receiver<Arc<Event>>>,
    topics: Arc<TopicTable>,
}

impl Subscription {
    /// Wait for the next event on this topic.
    ///
    /// Returns `None` only if the bridge itself has gone away.
    pub async fn next_event(&mut self) -> Option<Arc<Event>> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        topic = %self.topic,
                        skipped = skipped,
                        "Subscription lagged, events skipped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into an infinite, cancellable event stream.
    /// Dropping the stream cancels the subscription.
    pub fn into_stream(self) -> EventStream {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next_event()
                .await
                .map(|event| (event, subscription))
        })
        .boxed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.topics
            .remove_if(&self.topic, |_, tx| tx.receiver_count() == 0);
        metrics::add_bridge_subscriptions(-1);
        tracing::debug!(topic = %self.topic, "Subscription closed");
    }
}
