use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::Handler;

/// Publish/subscribe broadcast capability. The presenter publishes complete
/// snapshots on a topic; audience mirrors subscribe. Delivery is best-effort
/// with no history: a subscriber registered after a publish never sees it,
/// which is why the durable store exists as the second channel.
pub trait MessageBus {
    fn publish(&self, topic: &str, payload: &str) -> Result<()>;
    fn subscribe(&self, topic: &str, handler: Handler) -> Result<()>;
}

/// Same-process broadcast bus. Handlers run inline on the publisher's
/// thread, preserving publish order; a handler must not publish back into
/// the bus (the topic table is locked for the duration of the delivery).
#[derive(Default, Clone)]
pub struct InProcessBus {
    topics: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBus for InProcessBus {
    fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        let topics = self
            .topics
            .lock()
            .map_err(|_| anyhow::anyhow!("Bus lock poisoned"))?;
        if let Some(handlers) = topics.get(topic) {
            for handler in handlers {
                handler(payload);
            }
        }
        Ok(())
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> Result<()> {
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| anyhow::anyhow!("Bus lock poisoned"))?;
        topics.entry(topic.to_string()).or_default().push(handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delivers_to_all_subscribers_on_topic() {
        let bus = InProcessBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            bus.subscribe("deck", Box::new(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }
        bus.publish("deck", "payload").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = InProcessBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        bus.subscribe("deck-a", Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        bus.publish("deck-b", "payload").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = InProcessBus::new();
        bus.publish("nobody-home", "payload").unwrap();
    }
}
