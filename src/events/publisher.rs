use serde_json::Value;
use std::future::Future;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// High-throughput event publisher for lifecycle events.
///
/// ```rust
/// use syndicate_core::events::EventPublisher;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let publisher = EventPublisher::new(64);
/// let mut rx = publisher.subscribe();
///
/// publisher.emit("part.posted", json!({"posted_to": "artfort:1"})).await.unwrap();
/// assert_eq!(rx.recv().await.unwrap().name, "part.posted");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event with the given name and context.
    pub async fn emit(
        &self,
        event_name: impl Into<String>,
        context: Value,
    ) -> Result<(), PublishError> {
        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        // send() errors only when there are no subscribers, which is fine:
        // events are informational and nobody has to be listening.
        match self.sender.send(event) {
            Ok(_) | Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Publish an event once `payload` resolves.
    ///
    /// Used for updates whose payload is still being computed when the
    /// triggering operation returns, e.g. a validation pass kicked off by an
    /// update API. The emission happens on a spawned task; the returned
    /// handle is mostly useful to tests.
    pub fn emit_on_complete<F>(
        &self,
        event_name: impl Into<String>,
        payload: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = Value> + Send + 'static,
    {
        let publisher = self.clone();
        let name = event_name.into();
        tokio::spawn(async move {
            let context = payload.await;
            let _ = publisher.emit(name, context).await;
        })
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_without_subscribers_is_ok() {
        let publisher = EventPublisher::default();
        assert!(publisher.emit("submission.queued", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_emission_order() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe();

        publisher.emit("first", json!({"n": 1})).await.unwrap();
        publisher.emit("second", json!({"n": 2})).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().name, "first");
        assert_eq!(rx.recv().await.unwrap().name, "second");
    }

    #[tokio::test]
    async fn test_emit_on_complete_publishes_resolved_payload() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe();

        let handle =
            publisher.emit_on_complete("validation.completed", async { json!({"problems": []}) });
        handle.await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, "validation.completed");
        assert_eq!(event.context["problems"], json!([]));
    }
}
