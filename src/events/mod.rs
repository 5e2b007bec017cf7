use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Events emitted by the services after a successful mutation.
///
/// Delivery is fire-and-forget: a failed send is logged by the caller and
/// never fails the originating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Item lifecycle
    ItemCreated(String),
    MetadataAdded(String),

    // Move workflow
    MoveRequested(Uuid),
    MoveApproved(Uuid),
    MoveRejected(Uuid),

    // Scrap workflow
    ScrapRequested(Uuid),
    ScrapApproved(Uuid),
    ScrapRejected(Uuid),

    // Structure links
    StructureLinked(Uuid),
    StructureUnlinked(Uuid),

    // Stock-takes
    InventorySightingRecorded(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of the
/// process; exits when every sender has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::ItemCreated(id) => info!(item_id = %id, "event: item created"),
            Event::MetadataAdded(id) => info!(item_id = %id, "event: metadata added"),
            Event::MoveRequested(id) => info!(move_id = %id, "event: move requested"),
            Event::MoveApproved(id) => info!(move_id = %id, "event: move approved"),
            Event::MoveRejected(id) => info!(move_id = %id, "event: move rejected"),
            Event::ScrapRequested(id) => info!(scrappage_id = %id, "event: scrap requested"),
            Event::ScrapApproved(id) => info!(scrappage_id = %id, "event: scrap approved"),
            Event::ScrapRejected(id) => info!(scrappage_id = %id, "event: scrap rejected"),
            Event::StructureLinked(id) => info!(mapping_id = %id, "event: structure linked"),
            Event::StructureUnlinked(id) => info!(mapping_id = %id, "event: structure unlinked"),
            Event::InventorySightingRecorded(id) => {
                info!(sighting_id = %id, "event: inventory sighting recorded")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ItemCreated("A-1".into()))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::ItemCreated(id)) => assert_eq!(id, "A-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::MoveRequested(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
