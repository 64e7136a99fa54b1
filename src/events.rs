use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Events emitted after successful writes. Delivery is best-effort; a
/// failed send is logged by the emitting service and never surfaced to
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    DomainCreated(Uuid),
    DomainDeleted(Uuid),
    RubricCreated(Uuid),
    ItemCreated(Uuid),

    FinancialOperationCreated(Uuid),

    PlannedItemCreated(Uuid),
    PlannedItemUpdated(Uuid),
    PlannedItemDeleted(Uuid),

    DistributionCreated {
        distribution_id: Uuid,
        planned_item_id: Uuid,
        structure_id: Uuid,
    },
    DistributionDeleted(Uuid),

    BudgetModificationCreated(Uuid),
    BudgetModificationApprovalSet {
        modification_id: Uuid,
        approval_date: chrono::NaiveDate,
    },
    BudgetModificationDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events from the channel until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        debug!(?event, "Processing event");
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::PlannedItemCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::PlannedItemCreated(received)) => assert_eq!(received, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender
            .send(Event::DomainCreated(Uuid::new_v4()))
            .await
            .is_err());
    }
}
