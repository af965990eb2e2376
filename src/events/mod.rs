use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Domain events emitted after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    OrderCreated {
        order_id: i32,
        order_code: String,
        payment_method: String,
    },
    OrderStatusChanged {
        order_id: i32,
        old_status: String,
        new_status: String,
    },
    OrderDeleted(i32),
    CustomOrderCreated {
        custom_order_id: i32,
        code: String,
    },
    CustomOrderUpdated {
        custom_order_id: i32,
        note: String,
    },
    CustomOrderDeleted(i32),
    ProductChanged(i32),
    ThemeActivated(i32),
    SettingsUpdated,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated {
                order_id,
                order_code,
                payment_method,
            } => info!(order_id, %order_code, %payment_method, "order created"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(order_id, %old_status, %new_status, "order status changed"),
            Event::OrderDeleted(order_id) => warn!(order_id, "order deleted"),
            Event::CustomOrderCreated {
                custom_order_id,
                code,
            } => info!(custom_order_id, %code, "custom order created"),
            Event::CustomOrderUpdated {
                custom_order_id,
                note,
            } => debug!(custom_order_id, %note, "custom order updated"),
            Event::CustomOrderDeleted(id) => warn!(custom_order_id = id, "custom order deleted"),
            other => debug!(event = ?other, "event received"),
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::SettingsUpdated).await.is_err());
    }

    #[tokio::test]
    async fn processor_stops_when_senders_are_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(process_events(rx));
        let sender = EventSender::new(tx);
        sender.send(Event::OrderDeleted(7)).await.unwrap();
        drop(sender);
        handle.await.unwrap();
    }
}
