use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::InterestStatus;

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

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "dropping domain event");
        }
    }
}

/// Domain events published by the booking and interest services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    BookingCreated {
        booking_id: Uuid,
        entity_id: Uuid,
        interest_id: Option<Uuid>,
    },
    BookingRescheduled {
        booking_id: Uuid,
        entity_id: Uuid,
    },
    BookingCancelled {
        booking_id: Uuid,
        entity_id: Uuid,
    },
    InterestCreated {
        interest_id: Uuid,
        target_profile_id: Uuid,
    },
    InterestTransitioned {
        interest_id: Uuid,
        from: InterestStatus,
        to: InterestStatus,
        at: DateTime<Utc>,
    },
    /// Emitted after the ACCEPTED transition commits, before the acceptance hook runs.
    InterestAccepted {
        interest_id: Uuid,
        interested_profile_id: Uuid,
        target_profile_id: Uuid,
    },
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InterestTransitioned {
                interest_id,
                from,
                to,
                ..
            } => {
                info!(%interest_id, %from, %to, "interest transitioned");
            }
            Event::BookingCreated {
                booking_id,
                entity_id,
                ..
            } => {
                info!(%booking_id, %entity_id, "booking created");
            }
            other => debug!(event = ?other, "event processed"),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender
            .send(Event::BookingCancelled {
                booking_id: Uuid::new_v4(),
                entity_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn process_events_exits_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let worker = tokio::spawn(process_events(rx));

        sender
            .send(Event::InterestCreated {
                interest_id: Uuid::new_v4(),
                target_profile_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        drop(sender);

        worker.await.unwrap();
    }
}
