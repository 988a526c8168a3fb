//! In-process domain event channel.
//!
//! Services publish after their transaction commits; a single consumer task
//! logs each event and bumps a counter.

use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::models::{EventType, TaskStatus};

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

    /// Publishes without failing the caller; the write it reports has already
    /// been committed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TaskEventLogged {
        task_id: i64,
        event_id: i64,
        event_type: EventType,
        status: TaskStatus,
        technician_id: Option<i64>,
    },
    TaskUnblocked {
        task_id: i64,
        item_id: i64,
    },
    StockAllocated {
        allocation_id: i64,
        build_id: i64,
        stage_id: i64,
        item_id: i64,
        qty: Decimal,
    },
    StockReceived {
        item_id: i64,
        qty: Decimal,
        on_hand: Decimal,
    },
    BuildDocumentAdded {
        build_id: i64,
        document_id: i64,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TaskEventLogged { .. } => "task_event_logged",
            Event::TaskUnblocked { .. } => "task_unblocked",
            Event::StockAllocated { .. } => "stock_allocated",
            Event::StockReceived { .. } => "stock_received",
            Event::BuildDocumentAdded { .. } => "build_document_added",
        }
    }
}

/// Consumes the channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) -> usize {
    info!("Starting event processing loop");
    let mut processed = 0;

    while let Some(event) = rx.recv().await {
        counter!("shopfloor_events.processed", 1, "event" => event.name());
        match &event {
            Event::TaskEventLogged {
                task_id,
                event_type,
                status,
                technician_id,
                ..
            } => info!(
                task_id,
                event_type = %event_type,
                status = %status,
                technician_id = ?technician_id,
                "task event logged"
            ),
            Event::TaskUnblocked { task_id, item_id } => {
                info!(task_id, item_id, "task unblocked by stock receipt")
            }
            Event::StockAllocated {
                allocation_id,
                build_id,
                item_id,
                qty,
                ..
            } => info!(allocation_id, build_id, item_id, qty = %qty, "stock allocated"),
            Event::StockReceived {
                item_id,
                qty,
                on_hand,
            } => info!(item_id, qty = %qty, on_hand = %on_hand, "stock received"),
            Event::BuildDocumentAdded {
                build_id,
                document_id,
            } => info!(build_id, document_id, "build document added"),
        }
        processed += 1;
    }

    info!(processed, "Event processing loop stopped");
    processed
}
