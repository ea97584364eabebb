use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gridinv_core::{InventoryId, OwnerRef};

use crate::event::Event;

/// Envelope for a committed inventory event, carrying stream metadata.
///
/// Notes:
/// - `owner` is the identity the caller supplied for the operation.
/// - `sequence_number` is the inventory version after this event was applied,
///   so it is monotonically increasing per inventory.
/// - `operation` names the service verb that produced the event; every event
///   of one call shares the same `operation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    operation_id: Uuid,
    inventory_id: InventoryId,
    owner: OwnerRef,
    operation: String,
    event_type: String,

    /// Monotonically increasing position in the inventory's history.
    sequence_number: u64,
    occurred_at: DateTime<Utc>,

    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    pub fn new(
        operation_id: Uuid,
        inventory_id: InventoryId,
        owner: OwnerRef,
        operation: impl Into<String>,
        sequence_number: u64,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            operation_id,
            inventory_id,
            owner,
            operation: operation.into(),
            event_type: payload.event_type().to_string(),
            sequence_number,
            occurred_at,
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn inventory_id(&self) -> InventoryId {
        self.inventory_id
    }

    pub fn owner(&self) -> OwnerRef {
        self.owner
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
