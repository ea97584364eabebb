//! Inventory domain module (event-sourced).
//!
//! Grid placement, the `Inventory` aggregate with its decisions, bulk layout
//! reconciliation and the snapshot projection. Pure domain logic: no IO, no
//! locking, no storage.

pub mod command;
pub mod context;
mod decide;
pub mod error;
pub mod inventory;
pub mod item;
mod layout;
pub mod placement;
pub mod snapshot;

#[cfg(test)]
mod properties;

pub use command::{
    AddItems, ApplyLayout, DropItems, EquipItem, InventoryCommand, InventoryEvent, LayoutEntry,
    MoveStack, QuantityChanged, SlotCleared, SlotEquipped, SlotProvisioned, SplitStack,
    StackCreated, StackMoved, StackRemoved, StacksSwapped, UnequipSlot,
};
pub use context::{InventoryContext, SlotRules};
pub use error::Rejection;
pub use inventory::{Inventory, InventoryTemplate};
pub use item::{EquipmentSlot, InventoryItem};
pub use placement::{Allocation, AllocationPlan};
pub use snapshot::{EquipView, InventorySnapshot, ItemView};
