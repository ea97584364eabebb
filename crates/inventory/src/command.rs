use serde::{Deserialize, Serialize};

use gridinv_core::{GridPos, ItemInstanceId};
use gridinv_events::Event;

/// Command: MoveStack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStack {
    pub item_id: ItemInstanceId,
    pub to: GridPos,
}

/// Command: SplitStack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStack {
    pub item_id: ItemInstanceId,
    pub amount: u32,
}

/// Command: DropItems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropItems {
    pub item_id: ItemInstanceId,
    pub amount: u32,
}

/// Command: EquipItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipItem {
    pub item_id: ItemInstanceId,
    pub slot: String,
}

/// Command: UnequipSlot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnequipSlot {
    pub slot: String,
}

/// One row of a client-submitted layout.
///
/// `item_id: None` asks for a new stack; `quantity == 0` on an existing id
/// removes that stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub item_id: Option<ItemInstanceId>,
    pub def_key: String,
    pub quantity: u32,
    pub pos: GridPos,
}

/// Command: ApplyLayout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyLayout {
    pub entries: Vec<LayoutEntry>,
}

/// Command: AddItems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItems {
    pub def_key: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    Move(MoveStack),
    Split(SplitStack),
    Drop(DropItems),
    Equip(EquipItem),
    Unequip(UnequipSlot),
    ApplyLayout(ApplyLayout),
    AddItems(AddItems),
}

impl InventoryCommand {
    /// Verb name used in logs and event envelopes.
    pub fn name(&self) -> &'static str {
        match self {
            InventoryCommand::Move(_) => "move",
            InventoryCommand::Split(_) => "split",
            InventoryCommand::Drop(_) => "drop",
            InventoryCommand::Equip(_) => "equip",
            InventoryCommand::Unequip(_) => "unequip",
            InventoryCommand::ApplyLayout(_) => "apply_layout",
            InventoryCommand::AddItems(_) => "add_items",
        }
    }
}

/// Event: StackCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackCreated {
    pub item_id: ItemInstanceId,
    pub def_key: String,
    pub quantity: u32,
    pub pos: GridPos,
}

/// Event: StackMoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackMoved {
    pub item_id: ItemInstanceId,
    pub from: GridPos,
    pub to: GridPos,
}

/// Event: StacksSwapped (the two stacks exchange cells).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StacksSwapped {
    pub first: ItemInstanceId,
    pub second: ItemInstanceId,
}

/// Event: QuantityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub item_id: ItemInstanceId,
    pub from: u32,
    pub to: u32,
}

/// Event: StackRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRemoved {
    pub item_id: ItemInstanceId,
    pub def_key: String,
    pub quantity: u32,
}

/// Event: SlotProvisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotProvisioned {
    pub slot: String,
}

/// Event: SlotEquipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEquipped {
    pub slot: String,
    pub def_key: String,
    pub previous: Option<String>,
}

/// Event: SlotCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCleared {
    pub slot: String,
    pub def_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    StackCreated(StackCreated),
    StackMoved(StackMoved),
    StacksSwapped(StacksSwapped),
    QuantityChanged(QuantityChanged),
    StackRemoved(StackRemoved),
    SlotProvisioned(SlotProvisioned),
    SlotEquipped(SlotEquipped),
    SlotCleared(SlotCleared),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StackCreated(_) => "inventory.stack.created",
            InventoryEvent::StackMoved(_) => "inventory.stack.moved",
            InventoryEvent::StacksSwapped(_) => "inventory.stack.swapped",
            InventoryEvent::QuantityChanged(_) => "inventory.stack.quantity_changed",
            InventoryEvent::StackRemoved(_) => "inventory.stack.removed",
            InventoryEvent::SlotProvisioned(_) => "inventory.slot.provisioned",
            InventoryEvent::SlotEquipped(_) => "inventory.slot.equipped",
            InventoryEvent::SlotCleared(_) => "inventory.slot.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}
