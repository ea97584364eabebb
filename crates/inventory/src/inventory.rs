use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use gridinv_catalog::ItemDefinition;
use gridinv_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, GridPos, InventoryId, ItemInstanceId,
    OwnerRef,
};

use crate::command::{InventoryCommand, InventoryEvent};
use crate::context::InventoryContext;
use crate::decide;
use crate::error::Rejection;
use crate::placement::{self, AllocationPlan};

pub use crate::item::{EquipmentSlot, InventoryItem};

/// Shape a freshly provisioned inventory gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTemplate {
    pub grid_width: u32,
    pub grid_height: u32,
    pub capacity_kg: f32,
    pub starter_slots: Vec<String>,
    pub allow_equipment: bool,
}

impl InventoryTemplate {
    pub fn character_default() -> Self {
        Self {
            grid_width: 6,
            grid_height: 5,
            capacity_kg: 20.0,
            starter_slots: ["backpack", "head", "body", "primaryWeapon", "secondaryWeapon"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_equipment: true,
        }
    }

    pub fn vehicle_default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 8,
            capacity_kg: 150.0,
            starter_slots: Vec::new(),
            allow_equipment: false,
        }
    }
}

impl Default for InventoryTemplate {
    fn default() -> Self {
        Self::character_default()
    }
}

/// Aggregate root: one owner's grid of stacks plus its equipment slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    id: InventoryId,
    owner: OwnerRef,
    grid_width: u32,
    grid_height: u32,
    capacity_kg: f32,
    allow_equipment: bool,
    items: Vec<InventoryItem>,
    equipment: Vec<EquipmentSlot>,
    next_item_id: u64,
    version: u64,
}

impl Inventory {
    /// Build the starter inventory for an owner.
    pub fn provision(id: InventoryId, owner: OwnerRef, template: &InventoryTemplate) -> Self {
        Self {
            id,
            owner,
            grid_width: template.grid_width.max(1),
            grid_height: template.grid_height.max(1),
            capacity_kg: template.capacity_kg.max(0.0),
            allow_equipment: template.allow_equipment,
            items: Vec::new(),
            equipment: template.starter_slots.iter().map(EquipmentSlot::new).collect(),
            next_item_id: 1,
            version: 0,
        }
    }

    pub fn inventory_id(&self) -> InventoryId {
        self.id
    }

    pub fn owner(&self) -> OwnerRef {
        self.owner
    }

    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    pub fn capacity_kg(&self) -> f32 {
        self.capacity_kg
    }

    pub fn allows_equipment(&self) -> bool {
        self.allow_equipment
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn equipment(&self) -> &[EquipmentSlot] {
        &self.equipment
    }

    /// Id the next created stack will receive.
    pub fn next_item_id(&self) -> ItemInstanceId {
        ItemInstanceId::new(self.next_item_id)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.within(self.grid_width, self.grid_height)
    }

    pub fn find_item(&self, id: ItemInstanceId) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn find_stack_at(&self, pos: GridPos) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.pos() == pos)
    }

    /// Equipment slot by name, case-insensitively.
    pub fn find_equipment(&self, slot: &str) -> Option<&EquipmentSlot> {
        self.equipment.iter().find(|e| e.matches(slot))
    }

    /// Stacks sorted row-major.
    pub fn items_row_major(&self) -> Vec<&InventoryItem> {
        let mut items: Vec<&InventoryItem> = self.items.iter().collect();
        items.sort_by_key(|i| i.pos());
        items
    }

    pub fn total_quantity(&self, def_key: &str) -> u64 {
        self.items
            .iter()
            .filter(|i| i.def_key() == def_key)
            .map(|i| u64::from(i.quantity()))
            .sum()
    }

    /// Quantity per definition across the whole grid.
    pub fn totals_by_definition(&self) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for item in &self.items {
            *totals.entry(item.def_key().to_string()).or_insert(0) += u64::from(item.quantity());
        }
        totals
    }

    pub fn current_weight_kg(&self, ctx: &InventoryContext) -> f32 {
        self.items
            .iter()
            .map(|i| ctx.weight_of(i.def_key(), i.quantity()))
            .sum()
    }

    /// Base capacity plus the carry bonus of everything equipped in a carry slot.
    pub fn effective_capacity_kg(&self, ctx: &InventoryContext) -> f32 {
        let bonus: f32 = self
            .equipment
            .iter()
            .filter(|slot| ctx.slots.is_carry_slot(slot.name()))
            .filter_map(|slot| slot.equipped())
            .map(|key| ctx.carry_bonus_kg(key))
            .sum();
        self.capacity_kg + bonus
    }

    pub fn find_first_free_cell(&self) -> Option<GridPos> {
        placement::find_first_free_cell(&self.items, self.grid_width, self.grid_height)
    }

    pub fn plan_stack_first_add(
        &self,
        def: &ItemDefinition,
        quantity: u32,
        exclude: Option<ItemInstanceId>,
    ) -> AllocationPlan {
        placement::stack_first_add(&self.items, self.grid_width, self.grid_height, def, quantity, exclude)
    }

    /// Verify grid occupancy, bounds, and stack-size invariants.
    pub fn check_invariants(&self, ctx: &InventoryContext) -> DomainResult<()> {
        let mut cells = HashSet::new();
        let mut ids = HashSet::new();
        for item in &self.items {
            if !ids.insert(item.id()) {
                return Err(DomainError::invariant(format!("duplicate item id {}", item.id())));
            }
            if item.id().get() >= self.next_item_id {
                return Err(DomainError::invariant(format!("item id {} not yet allocated", item.id())));
            }
            if !self.contains(item.pos()) {
                return Err(DomainError::invariant(format!("item {} outside grid at {}", item.id(), item.pos())));
            }
            if !cells.insert(item.pos()) {
                return Err(DomainError::invariant(format!("cell {} holds more than one stack", item.pos())));
            }
            // Stacks of definitions missing from the catalog only need to be non-empty.
            let max = ctx.definition(item.def_key()).map_or(u32::MAX, |d| d.max_stack.max(1));
            if item.quantity() == 0 || item.quantity() > max {
                return Err(DomainError::invariant(format!(
                    "item {} quantity {} outside 1..={max}",
                    item.id(),
                    item.quantity()
                )));
            }
        }
        for slot in &self.equipment {
            if let Some(key) = slot.equipped() {
                let fits = ctx.definition(key).is_none_or(|d| d.fits_slot(slot.name()));
                if !fits {
                    return Err(DomainError::invariant(format!(
                        "slot '{}' holds '{key}' which does not fit it",
                        slot.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn item_mut(&mut self, id: ItemInstanceId) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut EquipmentSlot> {
        self.equipment.iter_mut().find(|e| e.matches(name))
    }
}

impl AggregateRoot for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Context = InventoryContext;
    type Error = Rejection;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::StackCreated(e) => {
                self.items
                    .push(InventoryItem::new(e.item_id, e.def_key.clone(), e.quantity, e.pos));
                self.next_item_id = self.next_item_id.max(e.item_id.get() + 1);
            }
            InventoryEvent::StackMoved(e) => {
                if let Some(item) = self.item_mut(e.item_id) {
                    item.set_pos(e.to);
                }
            }
            InventoryEvent::StacksSwapped(e) => {
                let first = self.find_item(e.first).map(|i| i.pos());
                let second = self.find_item(e.second).map(|i| i.pos());
                if let (Some(a), Some(b)) = (first, second) {
                    if let Some(item) = self.item_mut(e.first) {
                        item.set_pos(b);
                    }
                    if let Some(item) = self.item_mut(e.second) {
                        item.set_pos(a);
                    }
                }
            }
            InventoryEvent::QuantityChanged(e) => {
                if let Some(item) = self.item_mut(e.item_id) {
                    item.set_quantity(e.to);
                }
            }
            InventoryEvent::StackRemoved(e) => {
                self.items.retain(|i| i.id() != e.item_id);
            }
            InventoryEvent::SlotProvisioned(e) => {
                if self.find_equipment(&e.slot).is_none() {
                    self.equipment.push(EquipmentSlot::new(e.slot.clone()));
                }
            }
            InventoryEvent::SlotEquipped(e) => {
                if let Some(slot) = self.slot_mut(&e.slot) {
                    slot.set_equipped(Some(e.def_key.clone()));
                }
            }
            InventoryEvent::SlotCleared(e) => {
                if let Some(slot) = self.slot_mut(&e.slot) {
                    slot.set_equipped(None);
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(
        &self,
        ctx: &Self::Context,
        command: &Self::Command,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::Move(cmd) => decide::move_stack(self, ctx, cmd),
            InventoryCommand::Split(cmd) => decide::split_stack(self, ctx, cmd),
            InventoryCommand::Drop(cmd) => decide::drop_items(self, cmd),
            InventoryCommand::Equip(cmd) => decide::equip(self, ctx, cmd),
            InventoryCommand::Unequip(cmd) => decide::unequip(self, ctx, cmd),
            InventoryCommand::ApplyLayout(cmd) => crate::layout::apply_layout(self, ctx, cmd),
            InventoryCommand::AddItems(cmd) => decide::add_items(self, ctx, cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gridinv_catalog::ItemCatalog;

    use super::*;
    use crate::command::{QuantityChanged, SlotEquipped, StackCreated, StacksSwapped};
    use crate::context::SlotRules;

    fn ctx() -> InventoryContext {
        InventoryContext::new(
            Arc::new(ItemCatalog::starter()),
            Arc::new(SlotRules::new(["backpack", "head"], ["backpack"])),
        )
    }

    fn fresh() -> Inventory {
        Inventory::provision(InventoryId::new(1), OwnerRef::character(9), &InventoryTemplate::character_default())
    }

    fn created(id: u64, key: &str, qty: u32, x: u32, y: u32) -> InventoryEvent {
        InventoryEvent::StackCreated(StackCreated {
            item_id: ItemInstanceId::new(id),
            def_key: key.to_string(),
            quantity: qty,
            pos: GridPos::new(x, y),
        })
    }

    #[test]
    fn provision_uses_template_shape_and_slots() {
        let inv = fresh();
        assert_eq!((inv.grid_width(), inv.grid_height()), (6, 5));
        assert_eq!(inv.capacity_kg(), 20.0);
        assert_eq!(inv.equipment().len(), 5);
        assert!(inv.find_equipment("PRIMARYWEAPON").is_some());
        assert_eq!(inv.version(), 0);
        assert_eq!(inv.next_item_id(), ItemInstanceId::new(1));
    }

    #[test]
    fn apply_tracks_version_and_id_counter() {
        let mut inv = fresh();
        inv.apply(&created(1, "water", 4, 0, 0));
        inv.apply(&created(5, "burger", 1, 1, 0));

        assert_eq!(inv.version(), 2);
        assert_eq!(inv.next_item_id(), ItemInstanceId::new(6));
        assert_eq!(inv.total_quantity("water"), 4);
    }

    #[test]
    fn swap_exchanges_cells() {
        let mut inv = fresh();
        inv.apply(&created(1, "water", 4, 0, 0));
        inv.apply(&created(2, "burger", 1, 3, 2));
        inv.apply(&InventoryEvent::StacksSwapped(StacksSwapped {
            first: ItemInstanceId::new(1),
            second: ItemInstanceId::new(2),
        }));

        assert_eq!(inv.find_item(ItemInstanceId::new(1)).unwrap().pos(), GridPos::new(3, 2));
        assert_eq!(inv.find_item(ItemInstanceId::new(2)).unwrap().pos(), GridPos::new(0, 0));
        assert!(inv.check_invariants(&ctx()).is_ok());
    }

    #[test]
    fn weight_and_capacity_include_backpack_bonus() {
        let ctx = ctx();
        let mut inv = fresh();
        inv.apply(&created(1, "water", 10, 0, 0));
        inv.apply(&created(2, "burger", 5, 1, 0));
        inv.apply(&InventoryEvent::SlotEquipped(SlotEquipped {
            slot: "backpack".to_string(),
            def_key: "bag_small".to_string(),
            previous: None,
        }));

        assert!((inv.current_weight_kg(&ctx) - 8.0).abs() < 1e-5);
        assert_eq!(inv.effective_capacity_kg(&ctx), 30.0);
    }

    #[test]
    fn invariant_check_catches_overfull_and_shared_cells() {
        let ctx = ctx();
        let mut inv = fresh();
        inv.apply(&created(1, "water", 10, 0, 0));
        inv.apply(&InventoryEvent::QuantityChanged(QuantityChanged {
            item_id: ItemInstanceId::new(1),
            from: 10,
            to: 11,
        }));
        assert!(matches!(inv.check_invariants(&ctx), Err(DomainError::InvariantViolation(_))));

        let mut inv = fresh();
        inv.apply(&created(1, "water", 1, 2, 2));
        inv.apply(&created(2, "burger", 1, 2, 2));
        assert!(inv.check_invariants(&ctx).is_err());
    }

    #[test]
    fn stacks_of_retired_definitions_only_need_quantity() {
        let mut inv = fresh();
        inv.apply(&created(1, "old_relic", 7, 0, 0));
        assert!(inv.check_invariants(&ctx()).is_ok());
    }

    #[test]
    fn invariant_check_catches_mismatched_equipment() {
        let mut inv = fresh();
        inv.apply(&InventoryEvent::SlotEquipped(SlotEquipped {
            slot: "head".to_string(),
            def_key: "bag_small".to_string(),
            previous: None,
        }));
        assert!(inv.check_invariants(&ctx()).is_err());
    }

    #[test]
    fn items_row_major_orders_by_row_then_column() {
        let mut inv = fresh();
        inv.apply(&created(1, "water", 1, 4, 1));
        inv.apply(&created(2, "water", 1, 5, 0));
        inv.apply(&created(3, "water", 1, 0, 1));

        let ids: Vec<u64> = inv.items_row_major().iter().map(|i| i.id().get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
