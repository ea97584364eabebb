//! Decision logic for the single-stack verbs.
//!
//! Every decision works on a [`Draft`]: a scratch copy of the inventory that
//! applies each event as soon as it is decided. Multi-step verbs (split,
//! equip with displacement) therefore always decide against the state the
//! previous step produced, and a rejection simply drops the draft.

use gridinv_catalog::ItemDefinition;
use gridinv_core::{Aggregate, GridPos, ItemInstanceId};

use crate::command::{
    AddItems, DropItems, EquipItem, InventoryEvent, MoveStack, QuantityChanged, SlotCleared,
    SlotEquipped, SlotProvisioned, SplitStack, StackCreated, StackMoved, StackRemoved,
    StacksSwapped, UnequipSlot,
};
use crate::context::InventoryContext;
use crate::error::Rejection;
use crate::inventory::{Inventory, InventoryItem};
use crate::placement::{Allocation, AllocationPlan};

pub(crate) type Decision = Result<Vec<InventoryEvent>, Rejection>;

pub(crate) struct Draft {
    state: Inventory,
    events: Vec<InventoryEvent>,
}

impl Draft {
    pub(crate) fn new(base: &Inventory) -> Self {
        Self {
            state: base.clone(),
            events: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> &Inventory {
        &self.state
    }

    pub(crate) fn record(&mut self, event: InventoryEvent) {
        self.state.apply(&event);
        self.events.push(event);
    }

    pub(crate) fn into_events(self) -> Vec<InventoryEvent> {
        self.events
    }

    /// Create a new stack with the next free id.
    pub(crate) fn create_stack(&mut self, def_key: &str, quantity: u32, pos: GridPos) {
        let item_id = self.state.next_item_id();
        self.record(InventoryEvent::StackCreated(StackCreated {
            item_id,
            def_key: def_key.to_string(),
            quantity,
            pos,
        }));
    }

    pub(crate) fn set_quantity(&mut self, item: &InventoryItem, to: u32) {
        if to == 0 {
            self.record(InventoryEvent::StackRemoved(StackRemoved {
                item_id: item.id(),
                def_key: item.def_key().to_string(),
                quantity: item.quantity(),
            }));
        } else if to != item.quantity() {
            self.record(InventoryEvent::QuantityChanged(QuantityChanged {
                item_id: item.id(),
                from: item.quantity(),
                to,
            }));
        }
    }

    /// Record every step of an allocation plan for `def_key`.
    pub(crate) fn apply_plan(&mut self, def_key: &str, plan: &AllocationPlan) {
        for allocation in &plan.allocations {
            match allocation {
                Allocation::TopUp { item_id, add } => {
                    if let Some(stack) = self.state.find_item(*item_id).cloned() {
                        self.set_quantity(&stack, stack.quantity() + add);
                    }
                }
                Allocation::NewStack { pos, quantity } => self.create_stack(def_key, *quantity, *pos),
            }
        }
    }

    /// Return one unit of `def_key` to the grid, stack-first.
    ///
    /// Fails with `NoSpace` (recording nothing) when neither a partial stack
    /// nor a free cell is available.
    pub(crate) fn place_one(&mut self, ctx: &InventoryContext, def_key: &str) -> Result<(), Rejection> {
        let fallback;
        let def = match ctx.definition(def_key) {
            Some(def) => def,
            None => {
                fallback = ItemDefinition::new(def_key, def_key, "", 0.0, 1);
                &fallback
            }
        };
        let plan = self.state.plan_stack_first_add(def, 1, None);
        if plan.placed < 1 {
            return Err(Rejection::NoSpace);
        }
        self.apply_plan(def_key, &plan);
        Ok(())
    }
}

fn item_of(inv: &Inventory, id: ItemInstanceId) -> Result<InventoryItem, Rejection> {
    inv.find_item(id).cloned().ok_or(Rejection::UnknownItem(id))
}

pub(crate) fn move_stack(inv: &Inventory, ctx: &InventoryContext, cmd: &MoveStack) -> Decision {
    let item = item_of(inv, cmd.item_id)?;
    if !inv.contains(cmd.to) {
        return Err(Rejection::OutOfBounds(cmd.to));
    }
    if item.pos() == cmd.to {
        return Ok(vec![]);
    }

    let mut draft = Draft::new(inv);
    match inv.find_stack_at(cmd.to).cloned() {
        None => draft.record(InventoryEvent::StackMoved(StackMoved {
            item_id: item.id(),
            from: item.pos(),
            to: cmd.to,
        })),
        Some(dest)
            if dest.def_key() == item.def_key() && dest.quantity() < ctx.max_stack(dest.def_key()) =>
        {
            let room = ctx.max_stack(dest.def_key()) - dest.quantity();
            let transfer = room.min(item.quantity());
            draft.set_quantity(&dest, dest.quantity() + transfer);
            draft.set_quantity(&item, item.quantity() - transfer);
        }
        Some(dest) => draft.record(InventoryEvent::StacksSwapped(StacksSwapped {
            first: item.id(),
            second: dest.id(),
        })),
    }
    Ok(draft.into_events())
}

pub(crate) fn split_stack(inv: &Inventory, ctx: &InventoryContext, cmd: &SplitStack) -> Decision {
    let item = item_of(inv, cmd.item_id)?;
    let def = ctx
        .definition(item.def_key())
        .ok_or_else(|| Rejection::UnknownDefinition(item.def_key().to_string()))?;
    if cmd.amount == 0 || cmd.amount >= item.quantity() {
        return Err(Rejection::InvalidAmount);
    }
    if !def.is_stackable() {
        return Err(Rejection::NotStackable(def.key.clone()));
    }

    let plan = inv.plan_stack_first_add(def, cmd.amount, Some(item.id()));
    if plan.placed == 0 {
        return Err(Rejection::NoSpace);
    }

    let mut draft = Draft::new(inv);
    draft.apply_plan(&def.key, &plan);
    draft.set_quantity(&item, item.quantity() - plan.placed);
    Ok(draft.into_events())
}

pub(crate) fn drop_items(inv: &Inventory, cmd: &DropItems) -> Decision {
    let item = item_of(inv, cmd.item_id)?;
    if cmd.amount == 0 {
        return Err(Rejection::InvalidAmount);
    }

    let take = cmd.amount.min(item.quantity());
    let mut draft = Draft::new(inv);
    draft.set_quantity(&item, item.quantity() - take);
    Ok(draft.into_events())
}

pub(crate) fn equip(inv: &Inventory, ctx: &InventoryContext, cmd: &EquipItem) -> Decision {
    if !inv.allows_equipment() {
        return Err(Rejection::EquipmentDisabled);
    }
    let requested = cmd.slot.trim();
    let canonical = ctx
        .slots
        .canonical(requested)
        .ok_or_else(|| Rejection::UnknownSlot(requested.to_string()))?;
    let item = item_of(inv, cmd.item_id)?;
    let def = ctx
        .definition(item.def_key())
        .ok_or_else(|| Rejection::UnknownDefinition(item.def_key().to_string()))?;
    if !def.fits_slot(requested) {
        return Err(Rejection::SlotMismatch {
            def_key: def.key.clone(),
            slot: requested.to_string(),
        });
    }

    let mut draft = Draft::new(inv);
    let (slot_name, previous) = match inv.find_equipment(requested) {
        Some(slot) => (slot.name().to_string(), slot.equipped().map(String::from)),
        None => {
            draft.record(InventoryEvent::SlotProvisioned(SlotProvisioned {
                slot: canonical.to_string(),
            }));
            (canonical.to_string(), None)
        }
    };

    if let Some(prev) = previous.as_deref() {
        draft.place_one(ctx, prev)?;
    }

    // Displacement may have topped up the source stack; consume from its current state.
    let source = item_of(draft.state(), item.id())?;
    draft.set_quantity(&source, source.quantity() - 1);
    draft.record(InventoryEvent::SlotEquipped(SlotEquipped {
        slot: slot_name,
        def_key: def.key.clone(),
        previous,
    }));
    Ok(draft.into_events())
}

pub(crate) fn unequip(inv: &Inventory, ctx: &InventoryContext, cmd: &UnequipSlot) -> Decision {
    let requested = cmd.slot.trim();
    let slot = inv
        .find_equipment(requested)
        .ok_or_else(|| Rejection::UnknownSlot(requested.to_string()))?;
    let def_key = slot
        .equipped()
        .ok_or_else(|| Rejection::SlotEmpty(slot.name().to_string()))?
        .to_string();

    let mut draft = Draft::new(inv);
    draft.place_one(ctx, &def_key)?;
    draft.record(InventoryEvent::SlotCleared(SlotCleared {
        slot: slot.name().to_string(),
        def_key,
    }));
    Ok(draft.into_events())
}

pub(crate) fn add_items(inv: &Inventory, ctx: &InventoryContext, cmd: &AddItems) -> Decision {
    let key = cmd.def_key.trim();
    let def = ctx
        .definition(key)
        .ok_or_else(|| Rejection::UnknownDefinition(key.to_string()))?;
    if cmd.quantity == 0 {
        return Err(Rejection::InvalidAmount);
    }

    let plan = inv.plan_stack_first_add(def, cmd.quantity, None);
    if plan.placed == 0 {
        return Err(Rejection::NoSpace);
    }

    let mut draft = Draft::new(inv);
    draft.apply_plan(&def.key, &plan);
    Ok(draft.into_events())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gridinv_catalog::{ItemCatalog, ItemDefinition};
    use gridinv_core::{GridPos, InventoryId, OwnerRef};

    use super::*;
    use crate::command::InventoryCommand;
    use crate::context::SlotRules;
    use crate::inventory::InventoryTemplate;

    fn catalog() -> ItemCatalog {
        ItemCatalog::builder()
            .with(ItemDefinition::new("water", "Water", "consumable", 0.5, 10))
            .and_then(|b| b.with(ItemDefinition::new("x", "X", "misc", 1.0, 5)))
            .and_then(|b| b.with(ItemDefinition::new("burger", "Burger", "consumable", 0.6, 10)))
            .and_then(|b| {
                b.with(
                    ItemDefinition::new("bag_small", "Bag", "backpack", 0.8, 1)
                        .with_equip_slot("backpack")
                        .with_carry_bonus(10.0),
                )
            })
            .and_then(|b| {
                b.with(
                    ItemDefinition::new("bag_large", "Big Bag", "backpack", 1.5, 1)
                        .with_equip_slot("backpack")
                        .with_carry_bonus(25.0),
                )
            })
            .and_then(|b| b.with(ItemDefinition::new("cap", "Cap", "wear", 0.1, 3).with_equip_slot("hat")))
            .unwrap()
            .build()
    }

    fn ctx() -> InventoryContext {
        InventoryContext::new(
            Arc::new(catalog()),
            Arc::new(SlotRules::new(["backpack", "head", "hat"], ["backpack"])),
        )
    }

    fn inventory(w: u32, h: u32) -> Inventory {
        let template = InventoryTemplate {
            grid_width: w,
            grid_height: h,
            ..InventoryTemplate::character_default()
        };
        Inventory::provision(InventoryId::new(1), OwnerRef::character(1), &template)
    }

    fn run(inv: &mut Inventory, ctx: &InventoryContext, cmd: InventoryCommand) -> Decision {
        let events = inv.handle(ctx, &cmd)?;
        inv.apply_all(&events);
        inv.check_invariants(ctx).expect("invariants hold after every decision");
        Ok(events)
    }

    fn add(inv: &mut Inventory, ctx: &InventoryContext, key: &str, quantity: u32) {
        run(inv, ctx, InventoryCommand::AddItems(AddItems { def_key: key.to_string(), quantity })).unwrap();
    }

    fn id(n: u64) -> ItemInstanceId {
        ItemInstanceId::new(n)
    }

    fn qty_at(inv: &Inventory, x: u32, y: u32) -> Option<(String, u32)> {
        inv.find_stack_at(GridPos::new(x, y))
            .map(|i| (i.def_key().to_string(), i.quantity()))
    }

    #[test]
    fn add_water_fills_three_stacks_row_major() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 23);

        assert_eq!(qty_at(&inv, 0, 0), Some(("water".into(), 10)));
        assert_eq!(qty_at(&inv, 1, 0), Some(("water".into(), 10)));
        assert_eq!(qty_at(&inv, 2, 0), Some(("water".into(), 3)));
        assert_eq!(inv.current_weight_kg(&ctx), 11.5);
    }

    #[test]
    fn add_into_nearly_full_grid_places_partially() {
        let ctx = ctx();
        let mut inv = inventory(2, 1);
        add(&mut inv, &ctx, "water", 10);

        let events = run(
            &mut inv,
            &ctx,
            InventoryCommand::AddItems(AddItems { def_key: "water".into(), quantity: 25 }),
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(inv.total_quantity("water"), 20);
    }

    #[test]
    fn add_into_full_grid_is_no_space() {
        let ctx = ctx();
        let mut inv = inventory(1, 1);
        add(&mut inv, &ctx, "burger", 10);

        let err = run(&mut inv, &ctx, InventoryCommand::AddItems(AddItems { def_key: "water".into(), quantity: 1 }))
            .unwrap_err();
        assert_eq!(err, Rejection::NoSpace);
    }

    #[test]
    fn add_unknown_definition_is_rejected() {
        let ctx = ctx();
        let mut inv = inventory(2, 2);
        let err = run(&mut inv, &ctx, InventoryCommand::AddItems(AddItems { def_key: "ghost".into(), quantity: 1 }))
            .unwrap_err();
        assert_eq!(err, Rejection::UnknownDefinition("ghost".into()));
    }

    #[test]
    fn move_into_empty_cell_relocates() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "burger", 2);

        run(&mut inv, &ctx, InventoryCommand::Move(MoveStack { item_id: id(1), to: GridPos::new(4, 3) })).unwrap();

        assert_eq!(inv.find_item(id(1)).unwrap().pos(), GridPos::new(4, 3));
        assert_eq!(qty_at(&inv, 0, 0), None);
    }

    #[test]
    fn move_onto_same_definition_merges_up_to_cap() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        // id1 = 3 at (0,0), id2 = 4 at (1,0)
        add(&mut inv, &ctx, "x", 5);
        add(&mut inv, &ctx, "x", 4);
        run(&mut inv, &ctx, InventoryCommand::Drop(DropItems { item_id: id(1), amount: 2 })).unwrap();

        run(&mut inv, &ctx, InventoryCommand::Move(MoveStack { item_id: id(1), to: GridPos::new(1, 0) })).unwrap();

        let a = inv.find_item(id(1)).unwrap();
        let b = inv.find_item(id(2)).unwrap();
        assert_eq!(b.quantity(), 5);
        assert_eq!(a.quantity(), 2);
        assert_eq!(a.pos(), GridPos::new(0, 0));
    }

    #[test]
    fn move_fully_merged_source_is_removed() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 10);
        add(&mut inv, &ctx, "water", 2);
        run(&mut inv, &ctx, InventoryCommand::Drop(DropItems { item_id: id(1), amount: 5 })).unwrap();

        run(&mut inv, &ctx, InventoryCommand::Move(MoveStack { item_id: id(2), to: GridPos::new(0, 0) })).unwrap();

        assert!(inv.find_item(id(2)).is_none());
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 7);
    }

    #[test]
    fn move_onto_different_definition_swaps() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 3);
        add(&mut inv, &ctx, "burger", 2);

        run(&mut inv, &ctx, InventoryCommand::Move(MoveStack { item_id: id(1), to: GridPos::new(1, 0) })).unwrap();

        assert_eq!(qty_at(&inv, 1, 0), Some(("water".into(), 3)));
        assert_eq!(qty_at(&inv, 0, 0), Some(("burger".into(), 2)));
    }

    #[test]
    fn move_onto_full_stack_of_same_definition_swaps() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 13);

        run(&mut inv, &ctx, InventoryCommand::Move(MoveStack { item_id: id(2), to: GridPos::new(0, 0) })).unwrap();

        assert_eq!(qty_at(&inv, 0, 0), Some(("water".into(), 3)));
        assert_eq!(qty_at(&inv, 1, 0), Some(("water".into(), 10)));
    }

    #[test]
    fn move_rejects_unknown_item_and_out_of_bounds() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 1);

        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Move(MoveStack { item_id: id(9), to: GridPos::new(1, 1) })),
            Err(Rejection::UnknownItem(id(9)))
        );
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Move(MoveStack { item_id: id(1), to: GridPos::new(6, 0) })),
            Err(Rejection::OutOfBounds(GridPos::new(6, 0)))
        );
    }

    #[test]
    fn move_onto_own_cell_changes_nothing() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 4);
        let events = inv
            .handle(&ctx, &InventoryCommand::Move(MoveStack { item_id: id(1), to: GridPos::new(0, 0) }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn split_tops_up_other_stacks_before_new_cells() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 14);
        // id1 = 10 at (0,0), id2 = 4 at (1,0)

        run(&mut inv, &ctx, InventoryCommand::Split(SplitStack { item_id: id(1), amount: 8 })).unwrap();

        assert_eq!(inv.find_item(id(2)).unwrap().quantity(), 10);
        assert_eq!(qty_at(&inv, 2, 0), Some(("water".into(), 2)));
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 2);
        assert_eq!(inv.total_quantity("water"), 14);
    }

    #[test]
    fn split_on_full_grid_keeps_remainder_in_source() {
        let ctx = ctx();
        let mut inv = inventory(2, 1);
        add(&mut inv, &ctx, "water", 10);
        add(&mut inv, &ctx, "burger", 1);

        assert_eq!(
            run(&mut inv, &ctx, InventoryCommand::Split(SplitStack { item_id: id(1), amount: 4 })),
            Err(Rejection::NoSpace)
        );
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 10);
    }

    #[test]
    fn split_partial_when_only_some_room_exists() {
        let ctx = ctx();
        let mut inv = inventory(3, 1);
        add(&mut inv, &ctx, "water", 18);
        // id1 = 10 at (0,0), id2 = 8 at (1,0); one free cell at (2,0)
        run(&mut inv, &ctx, InventoryCommand::Split(SplitStack { item_id: id(1), amount: 9 })).unwrap();

        assert_eq!(inv.find_item(id(2)).unwrap().quantity(), 10);
        assert_eq!(qty_at(&inv, 2, 0), Some(("water".into(), 7)));
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 1);
    }

    #[test]
    fn split_rejects_bad_amounts_and_unstackables() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 5);
        add(&mut inv, &ctx, "bag_small", 1);

        for amount in [0, 5, 6] {
            assert_eq!(
                inv.handle(&ctx, &InventoryCommand::Split(SplitStack { item_id: id(1), amount })),
                Err(Rejection::InvalidAmount),
                "amount {amount}"
            );
        }
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Split(SplitStack { item_id: id(2), amount: 1 })),
            Err(Rejection::InvalidAmount)
        );
    }

    #[test]
    fn split_rejects_non_stackable_definition() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "bag_small", 1);
        // A legacy stack of a non-stackable item holding more than one unit.
        inv.apply(&InventoryEvent::QuantityChanged(QuantityChanged { item_id: id(1), from: 1, to: 3 }));

        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Split(SplitStack { item_id: id(1), amount: 1 })),
            Err(Rejection::NotStackable("bag_small".into()))
        );
    }

    #[test]
    fn drop_removes_at_most_the_stack() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 6);

        run(&mut inv, &ctx, InventoryCommand::Drop(DropItems { item_id: id(1), amount: 2 })).unwrap();
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 4);

        run(&mut inv, &ctx, InventoryCommand::Drop(DropItems { item_id: id(1), amount: 99 })).unwrap();
        assert!(inv.find_item(id(1)).is_none());

        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Drop(DropItems { item_id: id(1), amount: 1 })),
            Err(Rejection::UnknownItem(id(1)))
        );
    }

    #[test]
    fn drop_zero_is_invalid() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "water", 6);
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Drop(DropItems { item_id: id(1), amount: 0 })),
            Err(Rejection::InvalidAmount)
        );
    }

    #[test]
    fn equip_consumes_one_unit_and_sets_slot() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "bag_small", 1);

        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "Backpack".into() })).unwrap();

        assert!(inv.items().is_empty());
        assert_eq!(inv.find_equipment("backpack").unwrap().equipped(), Some("bag_small"));
        assert_eq!(inv.effective_capacity_kg(&ctx), 30.0);
    }

    #[test]
    fn equip_displaces_previous_occupant_into_grid() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "bag_small", 1);
        add(&mut inv, &ctx, "bag_large", 1);
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "backpack".into() })).unwrap();

        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(2), slot: "backpack".into() })).unwrap();

        assert_eq!(inv.find_equipment("backpack").unwrap().equipped(), Some("bag_large"));
        assert_eq!(inv.total_quantity("bag_small"), 1);
        assert_eq!(inv.total_quantity("bag_large"), 0);
    }

    #[test]
    fn equip_aborts_when_displaced_unit_has_nowhere_to_go() {
        let ctx = ctx();
        let mut inv = inventory(2, 1);
        add(&mut inv, &ctx, "bag_large", 1);
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "backpack".into() })).unwrap();
        add(&mut inv, &ctx, "bag_small", 1);
        add(&mut inv, &ctx, "water", 1);
        let before = inv.clone();

        let err = run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(2), slot: "backpack".into() }))
            .unwrap_err();

        assert_eq!(err, Rejection::NoSpace);
        assert_eq!(inv, before);
        assert_eq!(inv.find_equipment("backpack").unwrap().equipped(), Some("bag_large"));
    }

    #[test]
    fn equip_displacement_can_merge_into_the_source_stack() {
        let ctx = ctx();
        let mut inv = inventory(1, 1);
        add(&mut inv, &ctx, "cap", 2);
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "hat".into() })).unwrap();
        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 1);

        // Re-equip the same definition: the displaced unit tops up the source, then one is consumed.
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "HAT".into() })).unwrap();

        assert_eq!(inv.find_item(id(1)).unwrap().quantity(), 1);
        assert_eq!(inv.find_equipment("hat").unwrap().equipped(), Some("cap"));
    }

    #[test]
    fn equip_rejects_unknown_slot_and_mismatch() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "bag_small", 1);
        add(&mut inv, &ctx, "water", 1);

        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "tail".into() })),
            Err(Rejection::UnknownSlot("tail".into()))
        );
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Equip(EquipItem { item_id: id(2), slot: "backpack".into() })),
            Err(Rejection::SlotMismatch { def_key: "water".into(), slot: "backpack".into() })
        );
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "head".into() })),
            Err(Rejection::SlotMismatch { def_key: "bag_small".into(), slot: "head".into() })
        );
    }

    #[test]
    fn equip_provisions_recognized_slot_missing_from_inventory() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "cap", 1);
        assert!(inv.find_equipment("hat").is_none());

        let events = run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "Hat".into() }))
            .unwrap();

        assert!(matches!(events[0], InventoryEvent::SlotProvisioned(_)));
        assert_eq!(inv.find_equipment("hat").unwrap().name(), "hat");
    }

    #[test]
    fn equip_is_refused_when_inventory_has_no_equipment() {
        let ctx = ctx();
        let template = InventoryTemplate::vehicle_default();
        let mut inv = Inventory::provision(InventoryId::new(2), OwnerRef::vehicle(3), &template);
        add(&mut inv, &ctx, "bag_small", 1);

        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "backpack".into() })),
            Err(Rejection::EquipmentDisabled)
        );
    }

    #[test]
    fn unequip_returns_unit_and_clears_slot() {
        let ctx = ctx();
        let mut inv = inventory(6, 5);
        add(&mut inv, &ctx, "bag_small", 1);
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "backpack".into() })).unwrap();

        run(&mut inv, &ctx, InventoryCommand::Unequip(UnequipSlot { slot: "BACKPACK".into() })).unwrap();

        assert_eq!(inv.find_equipment("backpack").unwrap().equipped(), None);
        assert_eq!(qty_at(&inv, 0, 0), Some(("bag_small".into(), 1)));
    }

    #[test]
    fn unequip_on_full_grid_keeps_slot_occupied() {
        let ctx = ctx();
        let mut inv = inventory(1, 1);
        add(&mut inv, &ctx, "bag_small", 1);
        run(&mut inv, &ctx, InventoryCommand::Equip(EquipItem { item_id: id(1), slot: "backpack".into() })).unwrap();
        add(&mut inv, &ctx, "water", 1);

        assert_eq!(
            run(&mut inv, &ctx, InventoryCommand::Unequip(UnequipSlot { slot: "backpack".into() })),
            Err(Rejection::NoSpace)
        );
        assert_eq!(inv.find_equipment("backpack").unwrap().equipped(), Some("bag_small"));
    }

    #[test]
    fn unequip_empty_or_unknown_slot_is_rejected() {
        let ctx = ctx();
        let inv = inventory(6, 5);
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Unequip(UnequipSlot { slot: "head".into() })),
            Err(Rejection::SlotEmpty("head".into()))
        );
        assert_eq!(
            inv.handle(&ctx, &InventoryCommand::Unequip(UnequipSlot { slot: "wings".into() })),
            Err(Rejection::UnknownSlot("wings".into()))
        );
    }
}
