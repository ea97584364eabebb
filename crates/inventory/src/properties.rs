//! Property tests over random command sequences.

use std::sync::Arc;

use proptest::prelude::*;

use gridinv_catalog::{ItemCatalog, ItemDefinition};
use gridinv_core::{Aggregate, GridPos, InventoryId, ItemInstanceId, OwnerRef};

use crate::command::{
    AddItems, DropItems, EquipItem, InventoryCommand, MoveStack, SplitStack, UnequipSlot,
};
use crate::context::{InventoryContext, SlotRules};
use crate::inventory::{Inventory, InventoryTemplate};

const KEYS: [&str; 5] = ["water", "burger", "medikit", "bag_small", "cap"];
const SLOTS: [&str; 4] = ["backpack", "hat", "head", "tail"];

fn ctx() -> InventoryContext {
    let catalog = ItemCatalog::builder()
        .with(ItemDefinition::new("water", "Water", "consumable", 0.5, 10))
        .and_then(|b| b.with(ItemDefinition::new("burger", "Burger", "consumable", 0.6, 10)))
        .and_then(|b| b.with(ItemDefinition::new("medikit", "Medikit", "medical", 0.5, 5)))
        .and_then(|b| {
            b.with(
                ItemDefinition::new("bag_small", "Small Bag", "backpack", 0.8, 1)
                    .with_equip_slot("backpack")
                    .with_carry_bonus(10.0),
            )
        })
        .and_then(|b| b.with(ItemDefinition::new("cap", "Cap", "wear", 0.1, 3).with_equip_slot("hat")))
        .unwrap()
        .build();
    InventoryContext::new(Arc::new(catalog), Arc::new(SlotRules::new(["backpack", "head", "hat"], ["backpack"])))
}

fn small_inventory() -> Inventory {
    let template = InventoryTemplate {
        grid_width: 4,
        grid_height: 3,
        ..InventoryTemplate::character_default()
    };
    Inventory::provision(InventoryId::new(1), OwnerRef::character(1), &template)
}

/// Stacks as (definition, quantity, cell), ignoring instance ids.
fn stack_layout(inv: &Inventory) -> Vec<(String, u32, (u32, u32))> {
    let mut stacks: Vec<_> = inv
        .items()
        .iter()
        .map(|i| (i.def_key().to_string(), i.quantity(), (i.pos().x, i.pos().y)))
        .collect();
    stacks.sort();
    stacks
}

fn item_id() -> impl Strategy<Value = ItemInstanceId> {
    (1u64..24).prop_map(ItemInstanceId::new)
}

fn command() -> impl Strategy<Value = InventoryCommand> {
    prop_oneof![
        3 => (0..KEYS.len(), 1u32..25).prop_map(|(k, quantity)| {
            InventoryCommand::AddItems(AddItems { def_key: KEYS[k].to_string(), quantity })
        }),
        3 => (item_id(), 0u32..6, 0u32..5).prop_map(|(item_id, x, y)| {
            InventoryCommand::Move(MoveStack { item_id, to: GridPos::new(x, y) })
        }),
        2 => (item_id(), 0u32..12).prop_map(|(item_id, amount)| {
            InventoryCommand::Split(SplitStack { item_id, amount })
        }),
        1 => (item_id(), 0u32..12).prop_map(|(item_id, amount)| {
            InventoryCommand::Drop(DropItems { item_id, amount })
        }),
        2 => (item_id(), 0..SLOTS.len()).prop_map(|(item_id, s)| {
            InventoryCommand::Equip(EquipItem { item_id, slot: SLOTS[s].to_string() })
        }),
        1 => (0..SLOTS.len()).prop_map(|s| {
            InventoryCommand::Unequip(UnequipSlot { slot: SLOTS[s].to_string() })
        }),
    ]
}

/// Units of `key` in the grid plus those sitting in equipment slots.
fn held(inv: &Inventory, key: &str) -> u64 {
    let equipped = inv.equipment().iter().filter(|s| s.equipped() == Some(key)).count() as u64;
    inv.total_quantity(key) + equipped
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: every reachable state keeps one stack per cell and quantities within 1..=maxStack.
    #[test]
    fn invariants_hold_after_any_command_sequence(commands in prop::collection::vec(command(), 1..40)) {
        let ctx = ctx();
        let mut inv = small_inventory();

        for cmd in &commands {
            let before = inv.clone();
            match inv.handle(&ctx, cmd) {
                Ok(events) => inv.apply_all(&events),
                Err(_) => {
                    prop_assert_eq!(&inv, &before);
                }
            }
            prop_assert!(inv.check_invariants(&ctx).is_ok(), "{:?} broke invariants: {:?}", cmd, inv.check_invariants(&ctx));
        }
    }

    /// Property: move, split and equip/unequip never create or destroy units.
    #[test]
    fn rearranging_commands_conserve_units(commands in prop::collection::vec(command(), 1..40)) {
        let ctx = ctx();
        let mut inv = small_inventory();

        for cmd in &commands {
            let conserving = !matches!(cmd, InventoryCommand::AddItems(_) | InventoryCommand::Drop(_));
            let before: Vec<u64> = KEYS.iter().map(|k| held(&inv, k)).collect();
            if let Ok(events) = inv.handle(&ctx, cmd) {
                inv.apply_all(&events);
            }
            if conserving {
                let after: Vec<u64> = KEYS.iter().map(|k| held(&inv, k)).collect();
                prop_assert_eq!(before, after, "{:?}", cmd);
            }
        }
    }

    /// Property: splitting and then merging every resulting stack back restores the starting total.
    #[test]
    fn split_then_merge_restores_total(quantity in 2u32..=10, amount in 1u32..10) {
        prop_assume!(amount < quantity);
        let ctx = ctx();
        let mut inv = small_inventory();
        let events = inv.handle(&ctx, &InventoryCommand::AddItems(AddItems { def_key: "water".into(), quantity })).unwrap();
        inv.apply_all(&events);

        let events = inv.handle(&ctx, &InventoryCommand::Split(SplitStack { item_id: ItemInstanceId::new(1), amount })).unwrap();
        inv.apply_all(&events);
        prop_assert_eq!(inv.items().len(), 2);

        let target = inv.find_item(ItemInstanceId::new(1)).unwrap().pos();
        let other = inv.items().iter().find(|i| i.id() != ItemInstanceId::new(1)).unwrap().id();
        let events = inv.handle(&ctx, &InventoryCommand::Move(MoveStack { item_id: other, to: target })).unwrap();
        inv.apply_all(&events);

        prop_assert_eq!(inv.items().len(), 1);
        prop_assert_eq!(inv.total_quantity("water"), u64::from(quantity));
    }

    /// Property: equip followed by unequip on a grid with room restores every stack's definition, quantity and cell, and frees the slot.
    #[test]
    fn equip_unequip_round_trip(caps in 1u32..=3, fillers in 0u32..8) {
        let ctx = ctx();
        let mut inv = small_inventory();
        for cmd in [
            InventoryCommand::AddItems(AddItems { def_key: "cap".into(), quantity: caps }),
            InventoryCommand::AddItems(AddItems { def_key: "water".into(), quantity: fillers * 10 + 1 }),
        ] {
            let events = inv.handle(&ctx, &cmd).unwrap();
            inv.apply_all(&events);
        }
        let totals = inv.totals_by_definition();
        let layout = stack_layout(&inv);

        let events = inv.handle(&ctx, &InventoryCommand::Equip(EquipItem { item_id: ItemInstanceId::new(1), slot: "hat".into() })).unwrap();
        inv.apply_all(&events);
        let events = inv.handle(&ctx, &InventoryCommand::Unequip(UnequipSlot { slot: "hat".into() })).unwrap();
        inv.apply_all(&events);

        prop_assert_eq!(inv.totals_by_definition(), totals);
        prop_assert_eq!(stack_layout(&inv), layout);
        prop_assert_eq!(inv.find_equipment("hat").and_then(|s| s.equipped()), None);
    }

    /// Property: with one free cell and every other stack full, an add places at most one stack's worth.
    #[test]
    fn add_into_last_free_cell_is_partial(quantity in 1u32..40) {
        let ctx = ctx();
        let mut inv = small_inventory();
        let events = inv.handle(&ctx, &InventoryCommand::AddItems(AddItems { def_key: "water".into(), quantity: 110 })).unwrap();
        inv.apply_all(&events);
        prop_assert_eq!(inv.items().len(), 11);

        let events = inv.handle(&ctx, &InventoryCommand::AddItems(AddItems { def_key: "medikit".into(), quantity })).unwrap();
        inv.apply_all(&events);

        prop_assert_eq!(inv.total_quantity("medikit"), u64::from(quantity.min(5)));
        prop_assert!(inv.find_first_free_cell().is_none());
    }
}
