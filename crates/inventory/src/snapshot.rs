use serde::{Deserialize, Serialize};

use gridinv_core::OwnerKind;

use crate::context::InventoryContext;
use crate::inventory::Inventory;

/// One stack as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: u64,
    pub def_key: String,
    pub qty: u32,
    pub x: u32,
    pub y: u32,
    /// `qty × weightPerUnit`.
    pub weight: f32,
    /// Slot the definition equips into, empty when it does not equip.
    pub equip_slot: String,
}

/// One equipment slot as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipView {
    pub slot: String,
    /// Equipped definition, empty when the slot is free.
    pub def_key: String,
    pub carry_bonus_kg: f32,
}

/// Read-only projection of an inventory, produced after every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub inv_id: u64,
    pub owner_type: OwnerKind,
    pub owner_id: i64,
    pub w: u32,
    pub h: u32,
    /// Base capacity plus carry bonuses.
    pub capacity_kg: f32,
    pub current_kg: f32,
    pub items: Vec<ItemView>,
    pub equip: Vec<EquipView>,
}

impl InventorySnapshot {
    /// Items are listed row-major, equipment in provisioning order.
    pub fn build(inv: &Inventory, ctx: &InventoryContext) -> Self {
        let items = inv
            .items_row_major()
            .into_iter()
            .map(|item| {
                let def = ctx.definition(item.def_key());
                ItemView {
                    id: item.id().get(),
                    def_key: item.def_key().to_string(),
                    qty: item.quantity(),
                    x: item.pos().x,
                    y: item.pos().y,
                    weight: ctx.weight_of(item.def_key(), item.quantity()),
                    equip_slot: def
                        .and_then(|d| d.equip_slot.clone())
                        .unwrap_or_default(),
                }
            })
            .collect();

        let equip = inv
            .equipment()
            .iter()
            .map(|slot| EquipView {
                slot: slot.name().to_string(),
                def_key: slot.equipped().unwrap_or_default().to_string(),
                carry_bonus_kg: slot.equipped().map(|key| ctx.carry_bonus_kg(key)).unwrap_or(0.0),
            })
            .collect();

        Self {
            inv_id: inv.inventory_id().get(),
            owner_type: inv.owner().kind,
            owner_id: inv.owner().id,
            w: inv.grid_width(),
            h: inv.grid_height(),
            capacity_kg: inv.effective_capacity_kg(ctx),
            current_kg: inv.current_weight_kg(ctx),
            items,
            equip,
        }
    }

    pub fn item_at(&self, x: u32, y: u32) -> Option<&ItemView> {
        self.items.iter().find(|i| i.x == x && i.y == y)
    }

    pub fn slot(&self, name: &str) -> Option<&EquipView> {
        self.equip.iter().find(|e| e.slot.eq_ignore_ascii_case(name))
    }
}
