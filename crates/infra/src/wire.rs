//! Request decoding for transports.
//!
//! Callers send signed, loosely-typed numbers. Decoding is total: negative
//! counts and indices clamp to 0, non-positive ids carry no identity, and a
//! negative grid coordinate maps to a cell that lies outside every grid so the
//! aggregate reports it as out of bounds.

use serde::{Deserialize, Serialize};

use gridinv_core::{GridPos, ItemInstanceId};
use gridinv_inventory::LayoutEntry;

/// Never assigned by an inventory; resolves to an unknown item.
const NO_ITEM: ItemInstanceId = ItemInstanceId::new(0);

fn count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

fn coordinate(raw: i64) -> u32 {
    u32::try_from(raw).unwrap_or(u32::MAX)
}

fn item_id(raw: i64) -> ItemInstanceId {
    ItemInstanceId::from_wire(raw).unwrap_or(NO_ITEM)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub item_id: i64,
    pub to_x: i64,
    pub to_y: i64,
}

impl MoveRequest {
    pub fn decode(&self) -> (ItemInstanceId, GridPos) {
        (item_id(self.item_id), GridPos::new(coordinate(self.to_x), coordinate(self.to_y)))
    }
}

/// Body of `split` and `drop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub item_id: i64,
    pub amount: i64,
}

impl AmountRequest {
    pub fn decode(&self) -> (ItemInstanceId, u32) {
        (item_id(self.item_id), count(self.amount))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    pub item_id: i64,
    #[serde(default)]
    pub slot: String,
}

impl EquipRequest {
    pub fn decode(&self) -> (ItemInstanceId, &str) {
        (item_id(self.item_id), self.slot.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnequipRequest {
    #[serde(default)]
    pub slot: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsRequest {
    #[serde(default)]
    pub def_key: String,
    #[serde(default = "one")]
    pub qty: i64,
}

fn one() -> i64 {
    1
}

impl AddItemsRequest {
    pub fn decode(&self) -> (&str, u32) {
        (self.def_key.trim(), count(self.qty))
    }
}

/// One entry of a client layout.
///
/// `x`/`y` are optional; when missing or negative they are derived from the
/// row-major `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntryDto {
    /// `<= 0` asks for a new stack.
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub def_key: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
}

impl LayoutEntryDto {
    pub fn decode(&self, grid_width: u32) -> LayoutEntry {
        let fallback = GridPos::from_linear(count(self.index), grid_width);
        let x = self.x.filter(|x| *x >= 0).map_or(fallback.x, coordinate);
        let y = self.y.filter(|y| *y >= 0).map_or(fallback.y, coordinate);

        LayoutEntry {
            item_id: ItemInstanceId::from_wire(self.id),
            def_key: self.def_key.trim().to_string(),
            quantity: count(self.qty),
            pos: GridPos::new(x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub items: Vec<LayoutEntryDto>,
}

impl LayoutRequest {
    pub fn decode(&self, grid_width: u32) -> Vec<LayoutEntry> {
        self.items.iter().map(|entry| entry.decode(grid_width)).collect()
    }
}
