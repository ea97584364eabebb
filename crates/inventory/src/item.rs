use gridinv_core::{Entity, GridPos, ItemInstanceId};

/// One stack of a single item definition at one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    id: ItemInstanceId,
    def_key: String,
    quantity: u32,
    pos: GridPos,
}

impl InventoryItem {
    pub fn new(id: ItemInstanceId, def_key: impl Into<String>, quantity: u32, pos: GridPos) -> Self {
        Self {
            id,
            def_key: def_key.into(),
            quantity,
            pos,
        }
    }

    pub fn id(&self) -> ItemInstanceId {
        self.id
    }

    pub fn def_key(&self) -> &str {
        &self.def_key
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_pos(&mut self, pos: GridPos) {
        self.pos = pos;
    }
}

impl Entity for InventoryItem {
    type Id = ItemInstanceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One named equipment slot on an inventory.
///
/// Only the equipped definition is remembered, not an instance: equipping
/// consumes one unit from a grid stack, unequipping puts one unit back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentSlot {
    name: String,
    equipped: Option<String>,
}

impl EquipmentSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            equipped: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn equipped(&self) -> Option<&str> {
        self.equipped.as_deref()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    pub(crate) fn set_equipped(&mut self, def_key: Option<String>) {
        self.equipped = def_key;
    }
}
