use thiserror::Error;

use gridinv_core::{GridPos, ItemInstanceId};

/// Why an inventory command was refused.
///
/// Every variant is a silent, state-preserving rejection from the caller's
/// point of view: the inventory is left exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("item {0} is not in this inventory")]
    UnknownItem(ItemInstanceId),

    #[error("cell {0} is outside the grid")]
    OutOfBounds(GridPos),

    #[error("amount must be positive and leave the source stack non-empty")]
    InvalidAmount,

    #[error("item definition '{0}' does not stack")]
    NotStackable(String),

    #[error("'{0}' is not a recognized equipment slot")]
    UnknownSlot(String),

    #[error("item definition '{def_key}' does not fit slot '{slot}'")]
    SlotMismatch { def_key: String, slot: String },

    #[error("equipment slot '{0}' is empty")]
    SlotEmpty(String),

    #[error("unknown item definition '{0}'")]
    UnknownDefinition(String),

    #[error("this inventory has no equipment slots")]
    EquipmentDisabled,

    #[error("no free space left in the grid")]
    NoSpace,

    #[error("layout rejected: {0}")]
    InvalidLayout(String),
}

impl Rejection {
    /// Short machine-readable code for logs and wire responses.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::UnknownItem(_) => "unknown_item",
            Rejection::OutOfBounds(_) => "out_of_bounds",
            Rejection::InvalidAmount => "invalid_amount",
            Rejection::NotStackable(_) => "not_stackable",
            Rejection::UnknownSlot(_) => "unknown_slot",
            Rejection::SlotMismatch { .. } => "slot_mismatch",
            Rejection::SlotEmpty(_) => "slot_empty",
            Rejection::UnknownDefinition(_) => "unknown_definition",
            Rejection::EquipmentDisabled => "equipment_disabled",
            Rejection::NoSpace => "no_space",
            Rejection::InvalidLayout(_) => "invalid_layout",
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }
}
