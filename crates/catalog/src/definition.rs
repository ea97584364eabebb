use serde::{Deserialize, Deserializer, Serialize};

/// Reference row describing one kind of item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub weight_per_unit: f32,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Equipment slot this item fits; `None` means not equippable.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub equip_slot: Option<String>,
    #[serde(default)]
    pub carry_bonus_kg: f32,
}

fn default_max_stack() -> u32 {
    1
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_slot(raw))
}

fn normalize_slot(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ItemDefinition {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
        weight_per_unit: f32,
        max_stack: u32,
    ) -> Self {
        Self {
            key: key.into().trim().to_string(),
            display_name: display_name.into(),
            category: category.into(),
            weight_per_unit,
            max_stack,
            equip_slot: None,
            carry_bonus_kg: 0.0,
        }
    }

    pub fn with_equip_slot(mut self, slot: impl Into<String>) -> Self {
        self.equip_slot = normalize_slot(Some(slot.into()));
        self
    }

    pub fn with_carry_bonus(mut self, kg: f32) -> Self {
        self.carry_bonus_kg = kg;
        self
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Case-insensitive check against an equipment slot name.
    pub fn fits_slot(&self, slot: &str) -> bool {
        self.equip_slot
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(slot.trim()))
    }

    pub fn weight_of(&self, quantity: u32) -> f32 {
        quantity as f32 * self.weight_per_unit
    }
}
