use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use thiserror::Error;

use crate::definition::ItemDefinition;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid item definition '{key}': {reason}")]
    InvalidDefinition { key: String, reason: String },

    #[error("duplicate item definition key '{0}'")]
    DuplicateKey(String),

    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable set of item definitions keyed by definition key.
///
/// Iteration order is key order, which keeps any "first N definitions"
/// selection deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    definitions: BTreeMap<String, ItemDefinition>,
}

impl ItemCatalog {
    pub fn builder() -> ItemCatalogBuilder {
        ItemCatalogBuilder::default()
    }

    /// The starter definitions every fresh deployment is seeded with.
    ///
    /// The rows are static; `starter_rows_all_pass_validation` holds them to
    /// the builder's rules.
    pub fn starter() -> Self {
        Self {
            definitions: starter_definitions()
                .into_iter()
                .map(|def| (def.key.clone(), def))
                .collect(),
        }
    }

    pub fn from_definitions(
        defs: impl IntoIterator<Item = ItemDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut builder = Self::builder();
        for def in defs {
            builder.insert(def)?;
        }
        Ok(builder.build())
    }

    /// Load definitions from a JSON array.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<ItemDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(defs)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, key: &str) -> Option<&ItemDefinition> {
        self.definitions.get(key.trim())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.definitions.values()
    }

    /// Equipment slot names used by any definition, distinct ignoring case.
    ///
    /// The first spelling in key order wins.
    pub fn equip_slot_vocabulary(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.definitions
            .values()
            .filter_map(|d| d.equip_slot.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty() && seen.insert(s.to_ascii_lowercase()))
            .map(String::from)
            .collect()
    }
}

/// Administrative seeding of a catalog.
#[derive(Debug, Default)]
pub struct ItemCatalogBuilder {
    definitions: BTreeMap<String, ItemDefinition>,
}

impl ItemCatalogBuilder {
    pub fn insert(&mut self, def: ItemDefinition) -> Result<&mut Self, CatalogError> {
        validate(&def)?;
        if self.definitions.contains_key(&def.key) {
            return Err(CatalogError::DuplicateKey(def.key));
        }
        self.definitions.insert(def.key.clone(), def);
        Ok(self)
    }

    pub fn with(mut self, def: ItemDefinition) -> Result<Self, CatalogError> {
        self.insert(def)?;
        Ok(self)
    }

    pub fn build(self) -> ItemCatalog {
        ItemCatalog {
            definitions: self.definitions,
        }
    }
}

fn validate(def: &ItemDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidDefinition {
        key: def.key.clone(),
        reason: reason.to_string(),
    };

    if def.key.trim().is_empty() || def.key.trim() != def.key {
        return Err(invalid("key must be non-empty and trimmed"));
    }
    if def.max_stack == 0 {
        return Err(invalid("max_stack must be at least 1"));
    }
    if !def.weight_per_unit.is_finite() || def.weight_per_unit < 0.0 {
        return Err(invalid("weight_per_unit must be a non-negative number"));
    }
    if !def.carry_bonus_kg.is_finite() || def.carry_bonus_kg < 0.0 {
        return Err(invalid("carry_bonus_kg must be a non-negative number"));
    }
    Ok(())
}

fn starter_definitions() -> Vec<ItemDefinition> {
    vec![
        ItemDefinition::new("medikit", "Medikit", "consumable", 0.5, 5),
        ItemDefinition::new("water", "Water Bottle", "consumable", 0.5, 10),
        ItemDefinition::new("burger", "Burger", "consumable", 0.6, 10),
        ItemDefinition::new("bag_small", "Backpack (small)", "backpack", 0.8, 1)
            .with_equip_slot("backpack")
            .with_carry_bonus(10.0),
    ]
}
