//! Engine configuration loading and representation.
//!
//! # Configuration sources (in priority order)
//!
//! 1. The JSON file named by the `GRIDINV_CONFIG` environment variable.
//! 2. Built-in defaults (character 6x5 / 20 kg, vehicle 10x8 / 150 kg).
//!
//! # Example file
//!
//! ```json
//! {
//!   "character": { "grid_width": 8, "grid_height": 6, "capacity_kg": 25.0 },
//!   "carry_slots": ["backpack"],
//!   "catalog_path": "items.json"
//! }
//! ```
//!
//! Every field is optional; missing ones keep their default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use gridinv_catalog::{CatalogError, ItemCatalog};
use gridinv_core::OwnerKind;
use gridinv_inventory::{InventoryTemplate, SlotRules};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GRIDINV_CONFIG";

/// Slot names accepted in addition to the starter slots.
const WEARABLE_SLOTS: [&str; 14] = [
    "hat", "mask", "glasses", "earRings", "chain", "tShirt", "top", "backpack", "wallet", "armour",
    "watch", "gloves", "pants", "shoes",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(deserialize_with = "character_template")]
    pub character: InventoryTemplate,
    #[serde(deserialize_with = "vehicle_template")]
    pub vehicle: InventoryTemplate,
    /// Equipment slot whitelist (case-insensitive).
    pub recognized_slots: Vec<String>,
    /// Slots whose equipped definitions add their carry bonus to capacity.
    pub carry_slots: Vec<String>,
    /// JSON catalog to load instead of the starter catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let character = InventoryTemplate::character_default();
        let mut recognized_slots: Vec<String> = character.starter_slots.clone();
        for slot in WEARABLE_SLOTS {
            if !recognized_slots.iter().any(|s| s.eq_ignore_ascii_case(slot)) {
                recognized_slots.push(slot.to_string());
            }
        }

        Self {
            character,
            vehicle: InventoryTemplate::vehicle_default(),
            recognized_slots,
            carry_slots: vec!["backpack".to_string()],
            catalog_path: None,
        }
    }
}

/// Template fields as they appear in a config file; absent ones fall back
/// to the owner kind's own default template.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateOverrides {
    grid_width: Option<u32>,
    grid_height: Option<u32>,
    capacity_kg: Option<f32>,
    starter_slots: Option<Vec<String>>,
    allow_equipment: Option<bool>,
}

impl TemplateOverrides {
    fn apply_to(self, base: InventoryTemplate) -> InventoryTemplate {
        InventoryTemplate {
            grid_width: self.grid_width.unwrap_or(base.grid_width),
            grid_height: self.grid_height.unwrap_or(base.grid_height),
            capacity_kg: self.capacity_kg.unwrap_or(base.capacity_kg),
            starter_slots: self.starter_slots.unwrap_or(base.starter_slots),
            allow_equipment: self.allow_equipment.unwrap_or(base.allow_equipment),
        }
    }
}

fn character_template<'de, D: Deserializer<'de>>(d: D) -> Result<InventoryTemplate, D::Error> {
    Ok(TemplateOverrides::deserialize(d)?.apply_to(InventoryTemplate::character_default()))
}

fn vehicle_template<'de, D: Deserializer<'de>>(d: D) -> Result<InventoryTemplate, D::Error> {
    Ok(TemplateOverrides::deserialize(d)?.apply_to(InventoryTemplate::vehicle_default()))
}

impl EngineConfig {
    /// Load from `GRIDINV_CONFIG` if set, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&raw)?;

        // A relative catalog path is resolved next to the config file.
        if let (Some(catalog), Some(dir)) = (config.catalog_path.as_ref(), path.parent()) {
            if catalog.is_relative() {
                config.catalog_path = Some(dir.join(catalog));
            }
        }
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, template) in [("character", &self.character), ("vehicle", &self.vehicle)] {
            if template.grid_width == 0 || template.grid_height == 0 {
                return Err(ConfigError::Invalid(format!("{name} grid must be at least 1x1")));
            }
            if !(template.capacity_kg >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} capacity_kg must not be negative")));
            }
            if let Some(slot) = template
                .starter_slots
                .iter()
                .find(|s| !self.recognized_slots.iter().any(|r| r.eq_ignore_ascii_case(s.trim())))
            {
                return Err(ConfigError::Invalid(format!(
                    "{name} starter slot '{slot}' is not a recognized slot"
                )));
            }
        }
        Ok(())
    }

    pub fn template_for(&self, kind: OwnerKind) -> &InventoryTemplate {
        match kind {
            OwnerKind::Character => &self.character,
            OwnerKind::Vehicle => &self.vehicle,
        }
    }

    /// Catalog from `catalog_path`, or the starter catalog.
    pub fn load_catalog(&self) -> Result<ItemCatalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(ItemCatalog::from_json_file(path)?),
            None => Ok(ItemCatalog::starter()),
        }
    }

    /// Slot whitelist extended with every slot the catalog equips into.
    pub fn slot_rules(&self, catalog: &ItemCatalog) -> SlotRules {
        SlotRules::new(&self.recognized_slots, &self.carry_slots).with_catalog_vocabulary(catalog)
    }
}
