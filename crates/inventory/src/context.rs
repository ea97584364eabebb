use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use gridinv_catalog::{ItemCatalog, ItemDefinition};

/// Equipment slot vocabulary: which names are recognized and which of them
/// grant carry capacity.
///
/// Names compare case-insensitively; the first spelling registered for a name
/// is the canonical one stored on provisioned slot rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotRules {
    recognized: BTreeMap<String, String>,
    carry: BTreeSet<String>,
}

impl SlotRules {
    pub fn new<R, C>(recognized: R, carry_slots: C) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut rules = Self::default();
        for name in recognized {
            rules.recognize(name.as_ref());
        }
        rules.carry = carry_slots
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        rules
    }

    /// Also accept every slot name some catalog definition equips into.
    pub fn with_catalog_vocabulary(mut self, catalog: &ItemCatalog) -> Self {
        for slot in catalog.equip_slot_vocabulary() {
            self.recognize(&slot);
        }
        self
    }

    fn recognize(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.recognized
                .entry(name.to_ascii_lowercase())
                .or_insert_with(|| name.to_string());
        }
    }

    /// Canonical spelling of a recognized slot name.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.recognized
            .get(&name.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    pub fn is_carry_slot(&self, name: &str) -> bool {
        self.carry.contains(&name.trim().to_ascii_lowercase())
    }
}

/// Read-only reference data an inventory decision needs.
#[derive(Debug, Clone)]
pub struct InventoryContext {
    pub catalog: Arc<ItemCatalog>,
    pub slots: Arc<SlotRules>,
}

impl InventoryContext {
    pub fn new(catalog: Arc<ItemCatalog>, slots: Arc<SlotRules>) -> Self {
        Self { catalog, slots }
    }

    pub fn definition(&self, key: &str) -> Option<&ItemDefinition> {
        self.catalog.get(key)
    }

    /// Stack limit for a definition; unknown definitions hold one unit per stack.
    pub fn max_stack(&self, key: &str) -> u32 {
        self.definition(key).map(|d| d.max_stack.max(1)).unwrap_or(1)
    }

    /// Weight of `quantity` units; unknown definitions weigh nothing.
    pub fn weight_of(&self, key: &str, quantity: u32) -> f32 {
        self.definition(key).map(|d| d.weight_of(quantity)).unwrap_or(0.0)
    }

    pub fn carry_bonus_kg(&self, key: &str) -> f32 {
        self.definition(key).map(|d| d.carry_bonus_kg).unwrap_or(0.0)
    }
}
