//! Inventory record store.
//!
//! The store holds the committed state of each inventory, keyed by owner.
//! Saves are guarded by optimistic concurrency on the aggregate version, so a
//! writer that bypassed the per-owner lock still cannot overwrite a newer
//! commit.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use gridinv_core::{AggregateRoot, DomainError, ExpectedVersion, InventoryId, OwnerRef};
use gridinv_inventory::{Inventory, InventoryTemplate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("inventory storage unavailable: {0}")]
    Unavailable(String),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("inventory storage lock poisoned")]
    Poisoned,
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Conflict(msg) => StoreError::Concurrency(msg),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Persistence boundary for inventory records.
pub trait InventoryStore: Send + Sync {
    fn load(&self, owner: OwnerRef) -> Result<Option<Inventory>, StoreError>;

    /// Existing inventory for `owner`, or a new one built from `template`.
    fn ensure(&self, owner: OwnerRef, template: &InventoryTemplate) -> Result<Inventory, StoreError>;

    /// Replace the stored record; `expected` is checked against the stored version.
    fn save(&self, inventory: &Inventory, expected: ExpectedVersion) -> Result<(), StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn load(&self, owner: OwnerRef) -> Result<Option<Inventory>, StoreError> {
        (**self).load(owner)
    }

    fn ensure(&self, owner: OwnerRef, template: &InventoryTemplate) -> Result<Inventory, StoreError> {
        (**self).ensure(owner, template)
    }

    fn save(&self, inventory: &Inventory, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(inventory, expected)
    }
}

#[derive(Debug, Default)]
struct Records {
    by_owner: HashMap<OwnerRef, Inventory>,
    last_id: u64,
}

/// In-memory inventory store.
///
/// Intended for tests/dev and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    records: RwLock<Records>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provisioned inventories.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.by_owner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn load(&self, owner: OwnerRef) -> Result<Option<Inventory>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.by_owner.get(&owner).cloned())
    }

    fn ensure(&self, owner: OwnerRef, template: &InventoryTemplate) -> Result<Inventory, StoreError> {
        if let Some(existing) = self.load(owner)? {
            return Ok(existing);
        }

        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        // Another caller may have provisioned between the read and the write lock.
        if let Some(existing) = records.by_owner.get(&owner) {
            return Ok(existing.clone());
        }
        records.last_id += 1;
        let inventory = Inventory::provision(InventoryId::new(records.last_id), owner, template);
        records.by_owner.insert(owner, inventory.clone());
        Ok(inventory)
    }

    fn save(&self, inventory: &Inventory, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let owner = inventory.owner();
        let stored = records
            .by_owner
            .get(&owner)
            .ok_or_else(|| StoreError::Unavailable(format!("no inventory record for {owner}")))?;

        if stored.inventory_id() != inventory.inventory_id() {
            return Err(StoreError::Concurrency(format!(
                "{owner} is inventory {}, not {}",
                stored.inventory_id(),
                inventory.inventory_id()
            )));
        }
        expected.check(stored.version())?;

        records.by_owner.insert(owner, inventory.clone());
        Ok(())
    }
}
