//! Inventory operations service.
//!
//! Every verb follows the same pipeline, inside the owner's critical section:
//!
//! ```text
//! lock(owner)
//!   ↓
//! 1. Ensure the inventory record (auto-provision from the owner kind's template)
//!   ↓
//! 2. Decide events (pure; a rejection ends here with the unchanged snapshot)
//!   ↓
//! 3. Apply, check invariants, save with the loaded version as expectation
//!   ↓
//! 4. Publish envelopes to the audit bus (after save)
//!   ↓
//! 5. Build the snapshot
//! unlock(owner)
//! ```
//!
//! Invalid input never surfaces as an error: it yields
//! `OperationStatus::Rejected` plus the unchanged snapshot. `Err` is reserved
//! for storage failures, which are fatal for that one call only.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use gridinv_catalog::ItemCatalog;
use gridinv_core::{Aggregate, AggregateRoot, DomainError, ExpectedVersion, GridPos, ItemInstanceId, OwnerRef};
use gridinv_events::{EventBus, EventEnvelope};
use gridinv_inventory::{
    AddItems, ApplyLayout, DropItems, EquipItem, Inventory, InventoryCommand, InventoryContext,
    InventoryEvent, InventorySnapshot, LayoutEntry, MoveStack, Rejection, SplitStack, UnequipSlot,
};

use crate::config::{ConfigError, EngineConfig};
use crate::locks::KeyedLocks;
use crate::store::{InventoryStore, StoreError};

/// How many distinct definitions `fill_sample` grants.
const SAMPLE_DEFINITIONS: usize = 6;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A decided transition broke a grid invariant; nothing was saved.
    #[error("refusing to commit inconsistent inventory: {0}")]
    Invariant(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// State changed and was committed.
    Applied,
    /// Valid request that required no change.
    Unchanged,
    /// Invalid request; state is untouched.
    Rejected(Rejection),
}

/// Result of one verb: what happened plus the snapshot to hand back.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub status: OperationStatus,
    pub snapshot: InventorySnapshot,
}

impl OperationOutcome {
    pub fn is_applied(&self) -> bool {
        self.status == OperationStatus::Applied
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.status {
            OperationStatus::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddItemsOutcome {
    pub requested: u32,
    pub placed: u32,
    pub outcome: OperationOutcome,
}

impl AddItemsOutcome {
    pub fn is_partial(&self) -> bool {
        self.placed < self.requested
    }
}

struct Executed {
    status: OperationStatus,
    before: Inventory,
    after: Inventory,
}

/// The engine's entry point: serialized, validated operations on per-owner inventories.
///
/// - `S`: record store (`InMemoryInventoryStore` in tests/dev)
/// - `B`: audit bus receiving one envelope per committed event
pub struct InventoryService<S, B> {
    store: S,
    bus: B,
    config: EngineConfig,
    ctx: InventoryContext,
    locks: KeyedLocks<OwnerRef>,
}

impl<S, B> InventoryService<S, B>
where
    S: InventoryStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub fn new(store: S, bus: B, catalog: Arc<ItemCatalog>, config: EngineConfig) -> Self {
        let slots = Arc::new(config.slot_rules(&catalog));
        Self {
            store,
            bus,
            config,
            ctx: InventoryContext::new(catalog, slots),
            locks: KeyedLocks::new(),
        }
    }

    /// Build from configuration, loading the configured catalog.
    pub fn from_config(store: S, bus: B, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = Arc::new(config.load_catalog()?);
        tracing::info!(definitions = catalog.len(), "item catalog loaded");
        Ok(Self::new(store, bus, catalog, config))
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.ctx.catalog
    }

    pub fn context(&self) -> &InventoryContext {
        &self.ctx
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(skip_all, fields(owner = %owner))]
    pub fn open(&self, owner: OwnerRef) -> Result<InventorySnapshot, ServiceError> {
        self.locks.with_lock(&owner, || -> Result<InventorySnapshot, ServiceError> {
            let inventory = self.ensure(owner)?;
            Ok(InventorySnapshot::build(&inventory, &self.ctx))
        })
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, item = %item_id, to = %to))]
    pub fn move_item(&self, owner: OwnerRef, item_id: ItemInstanceId, to: GridPos) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::Move(MoveStack { item_id, to }))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, item = %item_id, amount = amount))]
    pub fn split(&self, owner: OwnerRef, item_id: ItemInstanceId, amount: u32) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::Split(SplitStack { item_id, amount }))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, item = %item_id, amount = amount))]
    pub fn drop_items(&self, owner: OwnerRef, item_id: ItemInstanceId, amount: u32) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::Drop(DropItems { item_id, amount }))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, item = %item_id, slot = slot))]
    pub fn equip(&self, owner: OwnerRef, item_id: ItemInstanceId, slot: &str) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::Equip(EquipItem { item_id, slot: slot.to_string() }))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, slot = slot))]
    pub fn unequip(&self, owner: OwnerRef, slot: &str) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::Unequip(UnequipSlot { slot: slot.to_string() }))
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, entries = entries.len()))]
    pub fn apply_layout(&self, owner: OwnerRef, entries: Vec<LayoutEntry>) -> Result<OperationOutcome, ServiceError> {
        self.run(owner, InventoryCommand::ApplyLayout(ApplyLayout { entries }))
    }

    /// Grant items stack-first; reports how much actually fit.
    #[tracing::instrument(skip_all, fields(owner = %owner, def_key = def_key, quantity = quantity))]
    pub fn add_items(&self, owner: OwnerRef, def_key: &str, quantity: u32) -> Result<AddItemsOutcome, ServiceError> {
        let key = def_key.trim().to_string();
        let executed = self.execute(owner, InventoryCommand::AddItems(AddItems { def_key: key.clone(), quantity }))?;

        let placed = executed.after.total_quantity(&key) - executed.before.total_quantity(&key);
        let placed = u32::try_from(placed).unwrap_or(u32::MAX);
        if placed < quantity && executed.status == OperationStatus::Applied {
            tracing::warn!(owner = %owner, def_key = %key, requested = quantity, placed, "grid full, partial add");
        }

        Ok(AddItemsOutcome {
            requested: quantity,
            placed,
            outcome: self.outcome(executed),
        })
    }

    /// Grant `2 × maxStack` of each of the first few catalog definitions.
    #[tracing::instrument(skip_all, fields(owner = %owner))]
    pub fn fill_sample(&self, owner: OwnerRef) -> Result<Vec<AddItemsOutcome>, ServiceError> {
        let grants: Vec<(String, u32)> = self
            .ctx
            .catalog
            .iter()
            .take(SAMPLE_DEFINITIONS)
            .map(|def| (def.key.clone(), def.max_stack.max(1).saturating_mul(2)))
            .collect();

        grants
            .iter()
            .map(|(key, quantity)| self.add_items(owner, key, *quantity))
            .collect()
    }

    fn run(&self, owner: OwnerRef, command: InventoryCommand) -> Result<OperationOutcome, ServiceError> {
        let executed = self.execute(owner, command)?;
        Ok(self.outcome(executed))
    }

    fn outcome(&self, executed: Executed) -> OperationOutcome {
        OperationOutcome {
            snapshot: InventorySnapshot::build(&executed.after, &self.ctx),
            status: executed.status,
        }
    }

    fn ensure(&self, owner: OwnerRef) -> Result<Inventory, StoreError> {
        self.store
            .ensure(owner, self.config.template_for(owner.kind))
            .inspect_err(|e| tracing::error!(owner = %owner, error = %e, "failed to load inventory"))
    }

    fn execute(&self, owner: OwnerRef, command: InventoryCommand) -> Result<Executed, ServiceError> {
        let op = command.name();
        self.locks.with_lock(&owner, || -> Result<Executed, ServiceError> {
            let before = self.ensure(owner)?;

            let events = match before.handle(&self.ctx, &command) {
                Ok(events) => events,
                Err(rejection) => {
                    tracing::debug!(owner = %owner, op, reason = rejection.code(), "operation rejected: {rejection}");
                    return Ok(Executed {
                        status: OperationStatus::Rejected(rejection),
                        after: before.clone(),
                        before,
                    });
                }
            };
            if events.is_empty() {
                return Ok(Executed {
                    status: OperationStatus::Unchanged,
                    after: before.clone(),
                    before,
                });
            }

            let mut after = before.clone();
            after.apply_all(&events);
            if let Err(e) = after.check_invariants(&self.ctx) {
                tracing::error!(owner = %owner, op, error = %e, "decided transition breaks invariants");
                return Err(ServiceError::Invariant(e));
            }

            self.store
                .save(&after, ExpectedVersion::Exact(before.version()))
                .inspect_err(|e| tracing::error!(owner = %owner, op, error = %e, "failed to save inventory"))?;

            self.publish(&after, op, before.version(), events);
            tracing::info!(owner = %owner, op, version = after.version(), "operation applied");

            Ok(Executed {
                status: OperationStatus::Applied,
                before,
                after,
            })
        })
    }

    /// Publish committed events; a failing bus does not undo the commit.
    fn publish(&self, inventory: &Inventory, op: &str, base_version: u64, events: Vec<InventoryEvent>) {
        let operation_id = Uuid::now_v7();
        let occurred_at = Utc::now();
        for (offset, event) in (1u64..).zip(events) {
            let envelope = EventEnvelope::new(
                operation_id,
                *inventory.id(),
                inventory.owner(),
                op,
                base_version + offset,
                occurred_at,
                event,
            );
            if let Err(e) = self.bus.publish(envelope) {
                tracing::warn!(owner = %inventory.owner(), op, error = ?e, "failed to publish inventory event");
            }
        }
    }
}

impl<S, B> std::fmt::Debug for InventoryService<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryService")
            .field("definitions", &self.ctx.catalog.len())
            .field("active_locks", &self.locks.active_keys())
            .finish_non_exhaustive()
    }
}
