//! Infrastructure layer: inventory service, record store, locks, config, wire decoding.

pub mod config;
pub mod locks;
pub mod service;
pub mod store;
pub mod wire;


pub use config::{CONFIG_ENV, ConfigError, EngineConfig};
pub use locks::KeyedLocks;
pub use service::{AddItemsOutcome, InventoryService, OperationOutcome, OperationStatus, ServiceError};
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError};
pub use wire::{
    AddItemsRequest, AmountRequest, EquipRequest, LayoutEntryDto, LayoutRequest, MoveRequest,
    UnequipRequest,
};
