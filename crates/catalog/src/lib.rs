//! Item catalog: reference data for every item kind the engine can place.
//!
//! Definitions are seeded administratively and are read-only at runtime; the
//! catalog is shared behind an `Arc` and read without locking.

pub mod catalog;
pub mod definition;

pub use catalog::{CatalogError, ItemCatalog, ItemCatalogBuilder};
pub use definition::ItemDefinition;
