//! Developer console for the inventory engine.
//!
//! Reads line commands, runs them against an in-process `InventoryService`
//! and prints one JSON reply per line.

pub mod command;
pub mod reply;
pub mod shell;

pub use command::{ParseError, ShellCommand, parse};
pub use reply::Reply;
pub use shell::{Shell, Step};
