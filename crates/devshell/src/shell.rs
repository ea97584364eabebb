//! Line-at-a-time driver over an `InventoryService`.

use gridinv_events::{EventBus, EventEnvelope};
use gridinv_infra::{InventoryService, InventoryStore, ServiceError};
use gridinv_inventory::InventoryEvent;

use crate::command::{self, ShellCommand, USAGE};
use crate::reply::{Added, Reply};

/// What the caller should do after one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing to print (blank line or comment).
    Skip,
    Reply(Reply),
    Quit,
}

pub struct Shell<S, B> {
    service: InventoryService<S, B>,
}

impl<S, B> Shell<S, B>
where
    S: InventoryStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub fn new(service: InventoryService<S, B>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &InventoryService<S, B> {
        &self.service
    }

    pub fn handle_line(&self, line: &str) -> Step {
        let command = match command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Step::Skip,
            Err(e) => return Step::Reply(Reply::error(e.to_string())),
        };
        if command == ShellCommand::Quit {
            return Step::Quit;
        }

        match self.execute(command) {
            Ok(reply) => Step::Reply(reply),
            Err(e) => {
                tracing::error!(error = %e, "command failed");
                Step::Reply(Reply::error(e.to_string()))
            }
        }
    }

    pub fn execute(&self, command: ShellCommand) -> Result<Reply, ServiceError> {
        let service = &self.service;
        let reply = match command {
            ShellCommand::Open(owner) => Reply::Opened {
                snapshot: service.open(owner)?,
            },
            ShellCommand::Give(owner, request) => {
                let (def_key, qty) = request.decode();
                service.add_items(owner, def_key, qty)?.into()
            }
            ShellCommand::Fill(owner) => {
                let outcomes = service.fill_sample(owner)?;
                Reply::Filled {
                    added: outcomes.iter().map(Added::from).collect(),
                    snapshot: service.open(owner)?,
                }
            }
            ShellCommand::Move(owner, request) => {
                let (item, to) = request.decode();
                service.move_item(owner, item, to)?.into()
            }
            ShellCommand::Split(owner, request) => {
                let (item, amount) = request.decode();
                service.split(owner, item, amount)?.into()
            }
            ShellCommand::Drop(owner, request) => {
                let (item, amount) = request.decode();
                service.drop_items(owner, item, amount)?.into()
            }
            ShellCommand::Equip(owner, request) => {
                let (item, slot) = request.decode();
                service.equip(owner, item, slot)?.into()
            }
            ShellCommand::Unequip(owner, request) => service.unequip(owner, &request.slot)?.into(),
            ShellCommand::Layout(owner, request) => {
                let width = service.open(owner)?.w;
                service.apply_layout(owner, request.decode(width))?.into()
            }
            ShellCommand::Catalog => Reply::Catalog {
                definitions: service.catalog().iter().cloned().collect(),
            },
            ShellCommand::Help | ShellCommand::Quit => Reply::Help { usage: USAGE },
        };
        Ok(reply)
    }
}
