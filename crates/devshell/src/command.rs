//! Line command parsing.
//!
//! One command per line, whitespace separated. Every inventory verb names its
//! owner as `<kind> <id>` (`character 7`, `vehicle 3`; `player` is accepted for
//! `character`). Numbers are read as signed integers and decoded through the
//! wire DTOs, so the shell sees exactly what a remote caller would.

use thiserror::Error;

use gridinv_core::{OwnerKind, OwnerRef};
use gridinv_infra::{AddItemsRequest, AmountRequest, EquipRequest, LayoutRequest, MoveRequest, UnequipRequest};

pub const USAGE: &str = "\
commands:
  open    <kind> <id>
  give    <kind> <id> <defKey> [qty]
  fill    <kind> <id>
  move    <kind> <id> <itemId> <x> <y>
  split   <kind> <id> <itemId> <amount>
  drop    <kind> <id> <itemId> <amount>
  equip   <kind> <id> <itemId> <slot>
  unequip <kind> <id> <slot>
  layout  <kind> <id> <json>
  catalog
  help
  quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("'{command}' expects: {usage}")]
    Arity { command: &'static str, usage: &'static str },

    #[error("invalid owner: {0}")]
    Owner(String),

    #[error("'{0}' is not a number")]
    Number(String),

    #[error("invalid layout json: {0}")]
    Layout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(OwnerRef),
    Give(OwnerRef, AddItemsRequest),
    Fill(OwnerRef),
    Move(OwnerRef, MoveRequest),
    Split(OwnerRef, AmountRequest),
    Drop(OwnerRef, AmountRequest),
    Equip(OwnerRef, EquipRequest),
    Unequip(OwnerRef, UnequipRequest),
    Layout(OwnerRef, LayoutRequest),
    Catalog,
    Help,
    Quit,
}

/// Parse one input line; blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "open" => {
            let [kind, id] = exact::<2>(&args, "open", "open <kind> <id>")?;
            ShellCommand::Open(owner(kind, id)?)
        }
        "give" => {
            let (owner_ref, def_key, qty) = match args.as_slice() {
                [kind, id, def_key] => (owner(kind, id)?, *def_key, 1),
                [kind, id, def_key, qty] => (owner(kind, id)?, *def_key, number(qty)?),
                _ => return Err(ParseError::Arity { command: "give", usage: "give <kind> <id> <defKey> [qty]" }),
            };
            ShellCommand::Give(owner_ref, AddItemsRequest { def_key: def_key.to_string(), qty })
        }
        "fill" => {
            let [kind, id] = exact::<2>(&args, "fill", "fill <kind> <id>")?;
            ShellCommand::Fill(owner(kind, id)?)
        }
        "move" => {
            let [kind, id, item, x, y] = exact::<5>(&args, "move", "move <kind> <id> <itemId> <x> <y>")?;
            ShellCommand::Move(
                owner(kind, id)?,
                MoveRequest {
                    item_id: number(item)?,
                    to_x: number(x)?,
                    to_y: number(y)?,
                },
            )
        }
        "split" => {
            let [kind, id, item, amount] = exact::<4>(&args, "split", "split <kind> <id> <itemId> <amount>")?;
            ShellCommand::Split(owner(kind, id)?, amount_request(item, amount)?)
        }
        "drop" => {
            let [kind, id, item, amount] = exact::<4>(&args, "drop", "drop <kind> <id> <itemId> <amount>")?;
            ShellCommand::Drop(owner(kind, id)?, amount_request(item, amount)?)
        }
        "equip" => {
            let [kind, id, item, slot] = exact::<4>(&args, "equip", "equip <kind> <id> <itemId> <slot>")?;
            ShellCommand::Equip(
                owner(kind, id)?,
                EquipRequest {
                    item_id: number(item)?,
                    slot: slot.to_string(),
                },
            )
        }
        "unequip" => {
            let [kind, id, slot] = exact::<3>(&args, "unequip", "unequip <kind> <id> <slot>")?;
            ShellCommand::Unequip(owner(kind, id)?, UnequipRequest { slot: slot.to_string() })
        }
        "layout" => {
            // The JSON body may contain spaces; take everything after the owner.
            let mut parts = rest.splitn(3, char::is_whitespace);
            let (Some(kind), Some(id), Some(json)) = (parts.next(), parts.next(), parts.next()) else {
                return Err(ParseError::Arity { command: "layout", usage: "layout <kind> <id> <json>" });
            };
            let request: LayoutRequest =
                serde_json::from_str(json.trim()).map_err(|e| ParseError::Layout(e.to_string()))?;
            ShellCommand::Layout(owner(kind, id)?, request)
        }
        "catalog" => ShellCommand::Catalog,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn exact<'a, const N: usize>(
    args: &[&'a str],
    command: &'static str,
    usage: &'static str,
) -> Result<[&'a str; N], ParseError> {
    <[&'a str; N]>::try_from(args).map_err(|_| ParseError::Arity { command, usage })
}

fn owner(kind: &str, id: &str) -> Result<OwnerRef, ParseError> {
    let kind: OwnerKind = kind.parse().map_err(|e: gridinv_core::DomainError| ParseError::Owner(e.to_string()))?;
    let id = id.parse::<i64>().map_err(|_| ParseError::Owner(format!("'{id}' is not an owner id")))?;
    Ok(OwnerRef::new(kind, id))
}

fn number(raw: &str) -> Result<i64, ParseError> {
    raw.parse::<i64>().map_err(|_| ParseError::Number(raw.to_string()))
}

fn amount_request(item: &str, amount: &str) -> Result<AmountRequest, ParseError> {
    Ok(AmountRequest {
        item_id: number(item)?,
        amount: number(amount)?,
    })
}
