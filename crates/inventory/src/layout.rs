//! Bulk layout reconciliation.
//!
//! A submitted layout is read as the caller's full listing of the grid, but
//! it is only ever committed as a *rearrangement* of what the server already
//! holds: per-definition totals must match exactly, so a batch can move,
//! merge and re-split stacks but never fabricate or destroy quantity.

use std::collections::{BTreeMap, HashSet};

use gridinv_core::{GridPos, ItemInstanceId};

use crate::command::{ApplyLayout, InventoryEvent, LayoutEntry, StackMoved};
use crate::context::InventoryContext;
use crate::decide::{Decision, Draft};
use crate::error::Rejection;
use crate::inventory::{Inventory, InventoryItem};

/// A validated row that remains on the grid after the layout is committed.
#[derive(Debug)]
enum Target<'a> {
    Existing { stack: &'a InventoryItem, quantity: u32, pos: GridPos },
    New { def_key: &'a str, quantity: u32, pos: GridPos },
}

impl Target<'_> {
    fn pos(&self) -> GridPos {
        match self {
            Target::Existing { pos, .. } | Target::New { pos, .. } => *pos,
        }
    }
}

pub(crate) fn apply_layout(inv: &Inventory, ctx: &InventoryContext, cmd: &ApplyLayout) -> Decision {
    let targets = validate(inv, ctx, &cmd.entries)?;
    Ok(diff(inv, &targets))
}

fn validate<'a>(
    inv: &'a Inventory,
    ctx: &'a InventoryContext,
    entries: &'a [LayoutEntry],
) -> Result<Vec<Target<'a>>, Rejection> {
    let mut seen_ids = HashSet::new();
    let mut targets = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry.item_id {
            Some(id) => {
                let stack = inv
                    .find_item(id)
                    .ok_or_else(|| Rejection::layout(format!("item {id} is not in this inventory")))?;
                if !seen_ids.insert(id) {
                    return Err(Rejection::layout(format!("item {id} listed more than once")));
                }
                let key = entry.def_key.trim();
                if !key.is_empty() && key != stack.def_key() {
                    return Err(Rejection::layout(format!(
                        "item {id} is '{}', not '{key}'",
                        stack.def_key()
                    )));
                }
                if entry.quantity > 0 {
                    targets.push(Target::Existing { stack, quantity: entry.quantity, pos: entry.pos });
                }
            }
            None => {
                let Some(def) = ctx.definition(&entry.def_key) else {
                    continue;
                };
                if entry.quantity > 0 {
                    targets.push(Target::New { def_key: &def.key, quantity: entry.quantity, pos: entry.pos });
                }
            }
        }
    }

    let mut cells = HashSet::new();
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for target in &targets {
        let pos = target.pos();
        if !inv.contains(pos) {
            return Err(Rejection::layout(format!("cell {pos} is outside the grid")));
        }
        if !cells.insert(pos) {
            return Err(Rejection::layout(format!("cell {pos} is listed more than once")));
        }

        let (def_key, quantity, limit) = match target {
            Target::Existing { stack, quantity, .. } => {
                // Legacy stacks of definitions no longer in the catalog keep their size.
                let limit = if ctx.definition(stack.def_key()).is_some() {
                    ctx.max_stack(stack.def_key())
                } else {
                    stack.quantity().max(1)
                };
                (stack.def_key(), *quantity, limit)
            }
            Target::New { def_key, quantity, .. } => (*def_key, *quantity, ctx.max_stack(def_key)),
        };
        if quantity > limit {
            return Err(Rejection::layout(format!(
                "stack of '{def_key}' at {pos} holds {quantity}, limit is {limit}"
            )));
        }
        *totals.entry(def_key.to_string()).or_insert(0) += u64::from(quantity);
    }

    let expected = inv.totals_by_definition();
    if totals != expected {
        let changed = expected
            .keys()
            .chain(totals.keys())
            .find(|key| totals.get(*key) != expected.get(*key))
            .cloned()
            .unwrap_or_default();
        return Err(Rejection::layout(format!(
            "total of '{changed}' would change from {} to {}",
            expected.get(&changed).copied().unwrap_or(0),
            totals.get(&changed).copied().unwrap_or(0)
        )));
    }

    Ok(targets)
}

/// Events turning `inv` into the validated arrangement: removals first
/// (row-major), then moves and quantity changes, then new stacks.
fn diff(inv: &Inventory, targets: &[Target<'_>]) -> Vec<InventoryEvent> {
    let kept: HashSet<ItemInstanceId> = targets
        .iter()
        .filter_map(|t| match t {
            Target::Existing { stack, .. } => Some(stack.id()),
            Target::New { .. } => None,
        })
        .collect();

    let mut draft = Draft::new(inv);
    for stack in inv.items_row_major() {
        if !kept.contains(&stack.id()) {
            draft.set_quantity(stack, 0);
        }
    }

    for target in targets {
        if let Target::Existing { stack, quantity, pos } = target {
            if stack.pos() != *pos {
                draft.record(InventoryEvent::StackMoved(StackMoved {
                    item_id: stack.id(),
                    from: stack.pos(),
                    to: *pos,
                }));
            }
            draft.set_quantity(stack, *quantity);
        }
    }

    for target in targets {
        if let Target::New { def_key, quantity, pos } = target {
            draft.create_stack(def_key, *quantity, *pos);
        }
    }

    draft.into_events()
}
