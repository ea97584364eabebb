//! Grid placement primitives.
//!
//! Both functions are pure over a slice of stacks: they never mutate, they
//! only describe where quantity would go. Scan order is row-major (`y` outer,
//! `x` inner, from `(0,0)`), for free cells and for existing stacks alike.

use std::collections::HashSet;

use gridinv_catalog::ItemDefinition;
use gridinv_core::{GridPos, ItemInstanceId};

use crate::inventory::InventoryItem;

/// First unoccupied cell in row-major order, or `None` when the grid is full.
pub fn find_first_free_cell(items: &[InventoryItem], width: u32, height: u32) -> Option<GridPos> {
    let occupied: HashSet<GridPos> = items.iter().map(|i| i.pos()).collect();
    free_cells(&occupied, width, height).next()
}

fn free_cells(occupied: &HashSet<GridPos>, width: u32, height: u32) -> impl Iterator<Item = GridPos> + '_ {
    (0..height)
        .flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
        .filter(move |pos| !occupied.contains(pos))
}

/// One step of a stack-first allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// Add `add` units to an existing stack.
    TopUp { item_id: ItemInstanceId, add: u32 },
    /// Create a new stack of `quantity` units at `pos`.
    NewStack { pos: GridPos, quantity: u32 },
}

impl Allocation {
    pub fn quantity(&self) -> u32 {
        match self {
            Allocation::TopUp { add, .. } => *add,
            Allocation::NewStack { quantity, .. } => *quantity,
        }
    }
}

/// Outcome of [`stack_first_add`]: the ordered allocations plus how much of
/// the request they cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub requested: u32,
    pub placed: u32,
    pub allocations: Vec<Allocation>,
}

impl AllocationPlan {
    pub fn remaining(&self) -> u32 {
        self.requested - self.placed
    }

    pub fn is_partial(&self) -> bool {
        self.placed < self.requested
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

/// Plan placing `quantity` units of `def`.
///
/// Existing stacks of the same definition with spare room are topped up
/// first (row-major order); the rest goes into new stacks of at most
/// `max_stack` units at successive free cells. When the grid fills up the
/// plan is partial; this never fails. `exclude` keeps one stack (the source
/// of a split) out of the top-up candidates.
pub fn stack_first_add(
    items: &[InventoryItem],
    width: u32,
    height: u32,
    def: &ItemDefinition,
    quantity: u32,
    exclude: Option<ItemInstanceId>,
) -> AllocationPlan {
    let max_stack = def.max_stack.max(1);
    let mut remaining = quantity;
    let mut allocations = Vec::new();

    let mut candidates: Vec<&InventoryItem> = items
        .iter()
        .filter(|i| i.def_key() == def.key && Some(i.id()) != exclude)
        .collect();
    candidates.sort_by_key(|i| i.pos());

    for stack in candidates {
        if remaining == 0 {
            break;
        }
        let spare = max_stack.saturating_sub(stack.quantity());
        let add = spare.min(remaining);
        if add > 0 {
            allocations.push(Allocation::TopUp { item_id: stack.id(), add });
            remaining -= add;
        }
    }

    if remaining > 0 {
        let occupied: HashSet<GridPos> = items.iter().map(|i| i.pos()).collect();
        for pos in free_cells(&occupied, width, height) {
            if remaining == 0 {
                break;
            }
            let take = max_stack.min(remaining);
            allocations.push(Allocation::NewStack { pos, quantity: take });
            remaining -= take;
        }
    }

    AllocationPlan {
        requested: quantity,
        placed: quantity - remaining,
        allocations,
    }
}
