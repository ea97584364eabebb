//! JSON replies printed by the shell, one per line.

use serde::Serialize;

use gridinv_catalog::ItemDefinition;
use gridinv_infra::{AddItemsOutcome, OperationOutcome, OperationStatus};
use gridinv_inventory::InventorySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    Applied {
        snapshot: InventorySnapshot,
        #[serde(skip_serializing_if = "Option::is_none")]
        added: Option<Added>,
    },
    Unchanged {
        snapshot: InventorySnapshot,
    },
    Rejected {
        reason: &'static str,
        message: String,
        snapshot: InventorySnapshot,
    },
    Opened {
        snapshot: InventorySnapshot,
    },
    Filled {
        added: Vec<Added>,
        snapshot: InventorySnapshot,
    },
    Catalog {
        definitions: Vec<ItemDefinition>,
    },
    Help {
        usage: &'static str,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Added {
    pub requested: u32,
    pub placed: u32,
}

impl From<&AddItemsOutcome> for Added {
    fn from(value: &AddItemsOutcome) -> Self {
        Self {
            requested: value.requested,
            placed: value.placed,
        }
    }
}

impl From<OperationOutcome> for Reply {
    fn from(outcome: OperationOutcome) -> Self {
        match outcome.status {
            OperationStatus::Applied => Reply::Applied {
                snapshot: outcome.snapshot,
                added: None,
            },
            OperationStatus::Unchanged => Reply::Unchanged {
                snapshot: outcome.snapshot,
            },
            OperationStatus::Rejected(reason) => Reply::Rejected {
                reason: reason.code(),
                message: reason.to_string(),
                snapshot: outcome.snapshot,
            },
        }
    }
}

impl From<AddItemsOutcome> for Reply {
    fn from(outcome: AddItemsOutcome) -> Self {
        let added = Added::from(&outcome);
        match Reply::from(outcome.outcome) {
            Reply::Applied { snapshot, .. } => Reply::Applied {
                snapshot,
                added: Some(added),
            },
            other => other,
        }
    }
}

impl Reply {
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error { message: message.into() }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"status":"error","message":"{e}"}}"#))
    }
}
