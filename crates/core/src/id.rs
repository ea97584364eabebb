//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory record (assigned by the record store).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(u64);

/// Identifier of one stack inside an inventory.
///
/// Assigned by the owning inventory from a monotonic counter; never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemInstanceId(u64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Interpret a wire-level signed id. Non-positive values carry no identity.
            pub fn from_wire(value: i64) -> Option<Self> {
                u64::try_from(value).ok().filter(|v| *v > 0).map(Self)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(InventoryId, "InventoryId");
impl_int_newtype!(ItemInstanceId, "ItemInstanceId");

/// Kind of entity that owns an inventory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Character,
    Vehicle,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Character => "character",
            OwnerKind::Vehicle => "vehicle",
        }
    }
}

impl core::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" | "player" => Ok(OwnerKind::Character),
            "vehicle" => Ok(OwnerKind::Vehicle),
            other => Err(DomainError::invalid_id(format!("OwnerKind: unknown kind '{other}'"))),
        }
    }
}

/// Stable owner identity of an inventory: owner kind + opaque owner id.
///
/// Supplied by the caller on every operation and trusted by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: i64,
}

impl OwnerRef {
    pub const fn new(kind: OwnerKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub const fn character(id: i64) -> Self {
        Self::new(OwnerKind::Character, id)
    }

    pub const fn vehicle(id: i64) -> Self {
        Self::new(OwnerKind::Vehicle, id)
    }
}

impl core::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_reject_non_positive_values() {
        assert_eq!(ItemInstanceId::from_wire(0), None);
        assert_eq!(ItemInstanceId::from_wire(-4), None);
        assert_eq!(ItemInstanceId::from_wire(7), Some(ItemInstanceId::new(7)));
    }

    #[test]
    fn owner_kind_parses_legacy_player_alias() {
        assert_eq!("player".parse::<OwnerKind>().unwrap(), OwnerKind::Character);
        assert_eq!(" Vehicle ".parse::<OwnerKind>().unwrap(), OwnerKind::Vehicle);
        assert!("boat".parse::<OwnerKind>().is_err());
    }

    #[test]
    fn owner_kind_serializes_lowercase() {
        let json = serde_json::to_string(&OwnerKind::Vehicle).unwrap();
        assert_eq!(json, "\"vehicle\"");
    }

    #[test]
    fn owner_ref_display_is_kind_and_id() {
        assert_eq!(OwnerRef::character(42).to_string(), "character:42");
    }
}
