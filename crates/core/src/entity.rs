//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An inventory stack keeps its id while its quantity and cell change; two
/// stacks with equal contents are still different stacks.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
