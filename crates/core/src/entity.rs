//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Anything keyed by id in a store or a per-run cache implements this.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
