//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Storage adapters key their rows by `Entity::id`.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
