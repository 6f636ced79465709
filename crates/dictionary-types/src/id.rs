//! Dictionary identifier type.
//!
//! Entities receive a numeric identifier from the repository on their first
//! successful save. Until then the `id` field of an entity is `None`.

/// A repository-assigned entity identifier.
///
/// Identifiers are positive and assigned in increasing order per entity kind,
/// so ascending id order is also creation order.
///
/// # Examples
///
/// ```
/// use dictionary_types::EntityId;
///
/// let cd4_count: EntityId = 5497;
/// assert!(cd4_count > 0);
/// ```
pub type EntityId = u64;
