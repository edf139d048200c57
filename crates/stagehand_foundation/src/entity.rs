//! Engine-side identifiers: entities, components, and catalogued assets.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entity identifier with generational index for stale reference detection.
///
/// The generation counter increments when an entity index is reused after destruction,
/// so a handle held by a scenario stops resolving once the engine deletes the entity.
///
/// # Layout
/// - `index`: 64-bit index into entity storage
/// - `generation`: 32-bit generation counter
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId {
    /// Index into entity storage.
    pub index: u64,
    /// Generation counter for stale reference detection.
    pub generation: u32,
}

impl EntityId {
    /// Creates a new entity ID with the given index and generation.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns a sentinel value representing "no entity".
    ///
    /// This uses `u64::MAX` as the index, which should never be allocated.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            index: u64::MAX,
            generation: 0,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u64::MAX
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

/// Identifier of a registered component type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentTypeId(pub u32);

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Identifier of one component instance. Never reused within an editor session.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Reference to a component instance on a specific entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentRef {
    /// The entity that owns the component.
    pub entity: EntityId,
    /// The component's registered type.
    pub type_id: ComponentTypeId,
    /// The component instance.
    pub id: ComponentId,
}

impl ComponentRef {
    /// Creates a new component reference.
    #[must_use]
    pub const fn new(entity: EntityId, type_id: ComponentTypeId, id: ComponentId) -> Self {
        Self {
            entity,
            type_id,
            id,
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.entity, self.type_id, self.id)
    }
}

/// Asset catalog identifier. Zero is the invalid id returned for unknown paths.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetId(pub u64);

impl AssetId {
    /// The id returned for paths the catalog does not know.
    pub const INVALID: AssetId = AssetId(0);

    /// Returns true unless this is [`AssetId::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{:016x}", self.0)
    }
}
