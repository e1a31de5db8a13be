//! Scene-layer error types.

use playfield_component::ComponentError;

use crate::entity::EntityId;

/// Errors raised by archetype tables and the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Two tables of unequal schemes were asked to merge.
    #[error("cannot merge tables of unequal schemes")]
    SchemeMismatch,

    /// An operation referenced an entity that does not exist in this scene,
    /// or whose handle went stale after deletion.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// A component type was added to an entity that already has it.
    #[error("entity already has component '{0}'")]
    DuplicateComponent(&'static str),

    /// A component lookup referenced a type the entity does not have.
    #[error("component '{0}' is not present")]
    ComponentMissing(&'static str),

    /// Two scenes being merged both track the same entity id.
    #[error("entity {0} exists in both scenes")]
    EntityCollision(EntityId),

    /// A row operation was attempted on a matrix with no columns.
    #[error("matrix has no columns to hold a row")]
    EmptyMatrix,

    /// An error bubbled up from type-erased column storage.
    #[error(transparent)]
    Component(#[from] ComponentError),
}
