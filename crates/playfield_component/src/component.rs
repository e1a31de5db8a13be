//! Core [`Component`] trait and associated metadata.
//!
//! Every piece of data stored in a scene must implement [`Component`]. The
//! trait requires `Send + Sync + 'static` plus serde bounds so component
//! values can be moved between archetype tables and handed to an external
//! serializer one row at a time.
//!
//! ## Type identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. Unlike `std::any::TypeId`, the result is
//! deterministic across builds and processes and has a meaningful `Ord` — the
//! strict total order that scheme sorting and matrix merge-matching rely on.

use serde::{Deserialize, Serialize};

use crate::column::{Column, TypedColumn, downcast, downcast_mut};
use crate::error::ComponentError;

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
///
/// The ID is deterministic: any build that applies FNV-1a to the same UTF-8
/// name bytes produces the same `ComponentTypeId`. Its `Ord` is the one
/// global, stable total order used everywhere component types are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name using
    /// the FNV-1a 64-bit hash algorithm.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Components must be `Default` (newly added columns are grown with
/// placeholder values), `Clone` (rows can be copied between tables of equal
/// scheme), and serialisable (the registry exposes per-row MessagePack hooks
/// to the external serializer).
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use playfield_component::Component;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component:
    Clone + Default + Send + Sync + 'static + Serialize + for<'de> Deserialize<'de>
{
    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component type.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name(),
            new_column: new_column::<Self>,
            serialize_row: serialize_row::<Self>,
            deserialize_push: deserialize_push::<Self>,
        }
    }
}

/// Metadata about a component type, used wherever a column must be handled
/// without compile-time knowledge of its element type.
#[derive(Clone)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Transform3D"`).
    pub name: &'static str,
    /// Constructs a fresh, empty column for this component type.
    pub new_column: fn() -> Box<dyn Column>,
    /// Serialise the value at one row of a column to MessagePack bytes.
    pub serialize_row: fn(&dyn Column, usize) -> Result<Vec<u8>, ComponentError>,
    /// Deserialise MessagePack bytes and push the value onto a column.
    pub deserialize_push: fn(&mut dyn Column, &[u8]) -> Result<(), ComponentError>,
}

impl std::fmt::Debug for ComponentMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentMeta")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .finish()
    }
}

fn new_column<T: Component>() -> Box<dyn Column> {
    Box::new(TypedColumn::<T>::new())
}

fn serialize_row<T: Component>(column: &dyn Column, row: usize) -> Result<Vec<u8>, ComponentError> {
    let column = downcast::<T>(column)?;
    Ok(rmp_serde::to_vec_named(column.get(row))?)
}

fn deserialize_push<T: Component>(column: &mut dyn Column, bytes: &[u8]) -> Result<(), ComponentError> {
    let value: T = rmp_serde::from_slice(bytes)?;
    downcast_mut::<T>(column)?.push(value);
    Ok(())
}
