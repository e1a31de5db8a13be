//! # playfield_component
//!
//! The "C" of the gameplay layer's ECS — defines what a component is, how it
//! is stored behind type erasure, and how component type sets are keyed.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all gameplay data must satisfy.
//! - [`ComponentTypeId`] — stable, name-derived runtime type identity.
//! - [`Column`] / [`TypedColumn`] — type-erased dense per-type storage.
//! - [`Scheme`] — the sorted, deduplicated archetype key.
//! - [`ComponentRegistry`] — explicit name ↔ type ↔ metadata registry.

pub mod column;
pub mod component;
pub mod error;
pub mod registry;
pub mod scheme;

pub use column::{Column, TypedColumn, downcast, downcast_mut};
pub use component::{Component, ComponentMeta, ComponentTypeId};
pub use error::ComponentError;
pub use registry::ComponentRegistry;
pub use scheme::Scheme;
