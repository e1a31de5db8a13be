//! The component registry.
//!
//! An explicit, owned registry object mapping component names and type ids
//! to [`ComponentMeta`] descriptors. It is constructed once during setup and
//! passed to whoever needs to handle components without compile-time type
//! knowledge — scenes spawning components by name, and the external
//! serializer resolving `name ↔ type` while walking rows positionally.
//!
//! There is deliberately no global singleton: registration order is owned by
//! the caller and therefore controllable in tests.

use std::collections::HashMap;

use crate::column::Column;
use crate::component::{Component, ComponentMeta, ComponentTypeId};
use crate::error::ComponentError;

/// Registry of component classes known to the gameplay layer.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_id: HashMap<ComponentTypeId, ComponentMeta>,
    by_name: HashMap<&'static str, ComponentTypeId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component class.
    ///
    /// Fails with [`ComponentError::AlreadyRegistered`] if the class name or
    /// its derived type id has been registered before.
    pub fn register<T: Component>(&mut self) -> Result<(), ComponentError> {
        let meta = T::meta();
        if self.by_name.contains_key(meta.name) || self.by_id.contains_key(&meta.type_id) {
            return Err(ComponentError::AlreadyRegistered(meta.name));
        }
        self.by_name.insert(meta.name, meta.type_id);
        self.by_id.insert(meta.type_id, meta);
        Ok(())
    }

    /// Returns `true` if the component class is registered.
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.by_id.contains_key(&T::component_type_id())
    }

    /// Returns `true` if a component class is registered under `name`.
    #[must_use]
    pub fn is_registered_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Looks up the descriptor for a type id.
    ///
    /// Fails with [`ComponentError::NotRegistered`] when absent.
    pub fn meta(&self, type_id: ComponentTypeId) -> Result<&ComponentMeta, ComponentError> {
        self.by_id
            .get(&type_id)
            .ok_or_else(|| ComponentError::NotRegistered(type_id.to_string()))
    }

    /// Looks up the descriptor for a class name.
    ///
    /// Fails with [`ComponentError::NotRegistered`] when absent.
    pub fn meta_by_name(&self, name: &str) -> Result<&ComponentMeta, ComponentError> {
        let type_id = self
            .by_name
            .get(name)
            .ok_or_else(|| ComponentError::NotRegistered(name.to_string()))?;
        self.meta(*type_id)
    }

    /// Constructs a fresh, empty column for a registered type id.
    pub fn new_column(&self, type_id: ComponentTypeId) -> Result<Box<dyn Column>, ComponentError> {
        Ok((self.meta(type_id)?.new_column)())
    }

    /// Number of registered component classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterates over all registered descriptors, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentMeta> {
        self.by_id.values()
    }
}
