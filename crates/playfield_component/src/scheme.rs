//! Schemes — archetype keys.
//!
//! A [`Scheme`] is the exact, order-independent set of component types an
//! entity currently has: a sorted, deduplicated sequence of
//! [`ComponentTypeId`]s with a cached combined hash that is recomputed on
//! every mutation. Two schemes are equal iff their sorted sequences are
//! element-wise equal, which makes them usable as hash-map keys for
//! archetype tables.

use std::hash::{Hash, Hasher};

use crate::component::ComponentTypeId;
use crate::error::ComponentError;

/// An ordered, deduplicated, hashable set of component type identifiers.
#[derive(Debug, Clone)]
pub struct Scheme {
    /// Always sorted ascending, never containing duplicates.
    types: Vec<ComponentTypeId>,
    /// Cached combined hash of `types`, recomputed on mutation.
    hash: u64,
}

impl Scheme {
    /// Creates an empty scheme.
    #[must_use]
    pub fn new() -> Self {
        let mut scheme = Self {
            types: Vec::new(),
            hash: 0,
        };
        scheme.rehash();
        scheme
    }

    /// Builds a scheme from a list of type ids in any order.
    ///
    /// Fails with [`ComponentError::DuplicateType`] if the same id appears
    /// twice.
    pub fn from_types(
        types: impl IntoIterator<Item = ComponentTypeId>,
    ) -> Result<Self, ComponentError> {
        let mut scheme = Self::new();
        for ty in types {
            scheme.insert(ty)?;
        }
        Ok(scheme)
    }

    /// Inserts a type at its sorted position and returns that position.
    ///
    /// Fails with [`ComponentError::DuplicateType`] if the type is already
    /// present.
    pub fn insert(&mut self, ty: ComponentTypeId) -> Result<usize, ComponentError> {
        match self.types.binary_search(&ty) {
            Ok(_) => Err(ComponentError::DuplicateType(ty)),
            Err(position) => {
                self.types.insert(position, ty);
                self.rehash();
                Ok(position)
            }
        }
    }

    /// Removes a type and returns the position it occupied.
    ///
    /// Fails with [`ComponentError::MissingType`] if the type is not
    /// present.
    pub fn remove(&mut self, ty: ComponentTypeId) -> Result<usize, ComponentError> {
        match self.types.binary_search(&ty) {
            Ok(position) => {
                self.types.remove(position);
                self.rehash();
                Ok(position)
            }
            Err(_) => Err(ComponentError::MissingType(ty)),
        }
    }

    /// Removes the type at `ordinal` and returns it.
    ///
    /// Fails with [`ComponentError::OrdinalOutOfRange`] for positions past
    /// the end.
    pub fn remove_at(&mut self, ordinal: usize) -> Result<ComponentTypeId, ComponentError> {
        if ordinal >= self.types.len() {
            return Err(ComponentError::OrdinalOutOfRange {
                ordinal,
                len: self.types.len(),
            });
        }
        let ty = self.types.remove(ordinal);
        self.rehash();
        Ok(ty)
    }

    /// Returns `true` if the type is part of the scheme.
    #[must_use]
    pub fn contains(&self, ty: ComponentTypeId) -> bool {
        self.types.binary_search(&ty).is_ok()
    }

    /// Returns the sorted position of a type, if present.
    #[must_use]
    pub fn index_of(&self, ty: ComponentTypeId) -> Option<usize> {
        self.types.binary_search(&ty).ok()
    }

    /// The type ids in sorted order.
    #[must_use]
    pub fn types(&self) -> &[ComponentTypeId] {
        &self.types
    }

    /// Number of types in the scheme.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` for the empty scheme.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if every type of this scheme appears in `superset`.
    ///
    /// A linear merge walk over both sorted sequences; the empty scheme is a
    /// subset of everything.
    #[must_use]
    pub fn is_subset_of(&self, superset: &Scheme) -> bool {
        let mut sub = self.types.iter().peekable();
        let mut sup = superset.types.iter().peekable();
        while let (Some(&a), Some(&b)) = (sub.peek(), sup.peek()) {
            if a == b {
                sub.next();
                sup.next();
            } else if a > b {
                sup.next();
            } else {
                return false;
            }
        }
        sub.peek().is_none()
    }

    fn rehash(&mut self) {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for ty in &self.types {
            ty.hash(&mut hasher);
        }
        self.hash = hasher.finish();
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Scheme {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl Eq for Scheme {}

impl Hash for Scheme {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
