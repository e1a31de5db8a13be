//! Type-erased component columns.
//!
//! A column is the dense array of one component type's values inside a
//! matrix, addressed by row. [`Column`] is the erased control surface the
//! storage code drives without knowing element types; [`TypedColumn`] is the
//! single implementation, a thin wrapper over `Vec<T>`.
//!
//! Removal is swap-remove throughout: the last element moves into the
//! vacated slot, so the owning table must fix up whichever entity used to
//! occupy the displaced last row.
//!
//! Row indices are checked the `Vec` way — out-of-range rows panic and are
//! documented as a caller contract. Type violations are reported as
//! [`ComponentError::TypeMismatch`] instead.

use std::any::Any;

use crate::component::{Component, ComponentTypeId};
use crate::error::ComponentError;

/// The erased interface over one component type's dense value array.
pub trait Column: Send + Sync {
    /// Number of values stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runtime identity of the element type.
    fn type_id(&self) -> ComponentTypeId;

    /// Human-readable name of the element type.
    fn type_name(&self) -> &'static str;

    /// Appends a default-constructed value.
    fn push_default(&mut self);

    /// Inserts a default-constructed value at `row`, shifting later rows.
    ///
    /// # Panics
    ///
    /// Panics if `row > len`.
    fn insert_default(&mut self, row: usize);

    /// Grows or shrinks the column to `len`, filling with defaults.
    fn resize_default(&mut self, len: usize);

    /// Reserves capacity for at least `additional` more values.
    fn reserve(&mut self, additional: usize);

    /// Removes the value at `row` by moving the last value into its place.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len`.
    fn swap_remove(&mut self, row: usize);

    /// Removes the values in `first..last`, shifting later rows down.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    fn erase_range(&mut self, first: usize, last: usize);

    /// Removes every value.
    fn clear(&mut self);

    /// Creates a new column of the same runtime type with zero length.
    ///
    /// This is how a matrix grows its "far side" during migration without
    /// compile-time type knowledge.
    fn clone_empty(&self) -> Box<dyn Column>;

    /// Clones the value at `source_row` of `source` into `row` of this
    /// column. Fails with [`ComponentError::TypeMismatch`] if the two
    /// columns' element types differ.
    ///
    /// # Panics
    ///
    /// Panics if either row is out of bounds.
    fn copy_from(
        &mut self,
        row: usize,
        source: &dyn Column,
        source_row: usize,
    ) -> Result<(), ComponentError>;

    /// Moves the value at `source_row` of `source` into `row` of this
    /// column, leaving a default value behind. Every caller erases the
    /// vacated source row immediately afterwards. Fails with
    /// [`ComponentError::TypeMismatch`] if the element types differ.
    ///
    /// # Panics
    ///
    /// Panics if either row is out of bounds.
    fn move_from(
        &mut self,
        row: usize,
        source: &mut dyn Column,
        source_row: usize,
    ) -> Result<(), ComponentError>;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Downcasts an erased column to its typed form.
///
/// Fails with [`ComponentError::TypeMismatch`] when the column stores a
/// different component type than `T`.
pub fn downcast<T: Component>(column: &dyn Column) -> Result<&TypedColumn<T>, ComponentError> {
    column
        .as_any()
        .downcast_ref::<TypedColumn<T>>()
        .ok_or_else(|| ComponentError::TypeMismatch {
            expected: T::type_name(),
            found: column.type_name(),
        })
}

/// Mutable variant of [`downcast`].
pub fn downcast_mut<T: Component>(
    column: &mut dyn Column,
) -> Result<&mut TypedColumn<T>, ComponentError> {
    let found = column.type_name();
    column
        .as_any_mut()
        .downcast_mut::<TypedColumn<T>>()
        .ok_or(ComponentError::TypeMismatch {
            expected: T::type_name(),
            found,
        })
}

/// Dense storage for one component type, addressed by row.
#[derive(Debug, Clone, Default)]
pub struct TypedColumn<T: Component> {
    values: Vec<T>,
}

impl<T: Component> TypedColumn<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Returns the value at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len`.
    #[must_use]
    pub fn get(&self, row: usize) -> &T {
        &self.values[row]
    }

    /// Mutable variant of [`TypedColumn::get`].
    pub fn get_mut(&mut self, row: usize) -> &mut T {
        &mut self.values[row]
    }

    /// Overwrites the value at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len`.
    pub fn set(&mut self, row: usize, value: T) {
        self.values[row] = value;
    }

    /// Appends a value.
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Inserts a value at `row`, shifting later rows.
    pub fn insert(&mut self, row: usize, value: T) {
        self.values.insert(row, value);
    }

    /// The values as a slice, in row order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// The values as a mutable slice, in row order.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: Component> Column for TypedColumn<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn type_id(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn push_default(&mut self) {
        self.values.push(T::default());
    }

    fn insert_default(&mut self, row: usize) {
        self.values.insert(row, T::default());
    }

    fn resize_default(&mut self, len: usize) {
        self.values.resize_with(len, T::default);
    }

    fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    fn swap_remove(&mut self, row: usize) {
        self.values.swap_remove(row);
    }

    fn erase_range(&mut self, first: usize, last: usize) {
        self.values.drain(first..last);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn clone_empty(&self) -> Box<dyn Column> {
        Box::new(TypedColumn::<T>::new())
    }

    fn copy_from(
        &mut self,
        row: usize,
        source: &dyn Column,
        source_row: usize,
    ) -> Result<(), ComponentError> {
        let source = downcast::<T>(source)?;
        self.values[row] = source.values[source_row].clone();
        Ok(())
    }

    fn move_from(
        &mut self,
        row: usize,
        source: &mut dyn Column,
        source_row: usize,
    ) -> Result<(), ComponentError> {
        let source = downcast_mut::<T>(source)?;
        self.values[row] = std::mem::take(&mut source.values[source_row]);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Health(i32);

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Mana(i32);

    impl Component for Mana {
        fn type_name() -> &'static str {
            "Mana"
        }
    }

    fn filled(values: &[i32]) -> TypedColumn<Health> {
        let mut column = TypedColumn::new();
        for &v in values {
            column.push(Health(v));
        }
        column
    }

    #[test]
    fn test_push_and_get() {
        let column = filled(&[1, 2, 3]);
        assert_eq!(column.len(), 3);
        assert_eq!(column.get(1), &Health(2));
    }

    #[test]
    fn test_push_default_grows_with_placeholder() {
        let mut column = filled(&[7]);
        column.push_default();
        assert_eq!(column.get(1), &Health(0));
    }

    #[test]
    fn test_swap_remove_moves_last_into_slot() {
        let mut column = filled(&[10, 20, 30, 40]);
        column.swap_remove(1);
        assert_eq!(column.as_slice(), &[Health(10), Health(40), Health(30)]);
    }

    #[test]
    fn test_erase_range() {
        let mut column = filled(&[1, 2, 3, 4, 5]);
        column.erase_range(1, 4);
        assert_eq!(column.as_slice(), &[Health(1), Health(5)]);
    }

    #[test]
    fn test_insert_default_shifts_rows() {
        let mut column = filled(&[1, 2]);
        column.insert_default(1);
        assert_eq!(column.as_slice(), &[Health(1), Health(0), Health(2)]);
    }

    #[test]
    fn test_clone_empty_preserves_type() {
        let column = filled(&[1]);
        let clone = column.clone_empty();
        assert_eq!(Column::type_id(clone.as_ref()), Health::component_type_id());
        assert_eq!(clone.type_name(), "Health");
        assert!(clone.is_empty());
    }

    #[test]
    fn test_copy_from_matching_column() {
        let source = filled(&[5, 6]);
        let mut target = filled(&[0]);
        target.copy_from(0, &source, 1).unwrap();
        assert_eq!(target.get(0), &Health(6));
        // Source is untouched by a copy.
        assert_eq!(source.get(1), &Health(6));
    }

    #[test]
    fn test_move_from_takes_value() {
        let mut source = filled(&[5, 6]);
        let mut target = filled(&[0]);
        target.move_from(0, &mut source, 0).unwrap();
        assert_eq!(target.get(0), &Health(5));
        assert_eq!(source.get(0), &Health(0));
    }

    #[test]
    fn test_copy_from_rejects_type_mismatch() {
        let source = TypedColumn::<Mana>::new();
        let mut target = filled(&[1]);
        let result = target.copy_from(0, &source, 0);
        match result {
            Err(ComponentError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "Health");
                assert_eq!(found, "Mana");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_downcast_rejects_wrong_type() {
        let column = filled(&[1]);
        assert!(downcast::<Mana>(&column).is_err());
        assert!(downcast::<Health>(&column).is_ok());
    }

    #[test]
    fn test_resize_default() {
        let mut column = filled(&[1, 2, 3]);
        column.resize_default(5);
        assert_eq!(column.len(), 5);
        assert_eq!(column.get(4), &Health(0));
        column.resize_default(1);
        assert_eq!(column.as_slice(), &[Health(1)]);
    }
}
