//! The component matrix — parallel columns for one scheme.
//!
//! A matrix owns one [`Column`] per component type of its table's scheme.
//! The columns are reachable two ways:
//!
//! * **column-centric**, in registration order (the stable per-row ordering
//!   the external serializer walks positionally), and
//! * through `type_order`, a `(type id, column index)` array kept sorted by
//!   type id and recomputed after every structural column change.
//!
//! The sorted index buys O(log n) column lookup and, more importantly,
//! O(n+m) merge-matching between two matrices: walking both `type_order`
//! arrays in lockstep, advancing the side with the smaller type id, visits
//! exactly the type intersection in ascending type order. That walk is what
//! moves an entity's row across tables when its scheme changes.
//!
//! Row indices are checked the `Vec` way — out-of-range rows panic. Type
//! and state violations are reported as errors.

use playfield_component::{Column, Component, ComponentTypeId, downcast, downcast_mut};

use crate::error::SceneError;

/// Parallel dense columns for one scheme, with a type-sorted side index.
///
/// Invariant: every column has identical length, the matrix's row count.
#[derive(Default)]
pub struct ComponentMatrix {
    /// Columns in registration order.
    columns: Vec<Box<dyn Column>>,
    /// `(type id, column index)` sorted by type id.
    type_order: Vec<(ComponentTypeId, usize)>,
}

impl ComponentMatrix {
    /// Creates a matrix with no columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, growing it with defaults to the current row count.
    pub fn push_column(&mut self, mut column: Box<dyn Column>) {
        debug_assert!(
            self.column_index_of(column.type_id()).is_none(),
            "duplicate column type in matrix"
        );
        column.resize_default(self.row_count());
        self.columns.push(column);
        self.recompute_order();
    }

    /// Removes the column at `index` (registration order), discarding its
    /// values, and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_column(&mut self, index: usize) -> Box<dyn Column> {
        let column = self.columns.remove(index);
        self.recompute_order();
        column
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column at `index` (registration order).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn column(&self, index: usize) -> &dyn Column {
        &*self.columns[index]
    }

    /// Mutable variant of [`ComponentMatrix::column`].
    pub fn column_mut(&mut self, index: usize) -> &mut dyn Column {
        &mut *self.columns[index]
    }

    /// Runtime type of the column at `index` (registration order). This is
    /// the per-ordinal lookup the serialization boundary depends on.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn type_at(&self, index: usize) -> ComponentTypeId {
        self.columns[index].type_id()
    }

    /// The `(type id, column index)` pairs, sorted by type id.
    #[must_use]
    pub fn type_order(&self) -> &[(ComponentTypeId, usize)] {
        &self.type_order
    }

    /// Finds the registration-order index of the column holding `ty`.
    #[must_use]
    pub fn column_index_of(&self, ty: ComponentTypeId) -> Option<usize> {
        self.type_order
            .binary_search_by_key(&ty, |&(t, _)| t)
            .ok()
            .map(|sorted| self.type_order[sorted].1)
    }

    /// Creates a new matrix with the same columns, all empty, preserving
    /// registration order.
    #[must_use]
    pub fn clone_layout(&self) -> ComponentMatrix {
        let mut clone = ComponentMatrix {
            columns: self.columns.iter().map(|c| c.clone_empty()).collect(),
            type_order: Vec::new(),
        };
        clone.recompute_order();
        clone
    }

    /// Number of rows. Zero when the matrix has no columns.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// Appends a default-filled row to every column and returns its index.
    ///
    /// Fails with [`SceneError::EmptyMatrix`] when there are no columns to
    /// hold the row.
    pub fn push_default_row(&mut self) -> Result<usize, SceneError> {
        if self.columns.is_empty() {
            return Err(SceneError::EmptyMatrix);
        }
        let row = self.row_count();
        for column in &mut self.columns {
            column.push_default();
        }
        Ok(row)
    }

    /// Swap-removes `row` from every column. The caller owns the entity
    /// fixup for whichever row was moved into the vacated slot.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds of a non-empty layout.
    pub fn swap_remove_row(&mut self, row: usize) {
        for column in &mut self.columns {
            column.swap_remove(row);
        }
    }

    /// Removes every row, keeping the column layout.
    pub fn clear_rows(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    /// Reserves capacity for `additional` more rows in every column.
    pub fn reserve_rows(&mut self, additional: usize) {
        for column in &mut self.columns {
            column.reserve(additional);
        }
    }

    /// Copies `source_row` of `source` into `row` of this matrix,
    /// column-index-for-column-index.
    ///
    /// Valid only between matrices of identical layout; a column count
    /// mismatch is a [`SceneError::SchemeMismatch`], a pairwise type
    /// mismatch surfaces from the column transfer.
    pub fn copy_row_same(
        &mut self,
        row: usize,
        source: &ComponentMatrix,
        source_row: usize,
    ) -> Result<(), SceneError> {
        if self.columns.len() != source.columns.len() {
            return Err(SceneError::SchemeMismatch);
        }
        for (target, origin) in self.columns.iter_mut().zip(&source.columns) {
            target.copy_from(row, &**origin, source_row)?;
        }
        Ok(())
    }

    /// Moving variant of [`ComponentMatrix::copy_row_same`].
    pub fn move_row_same(
        &mut self,
        row: usize,
        source: &mut ComponentMatrix,
        source_row: usize,
    ) -> Result<(), SceneError> {
        if self.columns.len() != source.columns.len() {
            return Err(SceneError::SchemeMismatch);
        }
        for (target, origin) in self.columns.iter_mut().zip(&mut source.columns) {
            target.move_from(row, &mut **origin, source_row)?;
        }
        Ok(())
    }

    /// Copies every column value whose type exists in **both** matrices from
    /// `source_row` of `source` into `row` of this matrix, leaving the
    /// source untouched.
    ///
    /// Disjoint matrices degrade gracefully to "no matched columns".
    pub fn copy_row_matched(
        &mut self,
        row: usize,
        source: &ComponentMatrix,
        source_row: usize,
    ) -> Result<(), SceneError> {
        let mut target_sorted = 0;
        let mut source_sorted = 0;
        while target_sorted < self.type_order.len() && source_sorted < source.type_order.len() {
            let (target_type, target_column) = self.type_order[target_sorted];
            let (source_type, source_column) = source.type_order[source_sorted];
            if target_type < source_type {
                target_sorted += 1;
            } else if source_type < target_type {
                source_sorted += 1;
            } else {
                self.columns[target_column].copy_from(
                    row,
                    &*source.columns[source_column],
                    source_row,
                )?;
                target_sorted += 1;
                source_sorted += 1;
            }
        }
        Ok(())
    }

    /// Moving variant of [`ComponentMatrix::copy_row_matched`]: matched
    /// values are taken out of the source row.
    pub fn move_row_matched(
        &mut self,
        row: usize,
        source: &mut ComponentMatrix,
        source_row: usize,
    ) -> Result<(), SceneError> {
        self.move_row_filtered(row, source, source_row, |_, _| false)
    }

    /// Like [`ComponentMatrix::move_row_matched`], but source columns for
    /// which `skip(type, registration index)` returns `true` are left out —
    /// this is how a removed component's data gets discarded instead of
    /// copied.
    pub fn move_row_filtered(
        &mut self,
        row: usize,
        source: &mut ComponentMatrix,
        source_row: usize,
        mut skip: impl FnMut(ComponentTypeId, usize) -> bool,
    ) -> Result<(), SceneError> {
        let mut target_sorted = 0;
        let mut source_sorted = 0;
        while target_sorted < self.type_order.len() && source_sorted < source.type_order.len() {
            let (target_type, target_column) = self.type_order[target_sorted];
            let (source_type, source_column) = source.type_order[source_sorted];
            if target_type < source_type {
                target_sorted += 1;
            } else if source_type < target_type {
                source_sorted += 1;
            } else {
                if !skip(source_type, source_column) {
                    self.columns[target_column].move_from(
                        row,
                        &mut *source.columns[source_column],
                        source_row,
                    )?;
                }
                target_sorted += 1;
                source_sorted += 1;
            }
        }
        Ok(())
    }

    /// Typed read of one cell.
    ///
    /// Fails with a type-mismatch error when the column does not store `T`.
    ///
    /// # Panics
    ///
    /// Panics if `column` or `row` is out of bounds.
    pub fn value<T: Component>(&self, column: usize, row: usize) -> Result<&T, SceneError> {
        Ok(downcast::<T>(&*self.columns[column])?.get(row))
    }

    /// Typed mutable read of one cell.
    pub fn value_mut<T: Component>(
        &mut self,
        column: usize,
        row: usize,
    ) -> Result<&mut T, SceneError> {
        Ok(downcast_mut::<T>(&mut *self.columns[column])?.get_mut(row))
    }

    /// Typed overwrite of one cell.
    pub fn write<T: Component>(
        &mut self,
        column: usize,
        row: usize,
        value: T,
    ) -> Result<(), SceneError> {
        downcast_mut::<T>(&mut *self.columns[column])?.set(row, value);
        Ok(())
    }

    /// A row-centric view of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> RowRef<'_> {
        RowRef { matrix: self, row }
    }

    /// Mutable row-centric view of one row.
    pub fn row_mut(&mut self, row: usize) -> RowMut<'_> {
        RowMut { matrix: self, row }
    }

    fn recompute_order(&mut self) {
        self.type_order = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| (column.type_id(), index))
            .collect();
        self.type_order.sort_by_key(|&(ty, _)| ty);
    }
}

impl std::fmt::Debug for ComponentMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentMatrix")
            .field("columns", &self.columns.len())
            .field("rows", &self.row_count())
            .field("type_order", &self.type_order)
            .finish()
    }
}

/// A lightweight `(matrix, row)` reference for per-row typed access.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    matrix: &'a ComponentMatrix,
    row: usize,
}

impl RowRef<'_> {
    /// Typed access to the value in `column` (registration order).
    pub fn get<T: Component>(&self, column: usize) -> Result<&T, SceneError> {
        self.matrix.value::<T>(column, self.row)
    }

    /// Runtime type of `column`.
    #[must_use]
    pub fn type_at(&self, column: usize) -> ComponentTypeId {
        self.matrix.type_at(column)
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.matrix.column_count()
    }

    /// The row index this view points at.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }
}

/// Mutable variant of [`RowRef`].
pub struct RowMut<'a> {
    matrix: &'a mut ComponentMatrix,
    row: usize,
}

impl RowMut<'_> {
    /// Typed access to the value in `column` (registration order).
    pub fn get<T: Component>(&self, column: usize) -> Result<&T, SceneError> {
        self.matrix.value::<T>(column, self.row)
    }

    /// Typed mutable access to the value in `column`.
    pub fn get_mut<T: Component>(&mut self, column: usize) -> Result<&mut T, SceneError> {
        self.matrix.value_mut::<T>(column, self.row)
    }

    /// Typed overwrite of the value in `column`.
    pub fn set<T: Component>(&mut self, column: usize, value: T) -> Result<(), SceneError> {
        self.matrix.write::<T>(column, self.row, value)
    }
}
