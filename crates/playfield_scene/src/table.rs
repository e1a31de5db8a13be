//! Archetype tables.
//!
//! A [`SchemeTable`] stores every entity of one exact scheme: a
//! [`ComponentMatrix`] of component values plus a row-parallel vector of
//! entity ids. Rows are dense; removal is swap-remove, and every site that
//! relocates a row reports the fixup through [`EntityIndex::set_row`] so the
//! invariant — `entities.len()` equals the matrix row count, and every
//! tracked location matches reality — survives all mutations.
//!
//! Entities change scheme by *splicing*: the destination table grows a
//! default row, pulls the matched columns out of the source row with the
//! matrix merge-join, and the source row is then swap-removed.

use playfield_component::{Component, ComponentMeta, Scheme, TypedColumn, downcast, downcast_mut};
use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::entity::{EntityId, EntityIndex, EntityLocation};
use crate::error::SceneError;
use crate::matrix::{ComponentMatrix, RowMut, RowRef};

/// Identifies a table inside its scene, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub u32);

impl TableId {
    /// The table's position in the scene's creation-order list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// All entities of one scheme, as parallel component columns.
pub struct SchemeTable {
    id: TableId,
    scheme: Scheme,
    matrix: ComponentMatrix,
    /// `entities[i]` owns row `i` of every column.
    entities: Vec<EntityId>,
}

impl SchemeTable {
    pub(crate) fn new(id: TableId, scheme: Scheme, matrix: ComponentMatrix) -> Self {
        debug_assert_eq!(scheme.len(), matrix.column_count());
        debug_assert!(
            scheme
                .types()
                .iter()
                .all(|&ty| matrix.column_index_of(ty).is_some()),
            "matrix layout does not match scheme"
        );
        Self {
            id,
            scheme,
            matrix,
            entities: Vec::new(),
        }
    }

    /// This table's id within its scene.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// The scheme every entity in this table has.
    #[must_use]
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// The component matrix.
    #[must_use]
    pub fn matrix(&self) -> &ComponentMatrix {
        &self.matrix
    }

    /// Number of entities (= rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the table currently holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The entity ids in row order.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Row-centric view of one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> RowRef<'_> {
        self.matrix.row(row)
    }

    /// Mutable row-centric view of one row.
    pub fn row_mut(&mut self, row: usize) -> RowMut<'_> {
        self.matrix.row_mut(row)
    }

    /// The full column of `T` values, in row order.
    ///
    /// Fails when the scheme has no `T`.
    pub fn column<T: Component>(&self) -> Result<&[T], SceneError> {
        let index = self.column_index::<T>()?;
        Ok(downcast::<T>(self.matrix.column(index))?.as_slice())
    }

    /// Mutable variant of [`SchemeTable::column`].
    pub fn column_mut<T: Component>(&mut self) -> Result<&mut [T], SceneError> {
        let index = self.column_index::<T>()?;
        Ok(downcast_mut::<T>(self.matrix.column_mut(index))?.as_mut_slice())
    }

    /// Typed access to one entity's `T` value.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn component<T: Component>(&self, row: usize) -> Result<&T, SceneError> {
        let index = self.column_index::<T>()?;
        self.matrix.value::<T>(index, row)
    }

    /// Mutable variant of [`SchemeTable::component`].
    pub fn component_mut<T: Component>(&mut self, row: usize) -> Result<&mut T, SceneError> {
        let index = self.column_index::<T>()?;
        self.matrix.value_mut::<T>(index, row)
    }

    fn column_index<T: Component>(&self) -> Result<usize, SceneError> {
        self.matrix
            .column_index_of(T::component_type_id())
            .ok_or(SceneError::ComponentMissing(T::type_name()))
    }

    /// Appends a row for `entity` holding `bundle`'s values.
    pub(crate) fn create<B: Bundle>(
        &mut self,
        entity: EntityId,
        index: &mut EntityIndex,
        bundle: B,
    ) -> Result<usize, SceneError> {
        let row = self.entities.len();
        if !self.scheme.is_empty() {
            self.matrix.push_default_row()?;
            if let Err(error) = bundle.write_into(&mut self.matrix, row) {
                self.matrix.swap_remove_row(row);
                return Err(error);
            }
        }
        self.entities.push(entity);
        index.set(entity, EntityLocation { table: self.id, row });
        Ok(row)
    }

    /// Swap-removes the row and returns the entity that owned it. If a
    /// different entity now occupies the vacated slot, its stored row index
    /// is corrected.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub(crate) fn destroy(&mut self, row: usize, index: &mut EntityIndex) -> EntityId {
        let entity = self.entities[row];
        self.matrix.swap_remove_row(row);
        self.entities.swap_remove(row);
        index.remove(entity);
        if row < self.entities.len() {
            index.set_row(self.entities[row], row);
        }
        entity
    }

    /// Appends every row of `other`, leaving it empty.
    ///
    /// Fails with [`SceneError::SchemeMismatch`] unless both tables have
    /// equal schemes.
    pub(crate) fn append_from(
        &mut self,
        other: &mut SchemeTable,
        index: &mut EntityIndex,
    ) -> Result<(), SceneError> {
        if self.scheme != other.scheme {
            return Err(SceneError::SchemeMismatch);
        }
        let moved = other.entities.len();
        self.matrix.reserve_rows(moved);
        self.entities.reserve(moved);
        for source_row in 0..moved {
            let row = self.entities.len();
            if !self.scheme.is_empty() {
                self.matrix.push_default_row()?;
                self.matrix.move_row_matched(row, &mut other.matrix, source_row)?;
            }
            let entity = other.entities[source_row];
            self.entities.push(entity);
            index.set(entity, EntityLocation { table: self.id, row });
        }
        other.matrix.clear_rows();
        other.entities.clear();
        Ok(())
    }

    /// Splices `source_row` out of `source` into this table, then writes
    /// `value` into the column `source` did not have. Used by add-component.
    pub(crate) fn splice_extend<T: Component>(
        &mut self,
        source: &mut SchemeTable,
        source_row: usize,
        value: T,
        index: &mut EntityIndex,
    ) -> Result<usize, SceneError> {
        let row = self.begin_splice(source, source_row, None)?;
        let column = self
            .matrix
            .column_index_of(T::component_type_id())
            .ok_or(SceneError::ComponentMissing(T::type_name()))?;
        self.matrix.write(column, row, value)?;
        self.finish_splice(source, source_row, row, index);
        Ok(row)
    }

    /// Splices `source_row` out of `source`, discarding the data of the
    /// column at `dropped_ordinal` of the source scheme. Used by
    /// remove-component.
    pub(crate) fn splice_reduce(
        &mut self,
        source: &mut SchemeTable,
        source_row: usize,
        dropped_ordinal: usize,
        index: &mut EntityIndex,
    ) -> Result<usize, SceneError> {
        // Scheme and type_order sort identically, so the scheme ordinal maps
        // straight to the registration index.
        let skipped = source.matrix.type_order()[dropped_ordinal].1;
        let row = self.begin_splice(source, source_row, Some(skipped))?;
        self.finish_splice(source, source_row, row, index);
        Ok(row)
    }

    /// Splices `source_row` out of `source` with plain merge-matching; the
    /// columns this table has over `source` keep their default values.
    pub(crate) fn splice_matched(
        &mut self,
        source: &mut SchemeTable,
        source_row: usize,
        index: &mut EntityIndex,
    ) -> Result<usize, SceneError> {
        let row = self.begin_splice(source, source_row, None)?;
        self.finish_splice(source, source_row, row, index);
        Ok(row)
    }

    fn begin_splice(
        &mut self,
        source: &mut SchemeTable,
        source_row: usize,
        skipped: Option<usize>,
    ) -> Result<usize, SceneError> {
        let row = self.entities.len();
        if !self.scheme.is_empty() {
            self.matrix.push_default_row()?;
            match skipped {
                Some(skipped) => self.matrix.move_row_filtered(
                    row,
                    &mut source.matrix,
                    source_row,
                    |_, column| column == skipped,
                )?,
                None => self
                    .matrix
                    .move_row_matched(row, &mut source.matrix, source_row)?,
            }
        }
        Ok(row)
    }

    fn finish_splice(
        &mut self,
        source: &mut SchemeTable,
        source_row: usize,
        row: usize,
        index: &mut EntityIndex,
    ) {
        let entity = source.entities[source_row];
        source.matrix.swap_remove_row(source_row);
        source.entities.swap_remove(source_row);
        self.entities.push(entity);
        index.set(entity, EntityLocation { table: self.id, row });
        if source_row < source.entities.len() {
            index.set_row(source.entities[source_row], source_row);
        }
    }

    /// Replaces this table's column layout (types only, no data) with a copy
    /// of `model`'s. Only meaningful while the table is empty, before its
    /// first splice.
    pub(crate) fn copy_component_types(&mut self, model: &SchemeTable) {
        debug_assert!(self.entities.is_empty());
        self.matrix = model.matrix.clone_layout();
        self.scheme = model.scheme.clone();
    }

    /// Adds an empty column of `T` to the layout.
    pub(crate) fn add_column<T: Component>(&mut self) -> Result<(), SceneError> {
        self.scheme.insert(T::component_type_id())?;
        self.matrix.push_column(Box::new(TypedColumn::<T>::new()));
        Ok(())
    }

    /// Adds an empty column described by registry metadata.
    pub(crate) fn add_column_meta(&mut self, meta: &ComponentMeta) -> Result<(), SceneError> {
        self.scheme.insert(meta.type_id)?;
        self.matrix.push_column((meta.new_column)());
        Ok(())
    }

    /// Removes the column at `ordinal` of the scheme, discarding its data.
    pub(crate) fn remove_column_at(&mut self, ordinal: usize) -> Result<(), SceneError> {
        let registration = self.matrix.type_order()[ordinal].1;
        self.scheme.remove_at(ordinal)?;
        self.matrix.remove_column(registration);
        Ok(())
    }

    /// Re-homes this table under a new id, re-pointing every entity's
    /// location at it. Used when a scene adopts another scene's table.
    pub(crate) fn adopt(&mut self, id: TableId, index: &mut EntityIndex) {
        self.id = id;
        for (row, &entity) in self.entities.iter().enumerate() {
            index.set(entity, EntityLocation { table: id, row });
        }
    }

    /// Removes every entity, keeping the column layout.
    pub(crate) fn clear(&mut self, index: &mut EntityIndex) {
        for &entity in &self.entities {
            index.remove(entity);
        }
        self.matrix.clear_rows();
        self.entities.clear();
    }
}

impl std::fmt::Debug for SchemeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeTable")
            .field("id", &self.id)
            .field("scheme", &self.scheme)
            .field("entities", &self.entities.len())
            .finish()
    }
}
