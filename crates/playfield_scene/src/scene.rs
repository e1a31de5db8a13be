//! The scene — registry of archetype tables.
//!
//! A [`Scene`] owns one [`SchemeTable`] per distinct scheme, in
//! first-creation order, plus the entity id allocator and the location
//! index. It orchestrates scheme changes: adding or removing a component
//! computes the target scheme, finds or creates its table (cloning the
//! column layout without data), and splices the entity's row across.
//!
//! Tables are never deleted when they become empty — an entity oscillating
//! between two schemes would otherwise rebuild its tables on every hop.

use std::collections::HashMap;

use playfield_component::{Component, ComponentRegistry, Scheme};
use tracing::{debug, trace};

use crate::bundle::Bundle;
use crate::entity::{EntityAllocator, EntityId, EntityIndex, EntityLocation};
use crate::error::SceneError;
use crate::matrix::ComponentMatrix;
use crate::table::{SchemeTable, TableId};

/// Exclusive owner of a set of archetype tables and their entities.
#[derive(Debug, Default)]
pub struct Scene {
    /// Tables in creation order; `TableId` indexes into this.
    tables: Vec<SchemeTable>,
    by_scheme: HashMap<Scheme, TableId>,
    index: EntityIndex,
    allocator: EntityAllocator,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity holding `bundle`'s component values, lazily
    /// creating or reusing the table for that exact type set. The bundle may
    /// be empty.
    pub fn create_entity<B: Bundle>(&mut self, bundle: B) -> Result<EntityId, SceneError> {
        let scheme = B::scheme()?;
        let table = match self.by_scheme.get(&scheme) {
            Some(&id) => id,
            None => {
                let id = TableId(self.tables.len() as u32);
                let mut matrix = ComponentMatrix::new();
                for column in B::columns() {
                    matrix.push_column(column);
                }
                debug!(table = id.0, components = scheme.len(), "created scheme table");
                self.tables.push(SchemeTable::new(id, scheme.clone(), matrix));
                self.by_scheme.insert(scheme, id);
                id
            }
        };
        let entity = self.allocator.allocate();
        self.tables[table.index()].create(entity, &mut self.index, bundle)?;
        Ok(entity)
    }

    /// Destroys an entity. Its id goes stale; later use reports
    /// [`SceneError::UnknownEntity`]. The table persists even when this was
    /// its last row.
    pub fn delete_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
        let location = self.lookup(entity)?;
        self.tables[location.table.index()].destroy(location.row, &mut self.index);
        trace!(entity = entity.id(), "entity destroyed");
        Ok(())
    }

    /// Gives `entity` a `T` it does not have yet, splicing its row into the
    /// table for the extended scheme.
    pub fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<(), SceneError> {
        let location = self.lookup(entity)?;
        let source = location.table;
        let ty = T::component_type_id();
        if self.tables[source.index()].scheme().contains(ty) {
            return Err(SceneError::DuplicateComponent(T::type_name()));
        }
        let mut extended = self.tables[source.index()].scheme().clone();
        extended.insert(ty)?;
        let target = self.ensure_extended(source, extended, |table| table.add_column::<T>())?;
        let (source_table, target_table) = two_tables_mut(&mut self.tables, source, target);
        target_table.splice_extend(source_table, location.row, value, &mut self.index)?;
        trace!(entity = entity.id(), component = T::type_name(), "component added");
        Ok(())
    }

    /// Registry-driven variant of [`Scene::add_component`]: attaches a
    /// default-constructed component looked up by class name. The spliced
    /// row's new column keeps the default value the splice pushed.
    pub fn add_component_by_name(
        &mut self,
        registry: &ComponentRegistry,
        entity: EntityId,
        name: &str,
    ) -> Result<(), SceneError> {
        let meta = registry.meta_by_name(name)?;
        let location = self.lookup(entity)?;
        let source = location.table;
        if self.tables[source.index()].scheme().contains(meta.type_id) {
            return Err(SceneError::DuplicateComponent(meta.name));
        }
        let mut extended = self.tables[source.index()].scheme().clone();
        extended.insert(meta.type_id)?;
        let target = self.ensure_extended(source, extended, |table| table.add_column_meta(meta))?;
        let (source_table, target_table) = two_tables_mut(&mut self.tables, source, target);
        target_table.splice_matched(source_table, location.row, &mut self.index)?;
        trace!(entity = entity.id(), component = meta.name, "component added by name");
        Ok(())
    }

    /// Strips `T` from `entity`, discarding the component's data.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<(), SceneError> {
        let location = self.lookup(entity)?;
        let ordinal = self.tables[location.table.index()]
            .scheme()
            .index_of(T::component_type_id())
            .ok_or(SceneError::ComponentMissing(T::type_name()))?;
        self.remove_component_at(entity, ordinal)
    }

    /// Strips the component at `ordinal` of the entity's scheme, discarding
    /// its data. The row moves to the table for the reduced scheme.
    pub fn remove_component_at(
        &mut self,
        entity: EntityId,
        ordinal: usize,
    ) -> Result<(), SceneError> {
        let location = self.lookup(entity)?;
        let source = location.table;
        let mut reduced = self.tables[source.index()].scheme().clone();
        reduced.remove_at(ordinal)?;
        let target = self.ensure_reduced(source, reduced, ordinal)?;
        let (source_table, target_table) = two_tables_mut(&mut self.tables, source, target);
        target_table.splice_reduce(source_table, location.row, ordinal, &mut self.index)?;
        trace!(entity = entity.id(), ordinal, "component removed");
        Ok(())
    }

    /// Typed access to one of an entity's components.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<&T, SceneError> {
        let location = self.lookup(entity)?;
        self.tables[location.table.index()].component::<T>(location.row)
    }

    /// Mutable variant of [`Scene::get_component`].
    pub fn get_component_mut<T: Component>(
        &mut self,
        entity: EntityId,
    ) -> Result<&mut T, SceneError> {
        let location = self.lookup(entity)?;
        self.tables[location.table.index()].component_mut::<T>(location.row)
    }

    /// Returns `true` if the entity's scheme contains `T`.
    pub fn has_component<T: Component>(&self, entity: EntityId) -> Result<bool, SceneError> {
        let location = self.lookup(entity)?;
        Ok(self.tables[location.table.index()]
            .scheme()
            .contains(T::component_type_id()))
    }

    /// The scheme the entity currently has.
    pub fn scheme_of(&self, entity: EntityId) -> Result<&Scheme, SceneError> {
        let location = self.lookup(entity)?;
        Ok(self.tables[location.table.index()].scheme())
    }

    /// The entity's current `(table, row)`, if it is alive.
    #[must_use]
    pub fn location(&self, entity: EntityId) -> Option<EntityLocation> {
        self.index.get(entity)
    }

    /// Returns `true` if the entity is alive in this scene.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.contains(entity)
    }

    /// Number of live entities across all tables.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    /// Iterates every live entity, table by table in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.tables
            .iter()
            .flat_map(|table| table.entities().iter().copied())
    }

    /// All tables in creation order, including empty ones.
    #[must_use]
    pub fn tables(&self) -> &[SchemeTable] {
        &self.tables
    }

    /// The table with the given id.
    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&SchemeTable> {
        self.tables.get(id.index())
    }

    /// Lazily iterates every table whose scheme is a superset of `subset`,
    /// in first-creation order. An empty subset matches every table. This is
    /// how a system declares "I need {A, B}" and receives each matching
    /// archetype, possibly with more columns.
    pub fn tables_matching<'a>(
        &'a self,
        subset: &'a Scheme,
    ) -> impl Iterator<Item = &'a SchemeTable> {
        self.tables
            .iter()
            .filter(move |table| subset.is_subset_of(table.scheme()))
    }

    /// Mutable variant of [`Scene::tables_matching`].
    pub fn tables_matching_mut<'a>(
        &'a mut self,
        subset: &'a Scheme,
    ) -> impl Iterator<Item = &'a mut SchemeTable> {
        self.tables
            .iter_mut()
            .filter(move |table| subset.is_subset_of(table.scheme()))
    }

    /// Combines `other` into this scene: tables of equal scheme are
    /// appended, the rest are adopted wholesale. `other` is consumed.
    ///
    /// Fails with [`SceneError::EntityCollision`] — before mutating either
    /// scene — if both track the same entity id.
    pub fn merge(&mut self, mut other: Scene) -> Result<(), SceneError> {
        for entity in other.index.entities() {
            if self.index.contains(entity) {
                return Err(SceneError::EntityCollision(entity));
            }
        }
        self.allocator.advance_past(&other.allocator);
        for mut table in other.tables.drain(..) {
            match self.by_scheme.get(table.scheme()) {
                Some(&id) => {
                    self.tables[id.index()].append_from(&mut table, &mut self.index)?;
                }
                None => {
                    let id = TableId(self.tables.len() as u32);
                    table.adopt(id, &mut self.index);
                    debug!(table = id.0, components = table.scheme().len(), "adopted scheme table");
                    self.by_scheme.insert(table.scheme().clone(), id);
                    self.tables.push(table);
                }
            }
        }
        Ok(())
    }

    /// Destroys every entity, keeping all tables and their layouts.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.clear(&mut self.index);
        }
    }

    fn lookup(&self, entity: EntityId) -> Result<EntityLocation, SceneError> {
        self.index
            .get(entity)
            .ok_or(SceneError::UnknownEntity(entity))
    }

    /// Finds the table for `extended`, or creates it by cloning the source
    /// layout and applying `extend` (which must add exactly the new column).
    fn ensure_extended(
        &mut self,
        source: TableId,
        extended: Scheme,
        extend: impl FnOnce(&mut SchemeTable) -> Result<(), SceneError>,
    ) -> Result<TableId, SceneError> {
        if let Some(&id) = self.by_scheme.get(&extended) {
            return Ok(id);
        }
        let id = TableId(self.tables.len() as u32);
        let mut table = SchemeTable::new(id, Scheme::new(), ComponentMatrix::new());
        table.copy_component_types(&self.tables[source.index()]);
        extend(&mut table)?;
        debug_assert_eq!(*table.scheme(), extended);
        debug!(table = id.0, components = extended.len(), "created scheme table");
        self.by_scheme.insert(extended, id);
        self.tables.push(table);
        Ok(id)
    }

    /// Finds the table for `reduced`, or creates it by cloning the source
    /// layout minus the column at `ordinal`.
    fn ensure_reduced(
        &mut self,
        source: TableId,
        reduced: Scheme,
        ordinal: usize,
    ) -> Result<TableId, SceneError> {
        if let Some(&id) = self.by_scheme.get(&reduced) {
            return Ok(id);
        }
        let id = TableId(self.tables.len() as u32);
        let mut table = SchemeTable::new(id, Scheme::new(), ComponentMatrix::new());
        table.copy_component_types(&self.tables[source.index()]);
        table.remove_column_at(ordinal)?;
        debug_assert_eq!(*table.scheme(), reduced);
        debug!(table = id.0, components = reduced.len(), "created scheme table");
        self.by_scheme.insert(reduced, id);
        self.tables.push(table);
        Ok(id)
    }
}

/// Splits two distinct tables out of the slice for a splice.
fn two_tables_mut(
    tables: &mut [SchemeTable],
    a: TableId,
    b: TableId,
) -> (&mut SchemeTable, &mut SchemeTable) {
    let (a, b) = (a.index(), b.index());
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = tables.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = tables.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use playfield_component::ComponentTypeId;

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Velocity {
        x: f32,
        y: f32,
    }

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Health(i32);

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    fn pos(x: f32, y: f32) -> Position {
        Position { x, y }
    }

    fn vel(x: f32, y: f32) -> Velocity {
        Velocity { x, y }
    }

    /// Every table's entity count equals its matrix row count, and every
    /// tracked location matches reality.
    fn assert_consistent(scene: &Scene) {
        for table in scene.tables() {
            if table.matrix().column_count() > 0 {
                assert_eq!(table.matrix().row_count(), table.len());
            }
            for (row, &entity) in table.entities().iter().enumerate() {
                let location = scene.location(entity).expect("entity not tracked");
                assert_eq!(location.table, table.id());
                assert_eq!(location.row, row);
            }
        }
    }

    #[test]
    fn test_create_and_read_back() {
        let mut scene = Scene::new();
        let entity = scene
            .create_entity((pos(1.0, 2.0), vel(0.1, 0.2)))
            .unwrap();

        assert!(scene.contains(entity));
        assert_eq!(scene.entity_count(), 1);
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(1.0, 2.0));
        assert_eq!(scene.get_component::<Velocity>(entity).unwrap(), &vel(0.1, 0.2));
        assert_consistent(&scene);
    }

    #[test]
    fn test_same_type_set_shares_a_table() {
        let mut scene = Scene::new();
        scene.create_entity((pos(1.0, 0.0), vel(0.0, 0.0))).unwrap();
        scene.create_entity((vel(1.0, 1.0), pos(2.0, 0.0))).unwrap();

        assert_eq!(scene.tables().len(), 1);
        assert_eq!(scene.tables()[0].len(), 2);
        assert_consistent(&scene);
    }

    #[test]
    fn test_empty_bundle_entity() {
        let mut scene = Scene::new();
        let entity = scene.create_entity(()).unwrap();

        assert!(scene.contains(entity));
        assert!(scene.scheme_of(entity).unwrap().is_empty());
        assert!(!scene.has_component::<Position>(entity).unwrap());

        scene.add_component(entity, pos(3.0, 4.0)).unwrap();
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(3.0, 4.0));
        assert_consistent(&scene);
    }

    // Scenario A of the storage contract.
    #[test]
    fn test_add_component_extends_scheme() {
        let mut scene = Scene::new();
        let entity = scene
            .create_entity((pos(1.0, 2.0), vel(3.0, 4.0)))
            .unwrap();

        scene.add_component(entity, Health(100)).unwrap();

        let scheme = scene.scheme_of(entity).unwrap();
        assert_eq!(scheme.len(), 3);
        assert!(scheme.contains(ComponentTypeId::of::<Health>()));
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(1.0, 2.0));
        assert_eq!(scene.get_component::<Velocity>(entity).unwrap(), &vel(3.0, 4.0));
        assert_eq!(scene.get_component::<Health>(entity).unwrap(), &Health(100));
        assert_consistent(&scene);
    }

    #[test]
    fn test_add_present_component_is_rejected() {
        let mut scene = Scene::new();
        let entity = scene.create_entity((pos(0.0, 0.0),)).unwrap();

        let result = scene.add_component(entity, pos(1.0, 1.0));
        assert!(matches!(
            result,
            Err(SceneError::DuplicateComponent("Position"))
        ));
        // Nothing moved.
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(0.0, 0.0));
        assert_consistent(&scene);
    }

    // Scenario B of the storage contract.
    #[test]
    fn test_destroy_swaps_last_row_in() {
        let mut scene = Scene::new();
        let a = scene.create_entity((pos(1.0, 0.0),)).unwrap();
        let b = scene.create_entity((pos(2.0, 0.0),)).unwrap();

        scene.delete_entity(a).unwrap();

        assert!(!scene.contains(a));
        assert_eq!(scene.location(b).unwrap().row, 0);
        assert_eq!(scene.get_component::<Position>(b).unwrap(), &pos(2.0, 0.0));
        assert_eq!(scene.tables()[0].len(), 1);
        assert_consistent(&scene);

        assert!(matches!(
            scene.get_component::<Position>(a),
            Err(SceneError::UnknownEntity(_))
        ));
    }

    // Scenario C of the storage contract.
    #[test]
    fn test_remove_component_reduces_scheme_and_keeps_empty_table() {
        let mut scene = Scene::new();
        let entity = scene
            .create_entity((pos(1.0, 2.0), vel(3.0, 4.0)))
            .unwrap();
        scene.add_component(entity, Health(50)).unwrap();
        let tables_before = scene.tables().len();

        scene.remove_component::<Velocity>(entity).unwrap();

        let scheme = scene.scheme_of(entity).unwrap();
        assert_eq!(scheme.len(), 2);
        assert!(!scheme.contains(ComponentTypeId::of::<Velocity>()));
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(1.0, 2.0));
        assert_eq!(scene.get_component::<Health>(entity).unwrap(), &Health(50));

        // The vacated three-component table persists, empty.
        let three = scene
            .tables()
            .iter()
            .find(|t| t.scheme().len() == 3)
            .unwrap();
        assert_eq!(three.len(), 0);
        assert!(scene.tables().len() >= tables_before);
        assert_consistent(&scene);
    }

    #[test]
    fn test_add_then_remove_restores_scheme_and_values() {
        let mut scene = Scene::new();
        let entity = scene
            .create_entity((pos(7.0, 8.0), vel(9.0, 10.0)))
            .unwrap();
        let before = scene.scheme_of(entity).unwrap().clone();

        scene.add_component(entity, Health(1)).unwrap();
        scene.remove_component::<Health>(entity).unwrap();

        assert_eq!(scene.scheme_of(entity).unwrap(), &before);
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(7.0, 8.0));
        assert_eq!(scene.get_component::<Velocity>(entity).unwrap(), &vel(9.0, 10.0));
        assert_consistent(&scene);
    }

    #[test]
    fn test_remove_component_at_by_ordinal() {
        let mut scene = Scene::new();
        let entity = scene
            .create_entity((pos(1.0, 1.0), vel(2.0, 2.0)))
            .unwrap();

        let ordinal = scene
            .scheme_of(entity)
            .unwrap()
            .index_of(ComponentTypeId::of::<Velocity>())
            .unwrap();
        scene.remove_component_at(entity, ordinal).unwrap();

        assert!(!scene.has_component::<Velocity>(entity).unwrap());
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(1.0, 1.0));
        assert_consistent(&scene);
    }

    #[test]
    fn test_remove_missing_component_is_rejected() {
        let mut scene = Scene::new();
        let entity = scene.create_entity((pos(0.0, 0.0),)).unwrap();

        assert!(matches!(
            scene.remove_component::<Health>(entity),
            Err(SceneError::ComponentMissing("Health"))
        ));
        assert!(matches!(
            scene.remove_component_at(entity, 5),
            Err(SceneError::Component(_))
        ));
    }

    #[test]
    fn test_oscillating_entity_reuses_tables() {
        let mut scene = Scene::new();
        let entity = scene.create_entity((pos(1.0, 1.0),)).unwrap();

        for generation in 0..3 {
            scene.add_component(entity, Health(generation)).unwrap();
            scene.remove_component::<Health>(entity).unwrap();
        }

        // Two tables total: {Position} and {Position, Health}.
        assert_eq!(scene.tables().len(), 2);
        assert_eq!(scene.get_component::<Position>(entity).unwrap(), &pos(1.0, 1.0));
        assert_consistent(&scene);
    }

    #[test]
    fn test_get_component_mut_writes_through() {
        let mut scene = Scene::new();
        let entity = scene.create_entity((Health(10),)).unwrap();

        scene.get_component_mut::<Health>(entity).unwrap().0 += 5;
        assert_eq!(scene.get_component::<Health>(entity).unwrap(), &Health(15));
    }

    #[test]
    fn test_tables_matching_superset_in_creation_order() {
        let mut scene = Scene::new();
        scene.create_entity((pos(0.0, 0.0), vel(0.0, 0.0), Health(1))).unwrap();
        scene.create_entity((pos(0.0, 0.0), vel(0.0, 0.0))).unwrap();
        scene.create_entity((pos(0.0, 0.0), Health(2))).unwrap();

        let needs_pos_vel =
            Scheme::from_types([ComponentTypeId::of::<Position>(), ComponentTypeId::of::<Velocity>()])
                .unwrap();
        let matched: Vec<_> = scene
            .tables_matching(&needs_pos_vel)
            .map(|t| t.id())
            .collect();
        assert_eq!(matched, vec![TableId(0), TableId(1)]);

        let needs_pos = Scheme::from_types([ComponentTypeId::of::<Position>()]).unwrap();
        assert_eq!(scene.tables_matching(&needs_pos).count(), 3);

        // The empty scheme matches every table.
        assert_eq!(scene.tables_matching(&Scheme::new()).count(), 3);

        let unrelated = Scheme::from_types([ComponentTypeId::from_name("Nothing")]).unwrap();
        assert_eq!(scene.tables_matching(&unrelated).count(), 0);
    }

    #[test]
    fn test_tables_matching_mut_allows_system_style_iteration() {
        let mut scene = Scene::new();
        scene.create_entity((pos(1.0, 0.0), vel(1.0, 0.0))).unwrap();
        scene.create_entity((pos(2.0, 0.0), vel(2.0, 0.0), Health(1))).unwrap();

        let needs = Scheme::from_types([
            ComponentTypeId::of::<Position>(),
            ComponentTypeId::of::<Velocity>(),
        ])
        .unwrap();

        for table in scene.tables_matching_mut(&needs) {
            let velocities: Vec<Velocity> = table.column::<Velocity>().unwrap().to_vec();
            let positions = table.column_mut::<Position>().unwrap();
            for (position, velocity) in positions.iter_mut().zip(velocities) {
                position.x += velocity.x;
                position.y += velocity.y;
            }
        }

        let mut xs: Vec<f32> = scene
            .entities()
            .map(|e| scene.get_component::<Position>(e).unwrap().x)
            .collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, vec![2.0, 4.0]);
    }

    #[test]
    fn test_merge_appends_and_adopts() {
        let mut target = Scene::new();
        let kept = target.create_entity((pos(1.0, 0.0),)).unwrap();

        let mut other = Scene::new();
        // Avoid id collisions with `target`'s allocations.
        other.allocator.advance_past(&target.allocator);
        let appended = other.create_entity((pos(2.0, 0.0),)).unwrap();
        let adopted = other.create_entity((pos(3.0, 0.0), Health(7))).unwrap();

        target.merge(other).unwrap();

        assert_eq!(target.entity_count(), 3);
        assert_eq!(target.get_component::<Position>(kept).unwrap(), &pos(1.0, 0.0));
        assert_eq!(target.get_component::<Position>(appended).unwrap(), &pos(2.0, 0.0));
        assert_eq!(target.get_component::<Position>(adopted).unwrap(), &pos(3.0, 0.0));
        assert_eq!(target.get_component::<Health>(adopted).unwrap(), &Health(7));
        // {Position} tables merged into one; {Position, Health} was adopted.
        assert_eq!(target.tables().len(), 2);
        assert_consistent(&target);

        // Ids allocated after the merge cannot collide with adopted ones.
        let fresh = target.create_entity(()).unwrap();
        assert!(fresh.id() > adopted.id());
    }

    #[test]
    fn test_merge_detects_id_collision() {
        let mut target = Scene::new();
        target.create_entity((pos(1.0, 0.0),)).unwrap();

        let mut other = Scene::new();
        other.create_entity((pos(2.0, 0.0),)).unwrap();

        // Both scenes allocated id 1.
        assert!(matches!(
            target.merge(other),
            Err(SceneError::EntityCollision(_))
        ));
        assert_eq!(target.entity_count(), 1);
    }

    #[test]
    fn test_add_component_by_name_uses_registry_default() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Health>().unwrap();

        let mut scene = Scene::new();
        let entity = scene.create_entity((pos(1.0, 1.0),)).unwrap();

        scene
            .add_component_by_name(&registry, entity, "Health")
            .unwrap();
        assert_eq!(scene.get_component::<Health>(entity).unwrap(), &Health(0));

        let unknown = scene.add_component_by_name(&registry, entity, "Mystery");
        assert!(matches!(unknown, Err(SceneError::Component(_))));
        let duplicate = scene.add_component_by_name(&registry, entity, "Health");
        assert!(matches!(duplicate, Err(SceneError::DuplicateComponent("Health"))));
        assert_consistent(&scene);
    }

    #[test]
    fn test_clear_keeps_tables() {
        let mut scene = Scene::new();
        scene.create_entity((pos(1.0, 0.0),)).unwrap();
        scene.create_entity((pos(2.0, 0.0), Health(1))).unwrap();

        scene.clear();

        assert_eq!(scene.entity_count(), 0);
        assert_eq!(scene.tables().len(), 2);
        assert!(scene.tables().iter().all(SchemeTable::is_empty));
    }

    #[test]
    fn test_row_count_invariant_over_random_mutations() {
        let mut scene = Scene::new();
        let mut alive = Vec::new();

        for i in 0..12 {
            let entity = if i % 3 == 0 {
                scene.create_entity((pos(i as f32, 0.0),)).unwrap()
            } else {
                scene
                    .create_entity((pos(i as f32, 0.0), vel(1.0, 1.0)))
                    .unwrap()
            };
            alive.push(entity);
        }

        for (step, &entity) in alive.clone().iter().enumerate() {
            match step % 4 {
                0 => {
                    scene.delete_entity(entity).unwrap();
                    alive.retain(|&e| e != entity);
                }
                1 => scene.add_component(entity, Health(step as i32)).unwrap(),
                2 => {
                    if scene.has_component::<Velocity>(entity).unwrap() {
                        scene.remove_component::<Velocity>(entity).unwrap();
                    }
                }
                _ => {}
            }
            assert_consistent(&scene);
        }

        assert_eq!(scene.entity_count(), alive.len());
    }
}
