//! Component bundles — typed value sets for entity creation.
//!
//! A [`Bundle`] is a static list of component values, typically a tuple.
//! It knows the scheme its types form, can lay out the matching columns for
//! a brand-new table, and writes its values into an existing row by looking
//! columns up by type id — so `(Position, Velocity)` and
//! `(Velocity, Position)` land in the same table.

use playfield_component::{Column, Component, ComponentError, Scheme, TypedColumn};

use crate::error::SceneError;
use crate::matrix::ComponentMatrix;

/// A static set of component values that can populate one row.
pub trait Bundle {
    /// The scheme formed by this bundle's component types.
    ///
    /// Fails with a duplicate-type error if the same component type appears
    /// twice in the bundle.
    fn scheme() -> Result<Scheme, ComponentError>;

    /// Fresh, empty columns for this bundle's types, in bundle order.
    fn columns() -> Vec<Box<dyn Column>>;

    /// Writes the values into `row` of `matrix`, locating each column by
    /// type id.
    fn write_into(self, matrix: &mut ComponentMatrix, row: usize) -> Result<(), SceneError>;
}

/// The empty bundle: entities with no components at all.
impl Bundle for () {
    fn scheme() -> Result<Scheme, ComponentError> {
        Ok(Scheme::new())
    }

    fn columns() -> Vec<Box<dyn Column>> {
        Vec::new()
    }

    fn write_into(self, _matrix: &mut ComponentMatrix, _row: usize) -> Result<(), SceneError> {
        Ok(())
    }
}

macro_rules! impl_bundle {
    ($($ty:ident),+) => {
        impl<$($ty: Component),+> Bundle for ($($ty,)+) {
            fn scheme() -> Result<Scheme, ComponentError> {
                Scheme::from_types([$($ty::component_type_id()),+])
            }

            fn columns() -> Vec<Box<dyn Column>> {
                vec![$(Box::new(TypedColumn::<$ty>::new())),+]
            }

            #[allow(non_snake_case)]
            fn write_into(self, matrix: &mut ComponentMatrix, row: usize) -> Result<(), SceneError> {
                let ($($ty,)+) = self;
                $(
                    let column = matrix
                        .column_index_of(<$ty as Component>::component_type_id())
                        .ok_or(SceneError::ComponentMissing(<$ty as Component>::type_name()))?;
                    matrix.write(column, row, $ty)?;
                )+
                Ok(())
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);
