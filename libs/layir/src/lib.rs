//! A minimal hierarchical layout database.
//!
//! Cells own shapes and instances of other cells. Instances may be regular
//! arrays described by a [`Repetition`], which keeps large fills compact.

pub mod id;

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Deref;

use crate::id::Id;
use arcstr::ArcStr;
use geometry::prelude::{Bbox, BoundingUnion, Point, Polygon, Rect, Region, Transformation};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub struct Cells;

// The reason this uses [`Cells`] instead of [`Cell`]
// is because `Cell` has a generic type parameter.
pub type CellId = Id<Cells>;
pub type InstanceId = Id<Instance>;

/// Errors raised while querying or building a library.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayirError {
    /// No cell with the given ID exists.
    #[error("no cell with ID {0:?}")]
    CellNotFound(CellId),
    /// An instance refers to a cell outside the library.
    #[error("instance `{instance}` in cell `{cell}` refers to a missing cell")]
    MissingChild { cell: ArcStr, instance: ArcStr },
}

pub type LayirResult<T> = Result<T, LayirError>;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryBuilder<L> {
    cell_id: CellId,
    cells: IndexMap<CellId, Cell<L>>,
    name_map: HashMap<ArcStr, CellId>,
}

pub struct Library<L>(LibraryBuilder<L>);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Cell<L> {
    name: ArcStr,
    instance_id: InstanceId,
    instances: IndexMap<InstanceId, Instance>,
    instance_name_map: HashMap<ArcStr, InstanceId>,
    shapes: Vec<Shape<L>>,
}

/// A primitive layout shape consisting of a layer and a geometric shape.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Shape<L> {
    layer: L,
    shape: geometry::shape::Shape,
}

/// A regular two-dimensional array of placements.
///
/// Element `(i, j)` with `i < na` and `j < nb` is displaced by `i * a + j * b`
/// from the instance's transformation.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Repetition {
    a: Point,
    na: u64,
    b: Point,
    nb: u64,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    child: CellId,
    name: ArcStr,
    trans: Transformation,
    repetition: Option<Repetition>,
}

impl<L> Default for LibraryBuilder<L> {
    fn default() -> Self {
        Self {
            cell_id: Id::new(),
            name_map: Default::default(),
            cells: Default::default(),
        }
    }
}

impl<L> LibraryBuilder<L> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a cell, renaming it with a `_<n>` suffix if its name is taken.
    pub fn add_cell(&mut self, mut cell: Cell<L>) -> CellId {
        let id = self.cell_id.alloc();
        if self.name_map.contains_key(&cell.name) {
            let base = cell.name.clone();
            let mut n = 1;
            while self
                .name_map
                .contains_key(&arcstr::format!("{}_{}", base, n))
            {
                n += 1;
            }
            cell.name = arcstr::format!("{}_{}", base, n);
            tracing::debug!(requested = %base, assigned = %cell.name, "renamed duplicate cell");
        }
        self.name_map.insert(cell.name.clone(), id);
        self.cells.insert(id, cell);
        id
    }

    /// Gets the cell with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no such cell exists.
    pub fn cell(&self, id: CellId) -> &Cell<L> {
        self.cells.get(&id).unwrap()
    }

    pub fn try_cell(&self, id: CellId) -> Option<&Cell<L>> {
        self.cells.get(&id)
    }

    /// Gets the cell with the given ID for modification.
    ///
    /// # Panics
    ///
    /// Panics if no such cell exists.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell<L> {
        self.cells.get_mut(&id).unwrap()
    }

    pub fn try_cell_mut(&mut self, id: CellId) -> LayirResult<&mut Cell<L>> {
        self.cells
            .get_mut(&id)
            .ok_or(LayirError::CellNotFound(id))
    }

    pub fn cell_named(&self, name: &str) -> &Cell<L> {
        self.cell(*self.name_map.get(name).unwrap())
    }

    pub fn try_cell_named(&self, name: &str) -> Option<&Cell<L>> {
        self.try_cell(*self.name_map.get(name)?)
    }

    /// Gets the cell ID corresponding to the given name.
    pub fn try_cell_id_named(&self, name: &str) -> Option<CellId> {
        self.name_map.get(name).copied()
    }

    /// Iterates over the `(id, cell)` pairs in this library.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell<L>)> {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    /// Returns cell IDs in topological order.
    pub fn topological_order(&self) -> Vec<CellId> {
        let mut state = IndexSet::new();
        for (cell, _) in self.cells() {
            self.dfs_postorder(cell, &mut state);
        }
        state.into_iter().collect()
    }

    fn dfs_postorder(&self, id: CellId, state: &mut IndexSet<CellId>) {
        if state.contains(&id) {
            return;
        }

        let Some(cell) = self.try_cell(id) else {
            return;
        };
        for (_, inst) in cell.instances() {
            self.dfs_postorder(inst.child(), state);
        }
        state.insert(id);
    }

    /// The list of cell IDs instantiated by the given root cells.
    ///
    /// The list returned will include the root cell IDs.
    pub fn cells_used_by(&self, roots: impl IntoIterator<Item = CellId>) -> Vec<CellId> {
        let mut stack = VecDeque::new();
        let mut visited = HashSet::new();
        for root in roots {
            stack.push_back(root);
        }

        while let Some(id) = stack.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(cell) = self.try_cell(id) {
                for (_, inst) in cell.instances() {
                    stack.push_back(inst.child);
                }
            }
        }

        visited.drain().collect()
    }

    /// Finalizes the library, checking that every instance refers to an existing cell.
    pub fn build(self) -> LayirResult<Library<L>> {
        for (_, cell) in self.cells() {
            for (_, inst) in cell.instances() {
                if !self.cells.contains_key(&inst.child) {
                    tracing::error!(cell = %cell.name, instance = %inst.name, "dangling instance");
                    return Err(LayirError::MissingChild {
                        cell: cell.name.clone(),
                        instance: inst.name.clone(),
                    });
                }
            }
        }
        Ok(Library(self))
    }
}

impl<L> Deref for Library<L> {
    type Target = LibraryBuilder<L>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<L> Cell<L> {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            instance_id: Id::new(),
            instances: Default::default(),
            instance_name_map: Default::default(),
            shapes: Default::default(),
        }
    }

    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Get the instance associated with the given ID.
    #[inline]
    pub fn try_instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Gets the instance with the given name.
    pub fn try_instance_named(&self, name: &str) -> Option<&Instance> {
        self.try_instance(*self.instance_name_map.get(name)?)
    }

    /// Add the given instance to the cell.
    #[inline]
    pub fn add_instance(&mut self, instance: Instance) -> InstanceId {
        let id = self.instance_id.alloc();
        self.instance_name_map.insert(instance.name.clone(), id);
        self.instances.insert(id, instance);
        id
    }

    /// Iterate over the instances of this cell.
    #[inline]
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances.iter().map(|x| (*x.0, x.1))
    }

    /// The number of instance records, counting each array once.
    #[inline]
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// The number of placed child cells, with arrays multiplied out.
    pub fn flat_instance_count(&self) -> u64 {
        self.instances.values().map(Instance::len).sum()
    }

    pub fn add_shape(&mut self, shape: Shape<L>) {
        self.shapes.push(shape)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape<L>> {
        self.shapes.iter()
    }

    /// The unmerged region drawn on `layer` in this cell, excluding instances.
    pub fn layer_region(&self, layer: &L) -> Region
    where
        L: PartialEq,
    {
        self.shapes
            .iter()
            .filter(|s| &s.layer == layer)
            .map(|s| Polygon::from(&s.shape))
            .collect()
    }
}

impl<L> Bbox for Cell<L> {
    /// The bounding box of the cell's own shapes.
    fn bbox(&self) -> Option<Rect> {
        let mut bbox = None;
        for shape in &self.shapes {
            bbox = bbox.bounding_union(&shape.shape.bbox());
        }
        bbox
    }
}

impl<L> Shape<L> {
    #[inline]
    pub fn new(layer: L, shape: impl Into<geometry::shape::Shape>) -> Self {
        Self {
            layer,
            shape: shape.into(),
        }
    }

    #[inline]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    #[inline]
    pub fn shape(&self) -> &geometry::shape::Shape {
        &self.shape
    }
}

impl Repetition {
    /// Creates an `na x nb` array with displacement vectors `a` and `b`.
    pub fn new(a: Point, na: u64, b: Point, nb: u64) -> Self {
        Self { a, na, b, nb }
    }

    #[inline]
    pub fn a(&self) -> Point {
        self.a
    }

    #[inline]
    pub fn na(&self) -> u64 {
        self.na
    }

    #[inline]
    pub fn b(&self) -> Point {
        self.b
    }

    #[inline]
    pub fn nb(&self) -> u64 {
        self.nb
    }

    /// The displacement of every array element, `a` index varying fastest.
    pub fn offsets(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.nb).flat_map(move |j| {
            (0..self.na).map(move |i| self.a * i as i64 + self.b * j as i64)
        })
    }
}

impl Instance {
    pub fn new(child: CellId, name: impl Into<ArcStr>) -> Self {
        Self {
            child,
            name: name.into(),
            trans: Default::default(),
            repetition: None,
        }
    }

    pub fn with_transformation(
        child: CellId,
        name: impl Into<ArcStr>,
        transformation: impl Into<Transformation>,
    ) -> Self {
        Self {
            child,
            name: name.into(),
            trans: transformation.into(),
            repetition: None,
        }
    }

    /// Creates a regular array of `child` placements.
    pub fn array(
        child: CellId,
        name: impl Into<ArcStr>,
        transformation: impl Into<Transformation>,
        repetition: Repetition,
    ) -> Self {
        Self {
            child,
            name: name.into(),
            trans: transformation.into(),
            repetition: Some(repetition),
        }
    }

    #[inline]
    pub fn child(&self) -> CellId {
        self.child
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn transformation(&self) -> Transformation {
        self.trans
    }

    #[inline]
    pub fn repetition(&self) -> Option<&Repetition> {
        self.repetition.as_ref()
    }

    /// The number of placed child cells.
    pub fn len(&self) -> u64 {
        self.repetition.map_or(1, |r| r.na * r.nb)
    }

    /// Returns true if the instance is an empty array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The child origin of every placed element.
    pub fn origins(&self) -> Vec<Point> {
        let base = self.trans.offset_point();
        match &self.repetition {
            Some(rep) => rep.offsets().map(|d| base + d).collect(),
            None => vec![base],
        }
    }
}

#[cfg(test)]
mod tests;
