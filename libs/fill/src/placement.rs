//! Placement descriptors and their insertion into a target cell.

use std::sync::Mutex;

use geometry::prelude::{Point, Rect, Transformation, Translate};
use layir::{CellId, Instance, LibraryBuilder, Repetition};
use serde::{Deserialize, Serialize};

use crate::error::{FillError, FillResult};

/// One single or arrayed placement of a fill cell.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    cell: CellId,
    trans: Transformation,
    repetition: Option<Repetition>,
}

impl Placement {
    /// Places `cell` once.
    pub fn single(cell: CellId, trans: Transformation) -> Self {
        Self {
            cell,
            trans,
            repetition: None,
        }
    }

    /// Places `cell` as a regular array.
    pub fn array(cell: CellId, trans: Transformation, repetition: Repetition) -> Self {
        Self {
            cell,
            trans,
            repetition: Some(repetition),
        }
    }

    #[inline]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    #[inline]
    pub fn transformation(&self) -> Transformation {
        self.trans
    }

    #[inline]
    pub fn repetition(&self) -> Option<&Repetition> {
        self.repetition.as_ref()
    }

    /// The number of cells placed.
    pub fn instance_count(&self) -> u64 {
        self.repetition.map_or(1, |r| r.na() * r.nb())
    }

    /// The origin of every placed cell.
    pub fn origins(&self) -> Vec<Point> {
        let base = self.trans.offset_point();
        match &self.repetition {
            Some(rep) => rep.offsets().map(|d| base + d).collect(),
            None => vec![base],
        }
    }

    /// The footprint of every placed cell, given the footprint of the cell itself.
    pub fn footprints(&self, cell_box: Rect) -> Vec<Rect> {
        self.origins()
            .into_iter()
            .map(|o| cell_box.translate(o))
            .collect()
    }

    /// Converts the placement into a layout instance.
    pub fn to_instance(&self, name: impl Into<arcstr::ArcStr>) -> Instance {
        match self.repetition {
            Some(rep) => Instance::array(self.cell, name, self.trans, rep),
            None => Instance::with_transformation(self.cell, name, self.trans),
        }
    }
}

/// A container placements can be inserted into.
pub trait PlacementSink {
    /// Inserts `placement` into the cell `target`.
    fn insert_placement(&mut self, target: CellId, placement: Placement) -> FillResult<()>;
}

impl<L> PlacementSink for LibraryBuilder<L> {
    fn insert_placement(&mut self, target: CellId, placement: Placement) -> FillResult<()> {
        let cell = self.try_cell_mut(target)?;
        let mut k = cell.num_instances();
        let mut name = arcstr::format!("fill${}", k);
        while cell.try_instance_named(&name).is_some() {
            k += 1;
            name = arcstr::format!("fill${}", k);
        }
        cell.add_instance(placement.to_instance(name));
        Ok(())
    }
}

impl PlacementSink for Vec<Placement> {
    fn insert_placement(&mut self, _target: CellId, placement: Placement) -> FillResult<()> {
        self.push(placement);
        Ok(())
    }
}

/// The cell receiving placements, together with the lock guarding its container.
///
/// The lock is held only while a single placement is inserted, so fills of
/// disjoint areas can share one container from several threads.
pub struct FillTarget<'a, S> {
    container: &'a Mutex<S>,
    cell: CellId,
}

impl<S> Clone for FillTarget<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for FillTarget<'_, S> {}

impl<'a, S> FillTarget<'a, S> {
    pub fn new(container: &'a Mutex<S>, cell: CellId) -> Self {
        Self { container, cell }
    }

    /// The cell placements go into.
    #[inline]
    pub fn cell(&self) -> CellId {
        self.cell
    }
}

impl<S: PlacementSink> FillTarget<'_, S> {
    /// Locks the container and inserts `placement`.
    pub fn insert(&self, placement: Placement) -> FillResult<()> {
        let mut container = self.container.lock().map_err(|_| FillError::Poisoned)?;
        container.insert_placement(self.cell, placement)
    }
}

#[cfg(test)]
mod tests {
    use layir::Cell;

    use super::*;

    #[test]
    fn array_placement_expands() {
        let mut lib = LibraryBuilder::<()>::new();
        let fill = lib.add_cell(Cell::new("fill"));
        let placement = Placement::array(
            fill,
            Transformation::translate(-1, -1),
            Repetition::new(Point::new(0, 10), 2, Point::new(12, 0), 2),
        );
        assert_eq!(placement.instance_count(), 4);
        assert_eq!(
            placement.footprints(Rect::from_sides(1, 1, 11, 11)),
            vec![
                Rect::from_sides(0, 0, 10, 10),
                Rect::from_sides(0, 10, 10, 20),
                Rect::from_sides(12, 0, 22, 10),
                Rect::from_sides(12, 10, 22, 20),
            ]
        );
    }

    #[test]
    fn library_sink_names_instances() {
        let mut lib = LibraryBuilder::<()>::new();
        let fill = lib.add_cell(Cell::new("fill"));
        let top = lib.add_cell(Cell::new("top"));
        let lib = Mutex::new(lib);
        let target = FillTarget::new(&lib, top);
        target
            .insert(Placement::single(fill, Transformation::translate(0, 0)))
            .unwrap();
        target
            .insert(Placement::single(fill, Transformation::translate(10, 0)))
            .unwrap();
        let lib = lib.into_inner().unwrap();
        let top = lib.cell(top);
        assert_eq!(top.num_instances(), 2);
        let second = top.try_instance_named("fill$1").unwrap();
        assert_eq!(second.transformation(), Transformation::translate(10, 0));
        assert_eq!(second.child(), fill);
    }

    #[test]
    fn library_sink_skips_taken_names() {
        let mut lib = LibraryBuilder::<()>::new();
        let fill = lib.add_cell(Cell::new("fill"));
        let mut top = Cell::new("top");
        top.add_instance(Instance::with_transformation(
            fill,
            "fill$1",
            Transformation::translate(-5, -5),
        ));
        let top = lib.add_cell(top);
        let lib = Mutex::new(lib);
        let target = FillTarget::new(&lib, top);
        for x in [0, 10] {
            target
                .insert(Placement::single(fill, Transformation::translate(x, 0)))
                .unwrap();
        }
        let lib = lib.into_inner().unwrap();
        let top = lib.cell(top);
        assert_eq!(top.num_instances(), 3);
        let kept = top.try_instance_named("fill$1").unwrap();
        assert_eq!(kept.transformation(), Transformation::translate(-5, -5));
        let names: Vec<&str> = top.instances().map(|(_, inst)| inst.name().as_str()).collect();
        assert_eq!(names, vec!["fill$1", "fill$2", "fill$3"]);
    }

    #[test]
    fn missing_target_cell_is_reported() {
        let mut other = LibraryBuilder::<()>::new();
        let _ = other.add_cell(Cell::new("a"));
        let absent = other.add_cell(Cell::new("b"));
        let mut lib = LibraryBuilder::<()>::new();
        let fill = lib.add_cell(Cell::new("fill"));
        let lib = Mutex::new(lib);
        let err = FillTarget::new(&lib, absent)
            .insert(Placement::single(fill, Transformation::identity()))
            .unwrap_err();
        assert!(matches!(err, FillError::Layir(_)));
    }
}
