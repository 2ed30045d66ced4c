use test_log::test;

use geometry::prelude::*;

use crate::{Cell, Instance, LayirError, LibraryBuilder, Repetition, Shape};

#[test]
fn duplicate_cell_names_are_uniquified() {
    let mut lib = LibraryBuilder::<u8>::new();
    let a = lib.add_cell(Cell::new("fill"));
    let b = lib.add_cell(Cell::new("fill"));
    let c = lib.add_cell(Cell::new("fill"));
    assert_eq!(lib.cell(a).name(), "fill");
    assert_eq!(lib.cell(b).name(), "fill_1");
    assert_eq!(lib.cell(c).name(), "fill_2");
    assert_eq!(lib.try_cell_id_named("fill_1"), Some(b));
}

#[test]
fn cell_bbox_covers_shapes() {
    let mut cell = Cell::new("fill");
    assert_eq!(cell.bbox(), None);
    cell.add_shape(Shape::new(1u8, Rect::from_sides(0, 0, 8, 8)));
    cell.add_shape(Shape::new(2u8, Rect::from_sides(-1, -1, 9, 9)));
    assert_eq!(cell.bbox(), Some(Rect::from_sides(-1, -1, 9, 9)));
}

#[test]
fn array_instances_expand() {
    let mut lib = LibraryBuilder::<u8>::new();
    let fill = lib.add_cell(Cell::new("fill"));
    let top = lib.add_cell(Cell::new("top"));
    let rep = Repetition::new(Point::new(0, 10), 2, Point::new(10, 0), 3);
    lib.cell_mut(top).add_instance(Instance::array(
        fill,
        "fill$0",
        Transformation::translate(5, 5),
        rep,
    ));
    lib.cell_mut(top)
        .add_instance(Instance::with_transformation(fill, "fill$1", Transformation::translate(100, 0)));

    let top_cell = lib.cell(top);
    assert_eq!(top_cell.num_instances(), 2);
    assert_eq!(top_cell.flat_instance_count(), 7);
    let array = top_cell.try_instance_named("fill$0").unwrap();
    assert_eq!(
        array.origins(),
        vec![
            Point::new(5, 5),
            Point::new(5, 15),
            Point::new(15, 5),
            Point::new(15, 15),
            Point::new(25, 5),
            Point::new(25, 15),
        ]
    );
    assert_eq!(lib.topological_order(), vec![fill, top]);
    assert!(lib.build().is_ok());
}

#[test]
fn build_rejects_dangling_instances() {
    let mut other = LibraryBuilder::<u8>::new();
    let _ = other.add_cell(Cell::new("a"));
    let foreign = other.add_cell(Cell::new("b"));

    let mut lib = LibraryBuilder::<u8>::new();
    let top = lib.add_cell(Cell::new("top"));
    lib.cell_mut(top).add_instance(Instance::new(foreign, "x"));
    assert!(matches!(
        lib.build(),
        Err(LayirError::MissingChild { .. })
    ));
}

#[test]
fn missing_cell_is_an_error() {
    let mut other = LibraryBuilder::<u8>::new();
    let _ = other.add_cell(Cell::new("a"));
    let id = other.add_cell(Cell::new("b"));
    let mut lib = LibraryBuilder::<u8>::new();
    let _ = lib.add_cell(Cell::new("only"));
    assert_eq!(lib.try_cell_mut(id).err(), Some(LayirError::CellNotFound(id)));
}

#[test]
fn layer_region_collects_one_layer() {
    let mut cell = Cell::new("top");
    cell.add_shape(Shape::new(1u8, Rect::from_sides(0, 0, 10, 10)));
    cell.add_shape(Shape::new(1u8, Rect::from_sides(5, 0, 15, 10)));
    cell.add_shape(Shape::new(2u8, Rect::from_sides(100, 100, 110, 110)));
    let region = cell.layer_region(&1);
    assert_eq!(region.len(), 2);
    assert_eq!(region.merged().len(), 1);
    assert_eq!(region.area2(), 300);
    assert!(cell.layer_region(&3).is_empty());
}
