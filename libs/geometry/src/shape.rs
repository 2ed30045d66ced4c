//! Layout shapes.

use serde::{Deserialize, Serialize};

use crate::{bbox::Bbox, point::Point, polygon::Polygon, rect::Rect, transform::TranslateMut};

/// A shape drawn in a cell: either a box or a general polygon.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// An axis-aligned box.
    Rect(Rect),
    /// A polygon, possibly with holes.
    Polygon(Polygon),
}

impl Shape {
    /// The box, if this shape is one.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            Self::Polygon(_) => None,
        }
    }

    /// Twice the enclosed area.
    pub fn area2(&self) -> i128 {
        match self {
            Self::Rect(r) => 2 * r.area(),
            Self::Polygon(p) => p.area2(),
        }
    }

    /// Returns true if the shape encloses no area.
    pub fn is_empty(&self) -> bool {
        self.area2() == 0
    }
}

impl TranslateMut for Shape {
    fn translate_mut(&mut self, p: Point) {
        match self {
            Self::Rect(rect) => rect.translate_mut(p),
            Self::Polygon(polygon) => polygon.translate_mut(p),
        }
    }
}

impl Bbox for Shape {
    fn bbox(&self) -> Option<Rect> {
        match self {
            Self::Rect(rect) => rect.bbox(),
            Self::Polygon(polygon) => polygon.bbox(),
        }
    }
}

impl From<Rect> for Shape {
    #[inline]
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

impl From<Polygon> for Shape {
    #[inline]
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl From<Shape> for Polygon {
    fn from(value: Shape) -> Self {
        match value {
            Shape::Rect(r) => Polygon::from(r),
            Shape::Polygon(p) => p,
        }
    }
}

impl From<&Shape> for Polygon {
    fn from(value: &Shape) -> Self {
        value.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Translate;

    #[test]
    fn shapes_convert_to_polygons() {
        let rect = Shape::from(Rect::from_sides(0, 0, 4, 3));
        assert_eq!(rect.area2(), 24);
        assert_eq!(Polygon::from(&rect).area2(), 24);

        let tri = Shape::from(Polygon::from_verts(vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(0, 4),
        ]));
        assert_eq!(tri.as_rect(), None);
        let moved = tri.translate(Point::new(1, 1));
        assert_eq!(moved.bbox(), Some(Rect::from_sides(1, 1, 5, 5)));
        assert!(Shape::from(Rect::from_sides(0, 0, 0, 5)).is_empty());
    }
}
