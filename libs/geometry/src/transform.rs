//! Placement transformations and translation traits.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A transformation placing geometry at an integer displacement.
///
/// Fill placements never rotate or mirror their cells, so the only
/// degree of freedom is the offset of the child's origin.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// The x-y translation.
    pub(crate) b: Point,
}

impl Transformation {
    /// The transformation that leaves geometry where it is.
    pub fn identity() -> Self {
        Self { b: Point::zero() }
    }

    /// Returns a translation by `(x,y)`.
    pub fn translate(x: i64, y: i64) -> Self {
        Self {
            b: Point::new(x, y),
        }
    }

    /// Creates a transform from only an offset.
    pub fn from_offset(offset: Point) -> Self {
        Self { b: offset }
    }

    /// Applies `child` inside a cell that is itself placed by `parent`.
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        Self {
            b: parent.b + child.b,
        }
    }

    /// Where the child's origin lands.
    pub fn offset_point(&self) -> Point {
        self.b
    }

    /// Maps a point of the child into the parent.
    pub fn apply(&self, p: Point) -> Point {
        p + self.b
    }

    /// The transformation undoing `self`.
    pub fn inv(&self) -> Transformation {
        Self { b: -self.b }
    }
}

impl From<Point> for Transformation {
    fn from(offset: Point) -> Self {
        Self::from_offset(offset)
    }
}

/// Geometry that can be moved in place.
pub trait TranslateMut {
    /// Moves `self` by the displacement `p`.
    fn translate_mut(&mut self, p: Point);
}

impl<T: TranslateMut> TranslateMut for Vec<T> {
    fn translate_mut(&mut self, p: Point) {
        for i in self.iter_mut() {
            i.translate_mut(p);
        }
    }
}

impl<T: TranslateMut> TranslateMut for Option<T> {
    fn translate_mut(&mut self, p: Point) {
        if let Some(inner) = self.as_mut() {
            inner.translate_mut(p);
        }
    }
}

/// By-value counterpart of [`TranslateMut`], implemented for every movable type.
pub trait Translate: TranslateMut + Sized {
    /// Returns `self` moved by `p`.
    fn translate(mut self, p: Point) -> Self {
        self.translate_mut(p);
        self
    }
}

impl<T: TranslateMut + Sized> Translate for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    #[test]
    fn cascade_adds_offsets() {
        let parent = Transformation::translate(10, 20);
        let child = Transformation::from_offset(Point::new(-3, 4));
        let cascaded = Transformation::cascade(parent, child);
        assert_eq!(cascaded.offset_point(), Point::new(7, 24));
        assert_eq!(cascaded.apply(Point::new(1, 1)), Point::new(8, 25));
        assert_eq!(Transformation::from(Point::new(7, 24)), cascaded);
        assert_eq!(
            Transformation::cascade(cascaded, cascaded.inv()),
            Transformation::identity()
        );
    }

    #[test]
    fn translate_vec_of_rects() {
        let rects = vec![Rect::from_sides(0, 0, 1, 1), Rect::from_sides(2, 2, 3, 3)];
        let moved = rects.translate(Point::new(5, -5));
        assert_eq!(
            moved,
            vec![Rect::from_sides(5, -5, 6, -4), Rect::from_sides(7, -3, 8, -2)]
        );
    }
}
