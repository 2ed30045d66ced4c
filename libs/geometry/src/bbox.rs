//! Bounding boxes of shapes and shape collections.

use crate::rect::Rect;

/// Anything with an axis-aligned extent.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// let rect = Rect::from_sides(0, 0, 100, 200);
/// assert_eq!(rect.bbox(), Some(Rect::from_sides(0, 0, 100, 200)));
/// ```
pub trait Bbox {
    /// The smallest box enclosing `self`, or `None` for empty collections.
    ///
    /// Degenerate shapes such as zero-width rectangles still have a box.
    fn bbox(&self) -> Option<Rect>;
}

/// Growing a bounding box to cover another one.
pub trait BoundingUnion<T> {
    /// The combined box.
    type Output;
    /// The box enclosing both `self` and `other`.
    fn bounding_union(&self, other: &T) -> Self::Output;
}

impl BoundingUnion<Option<Rect>> for Option<Rect> {
    type Output = Option<Rect>;
    fn bounding_union(&self, other: &Option<Rect>) -> Self::Output {
        match (*self, *other) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        }
    }
}

impl<T> Bbox for &T
where
    T: Bbox,
{
    fn bbox(&self) -> Option<Rect> {
        T::bbox(*self)
    }
}

impl<T: Bbox> Bbox for [T] {
    fn bbox(&self) -> Option<Rect> {
        self.iter()
            .fold(None, |acc: Option<Rect>, item| acc.bounding_union(&item.bbox()))
    }
}

impl<T: Bbox> Bbox for Vec<T> {
    fn bbox(&self) -> Option<Rect> {
        self.as_slice().bbox()
    }
}

impl Bbox for Option<Rect> {
    fn bbox(&self) -> Option<Rect> {
        *self
    }
}

#[cfg(test)]
mod tests {
    use crate::{bbox::Bbox, point::Point, polygon::Polygon, rect::Rect};

    #[test]
    fn collections_bound_all_members() {
        let rects = vec![Rect::from_sides(0, 0, 10, 10), Rect::from_sides(-5, 20, 3, 25)];
        assert_eq!(rects.bbox(), Some(Rect::from_sides(-5, 0, 10, 25)));
        assert_eq!(rects[..1].bbox(), Some(Rect::from_sides(0, 0, 10, 10)));
        assert_eq!(Vec::<Polygon>::new().bbox(), None);

        let sliver = Rect::from_sides(4, 0, 4, 8);
        assert_eq!(sliver.bbox(), Some(sliver));
    }

    #[test]
    fn polygon_box_spans_its_hull() {
        let tri = Polygon::from_verts(vec![Point::new(3, -7), Point::new(12, 1), Point::new(-2, 9)]);
        assert_eq!(tri.bbox(), Some(Rect::from_sides(-2, -7, 12, 9)));
    }
}
