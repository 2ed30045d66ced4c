//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::{Bbox, BoundingUnion};
use crate::contains::{Containment, Contains};
use crate::point::Point;
use crate::transform::TranslateMut;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.bot(), 20);
    /// assert_eq!(rect.right(), 30);
    /// assert_eq!(rect.top(), 40);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    ///
    /// If you want sides to be sorted for you, consider using [`Rect::new`] instead.
    #[inline]
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self::new(Point::new(left, bot), Point::new(right, top))
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top),
    /// but returns `None` if the given sides would make the rectangle empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Rect::from_sides_option(0, 0, 10, 5), Some(Rect::from_sides(0, 0, 10, 5)));
    /// assert_eq!(Rect::from_sides_option(10, 0, 0, 5), None);
    /// ```
    #[inline]
    pub fn from_sides_option(left: i64, bot: i64, right: i64, top: i64) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self {
                p0: Point::new(left, bot),
                p1: Point::new(right, top),
            })
        }
    }

    /// Creates a rectangle from two opposite corners.
    ///
    /// The corners are sorted, so any pair of opposite corners is accepted.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The left edge.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The bottom edge.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The right edge.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The top edge.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The horizontal extent.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// The vertical extent.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// Width and height packed into a [`Point`].
    #[inline]
    pub const fn dims(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// The lower-left corner.
    #[inline]
    pub const fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub const fn upper_right(&self) -> Point {
        self.p1
    }

    /// The four corners in counterclockwise order starting at the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }

    /// The enclosed area.
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    /// Returns true if the rectangle encloses no area.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Computes the rectangular union of this `Rect` and another `Rect`.
    pub fn union(self, other: Self) -> Self {
        Rect::new(
            Point::new(self.left().min(other.left()), self.bot().min(other.bot())),
            Point::new(self.right().max(other.right()), self.top().max(other.top())),
        )
    }

    /// Calculates the intersection of this rectangle with another rectangle.
    ///
    /// Returns `None` if the rectangles do not touch.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0, 0, 20, 20);
    /// let b = Rect::from_sides(10, 10, 30, 30);
    /// assert_eq!(a.intersection(b), Some(Rect::from_sides(10, 10, 20, 20)));
    /// assert_eq!(a.intersection(Rect::from_sides(40, 0, 50, 10)), None);
    /// ```
    pub fn intersection(self, other: Self) -> Option<Self> {
        Rect::from_sides_option(
            self.left().max(other.left()),
            self.bot().max(other.bot()),
            self.right().min(other.right()),
            self.top().min(other.top()),
        )
    }

    /// Moves every edge outward by `amount` (inward when negative).
    ///
    /// Returns `None` if a negative amount collapses the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 10, 10);
    /// assert_eq!(rect.enlarge(Point::new(2, 1)), Some(Rect::from_sides(-2, -1, 12, 11)));
    /// assert_eq!(rect.enlarge(Point::new(-6, 0)), None);
    /// ```
    pub fn enlarge(&self, amount: Point) -> Option<Self> {
        Rect::from_sides_option(
            self.p0.x - amount.x,
            self.p0.y - amount.y,
            self.p1.x + amount.x,
            self.p1.y + amount.y,
        )
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

impl BoundingUnion<Rect> for Rect {
    type Output = Rect;
    fn bounding_union(&self, other: &Rect) -> Self::Output {
        self.union(*other)
    }
}

impl Contains<Point> for Rect {
    fn contains(&self, p: &Point) -> Containment {
        if self.p0.x <= p.x && p.x <= self.p1.x && self.p0.y <= p.y && p.y <= self.p1.y {
            Containment::Full
        } else {
            Containment::None
        }
    }
}

impl Contains<Rect> for Rect {
    /// Boundary contact counts as containment.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let outer = Rect::from_sides(0, 0, 100, 100);
    /// assert_eq!(outer.contains(&Rect::from_sides(0, 0, 100, 10)), Containment::Full);
    /// assert_eq!(outer.contains(&Rect::from_sides(90, 0, 110, 10)), Containment::Partial);
    /// assert_eq!(outer.contains(&Rect::from_sides(120, 0, 130, 10)), Containment::None);
    /// ```
    fn contains(&self, other: &Rect) -> Containment {
        if self.encloses(&other.p0) && self.encloses(&other.p1) {
            Containment::Full
        } else if self.intersection(*other).is_some() {
            Containment::Partial
        } else {
            Containment::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sorts_corners() {
        let rect = Rect::new(Point::new(10, -5), Point::new(-10, 5));
        assert_eq!(rect, Rect::from_sides(-10, -5, 10, 5));
        assert_eq!(rect.dims(), Point::new(20, 10));
        assert_eq!(rect.area(), 200);
    }

    #[test]
    fn touching_rects_intersect_in_degenerate_rect() {
        let a = Rect::from_sides(0, 0, 10, 10);
        let b = Rect::from_sides(10, 0, 20, 10);
        let touch = a.intersection(b).unwrap();
        assert!(touch.is_degenerate());
        assert_eq!(touch.area(), 0);
    }
}
