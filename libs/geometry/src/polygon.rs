//! Integer coordinate polygons with holes.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::rect::Rect;
use crate::transform::TranslateMut;

/// A polygon, given by an outer hull and zero or more holes.
///
/// Polygons produced by [`Region`](crate::region::Region) operations have a
/// counterclockwise hull and clockwise holes. Polygons built by hand may use
/// either orientation; [`Polygon::oriented`] normalizes them.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polygon {
    /// Vertices of the outer contour.
    hull: Vec<Point>,
    /// Vertices of each hole contour.
    holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Creates a polygon with given hull vertices and no holes.
    pub fn from_verts(vec: Vec<Point>) -> Self {
        Self {
            hull: vec,
            holes: Vec::new(),
        }
    }

    /// Creates a polygon with the given hull and holes.
    pub fn with_holes(hull: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { hull, holes }
    }

    /// The vertices of the outer contour.
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    /// The hole contours.
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    /// Iterates over the hull followed by every hole.
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.hull.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Returns true if the hull has no vertices.
    pub fn is_empty(&self) -> bool {
        self.hull.is_empty()
    }

    /// Twice the enclosed area: the hull area minus the area of every hole.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Polygon::from(Rect::from_sides(0, 0, 10, 10));
    /// assert_eq!(square.area2(), 200);
    /// let triangle = Polygon::from_verts(vec![Point::new(0, 0), Point::new(3, 0), Point::new(0, 1)]);
    /// assert_eq!(triangle.area2(), 3);
    /// ```
    pub fn area2(&self) -> i128 {
        contour_area2(&self.hull).abs()
            - self
                .holes
                .iter()
                .map(|h| contour_area2(h).abs())
                .sum::<i128>()
    }

    /// Returns true if the polygon is an axis-aligned rectangle without holes.
    ///
    /// Collinear vertices along the edges are allowed.
    pub fn is_box(&self) -> bool {
        if !self.holes.is_empty() || self.hull.len() < 4 {
            return false;
        }
        match self.bbox() {
            Some(bbox) => bbox.area() > 0 && self.area2() == 2 * bbox.area(),
            None => false,
        }
    }

    /// Returns a copy with a counterclockwise hull and clockwise holes.
    ///
    /// Every contour is rotated to start at its lowest point, the leftmost one
    /// on ties, so equal polygons have equal vertex lists.
    pub fn oriented(&self) -> Self {
        let mut hull = self.hull.clone();
        if contour_area2(&hull) < 0 {
            hull.reverse();
        }
        start_at_lowest(&mut hull);
        let holes = self
            .holes
            .iter()
            .map(|h| {
                let mut h = h.clone();
                if contour_area2(&h) > 0 {
                    h.reverse();
                }
                start_at_lowest(&mut h);
                h
            })
            .collect();
        Self { hull, holes }
    }
}

fn start_at_lowest(contour: &mut [Point]) {
    if let Some(k) = (0..contour.len()).min_by_key(|&k| (contour[k].y, contour[k].x)) {
        contour.rotate_left(k);
    }
}

/// Twice the signed area of a closed contour; positive for counterclockwise order.
pub fn contour_area2(points: &[Point]) -> i128 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].vprod(points[(i + 1) % n]))
        .sum()
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        let first = self.hull.first()?;
        let (mut left, mut bot, mut right, mut top) = (first.x, first.y, first.x, first.y);
        for p in &self.hull {
            left = left.min(p.x);
            bot = bot.min(p.y);
            right = right.max(p.x);
            top = top.max(p.y);
        }
        Rect::from_sides_option(left, bot, right, top)
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, p: Point) {
        self.hull.translate_mut(p);
        self.holes.translate_mut(p);
    }
}

impl From<Rect> for Polygon {
    fn from(value: Rect) -> Self {
        Self::from_verts(value.corners().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_subtracts_holes_regardless_of_orientation() {
        let hull = Rect::from_sides(0, 0, 10, 10).corners().to_vec();
        let mut hole = Rect::from_sides(2, 2, 4, 4).corners().to_vec();
        let poly = Polygon::with_holes(hull.clone(), vec![hole.clone()]);
        hole.reverse();
        let poly_cw_hole = Polygon::with_holes(hull, vec![hole]);
        assert_eq!(poly.area2(), 2 * 96);
        assert_eq!(poly_cw_hole.area2(), 2 * 96);
    }

    #[test]
    fn oriented_normalizes_winding() {
        let mut hull = Rect::from_sides(0, 0, 10, 10).corners().to_vec();
        hull.reverse();
        let hole = Rect::from_sides(2, 2, 4, 4).corners().to_vec();
        let poly = Polygon::with_holes(hull, vec![hole]).oriented();
        assert!(contour_area2(poly.hull()) > 0);
        assert!(contour_area2(&poly.holes()[0]) < 0);
        assert_eq!(poly.hull()[0], Point::new(0, 0));
        assert_eq!(poly.holes()[0][0], Point::new(2, 2));
    }

    #[test]
    fn oriented_starts_at_lowest_leftmost_vertex() {
        let tri = Polygon::from_verts(vec![
            Point::new(100, 0),
            Point::new(0, 100),
            Point::new(0, 0),
        ]);
        assert_eq!(
            tri.oriented().hull(),
            &[Point::new(0, 0), Point::new(100, 0), Point::new(0, 100)]
        );
        let diamond = Polygon::from_verts(vec![
            Point::new(5, 10),
            Point::new(0, 5),
            Point::new(5, 0),
            Point::new(10, 5),
        ]);
        assert_eq!(diamond.oriented().hull()[0], Point::new(5, 0));
    }

    #[test]
    fn box_detection() {
        assert!(Polygon::from(Rect::from_sides(0, 0, 5, 7)).is_box());
        let l_shape = Polygon::from_verts(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(5, 5),
            Point::new(5, 10),
            Point::new(0, 10),
        ]);
        assert!(!l_shape.is_box());
    }
}
