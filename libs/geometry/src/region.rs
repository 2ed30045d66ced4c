//! Polygon sets with boolean and sizing operations.
//!
//! Booleans run on the float overlay engine of `i_overlay` with the non-zero
//! fill rule. Every input coordinate is an integer, so the engine sees exact
//! values; vertices it creates at edge crossings are rounded back to the
//! integer grid, and contours that collapse under rounding are dropped.

use std::ops::SubAssign;

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::polygon::{contour_area2, Polygon};
use crate::rect::Rect;
use crate::transform::TranslateMut;

type Contour = Vec<[f64; 2]>;

/// An ordered set of polygons.
///
/// With merged semantics (the default), operations first combine touching or
/// overlapping polygons into one. With raw semantics, sizing treats every
/// polygon on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    polygons: Vec<Polygon>,
    merged_semantics: bool,
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Region {
    /// Creates an empty region with merged semantics.
    pub fn new() -> Self {
        Self {
            polygons: Vec::new(),
            merged_semantics: true,
        }
    }

    /// Adds a polygon without merging.
    pub fn insert(&mut self, polygon: impl Into<Polygon>) {
        let polygon = polygon.into();
        if !polygon.is_empty() {
            self.polygons.push(polygon);
        }
    }

    /// Returns true if the region holds no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// The number of stored polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Iterates over the stored polygons.
    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    /// The stored polygons.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Consumes the region, returning its polygons.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    /// Whether operations merge the input first.
    pub fn merged_semantics(&self) -> bool {
        self.merged_semantics
    }

    /// Selects merged or raw semantics.
    pub fn set_merged_semantics(&mut self, merged_semantics: bool) {
        self.merged_semantics = merged_semantics;
    }

    /// Returns the union of all polygons.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let mut region = Region::new();
    /// region.insert(Rect::from_sides(0, 0, 10, 10));
    /// region.insert(Rect::from_sides(10, 0, 20, 10));
    /// let merged = region.merged();
    /// assert_eq!(merged.len(), 1);
    /// assert_eq!(merged.area2(), 400);
    /// ```
    pub fn merged(&self) -> Region {
        self.with_polygons(overlay(&self.polygons, &[], OverlayRule::Union))
    }

    /// Merges the region in place.
    pub fn merge(&mut self) {
        *self = self.merged();
    }

    /// Returns the parts of `self` not covered by `other`.
    pub fn not(&self, other: &Region) -> Region {
        self.with_polygons(overlay(
            &self.polygons,
            &other.polygons,
            OverlayRule::Difference,
        ))
    }

    /// Returns the union of `self` and `other`.
    pub fn or(&self, other: &Region) -> Region {
        self.with_polygons(overlay(&self.polygons, &other.polygons, OverlayRule::Union))
    }

    /// Returns the parts covered by both `self` and `other`.
    pub fn and(&self, other: &Region) -> Region {
        self.with_polygons(overlay(
            &self.polygons,
            &other.polygons,
            OverlayRule::Intersect,
        ))
    }

    /// Grows (positive) or shrinks (negative) the region by `dx` horizontally and `dy` vertically.
    ///
    /// The result is the Minkowski sum with, or erosion by, the rectangle
    /// `[-|dx|, |dx|] x [-|dy|, |dy|]`. Mixed signs are applied one axis at a time.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let region = Region::from(Rect::from_sides(0, 0, 100, 50));
    /// let shrunk = region.sized(-10, -5);
    /// assert_eq!(shrunk.bbox(), Some(Rect::from_sides(10, 5, 90, 45)));
    /// let grown = region.sized(0, 5);
    /// assert_eq!(grown.bbox(), Some(Rect::from_sides(0, -5, 100, 55)));
    /// ```
    pub fn sized(&self, dx: i64, dy: i64) -> Region {
        if dx == 0 && dy == 0 {
            return if self.merged_semantics {
                self.merged()
            } else {
                self.clone()
            };
        }
        if (dx < 0 && dy > 0) || (dx > 0 && dy < 0) {
            return self.sized(dx, 0).sized(0, dy);
        }
        let polygons = if self.merged_semantics {
            size_polygons(&self.merged().polygons, dx, dy)
        } else {
            self.polygons
                .iter()
                .flat_map(|p| size_polygons(std::slice::from_ref(p), dx, dy))
                .collect()
        };
        self.with_polygons(polygons)
    }

    /// Sizes the region in place. See [`Region::sized`].
    pub fn size(&mut self, dx: i64, dy: i64) {
        *self = self.sized(dx, dy);
    }

    /// Twice the covered area.
    ///
    /// Overlaps are counted once under merged semantics and once per polygon otherwise.
    pub fn area2(&self) -> i128 {
        let polygons = if self.merged_semantics {
            overlay(&self.polygons, &[], OverlayRule::Union)
        } else {
            self.polygons.clone()
        };
        polygons.iter().map(Polygon::area2).sum()
    }

    fn with_polygons(&self, polygons: Vec<Polygon>) -> Region {
        Region {
            polygons,
            merged_semantics: self.merged_semantics,
        }
    }
}

impl Bbox for Region {
    fn bbox(&self) -> Option<Rect> {
        self.polygons.bbox()
    }
}

impl TranslateMut for Region {
    fn translate_mut(&mut self, p: Point) {
        self.polygons.translate_mut(p);
    }
}

impl SubAssign<&Region> for Region {
    fn sub_assign(&mut self, rhs: &Region) {
        *self = self.not(rhs);
    }
}

impl From<Rect> for Region {
    fn from(value: Rect) -> Self {
        let mut region = Region::new();
        region.insert(value);
        region
    }
}

impl From<Polygon> for Region {
    fn from(value: Polygon) -> Self {
        let mut region = Region::new();
        region.insert(value);
        region
    }
}

impl FromIterator<Polygon> for Region {
    fn from_iter<T: IntoIterator<Item = Polygon>>(iter: T) -> Self {
        let mut region = Region::new();
        region.extend(iter);
        region
    }
}

impl Extend<Polygon> for Region {
    fn extend<T: IntoIterator<Item = Polygon>>(&mut self, iter: T) {
        for polygon in iter {
            self.insert(polygon);
        }
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;
    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

/// Sizes `polygons` by a rectangle whose half-extents share one sign.
fn size_polygons(polygons: &[Polygon], dx: i64, dy: i64) -> Vec<Polygon> {
    let sweeps = edge_sweeps(polygons, dx.abs(), dy.abs());
    let rule = if dx > 0 || dy > 0 {
        OverlayRule::Union
    } else {
        OverlayRule::Difference
    };
    overlay_contours(to_contours(polygons), sweeps, rule)
}

/// The area swept by the rectangle `[-dx, dx] x [-dy, dy]` along every polygon edge.
fn edge_sweeps(polygons: &[Polygon], dx: i64, dy: i64) -> Vec<Contour> {
    let corners = [
        Point::new(-dx, -dy),
        Point::new(dx, -dy),
        Point::new(dx, dy),
        Point::new(-dx, dy),
    ];
    let mut sweeps = Vec::new();
    for polygon in polygons {
        for contour in polygon.contours() {
            let n = contour.len();
            for i in 0..n {
                let (a, b) = (contour[i], contour[(i + 1) % n]);
                let pts = corners.iter().flat_map(|&c| [a + c, b + c]).collect();
                let hull = convex_hull(pts);
                if hull.len() >= 3 {
                    sweeps.push(to_float(&hull));
                }
            }
        }
    }
    sweeps
}

/// Counterclockwise convex hull without collinear vertices.
fn convex_hull(mut pts: Vec<Point>) -> Vec<Point> {
    pts.sort();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter() {
        push_hull_point(&mut lower, p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        push_hull_point(&mut upper, p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn push_hull_point(chain: &mut Vec<Point>, p: Point) {
    while chain.len() >= 2 {
        let a = chain[chain.len() - 2];
        let b = chain[chain.len() - 1];
        if (b - a).vprod(p - a) > 0 {
            break;
        }
        chain.pop();
    }
    chain.push(p);
}

fn overlay(subject: &[Polygon], clip: &[Polygon], rule: OverlayRule) -> Vec<Polygon> {
    overlay_contours(to_contours(subject), to_contours(clip), rule)
}

fn overlay_contours(subject: Vec<Contour>, clip: Vec<Contour>, rule: OverlayRule) -> Vec<Polygon> {
    let (subject, clip) = if subject.is_empty() && matches!(rule, OverlayRule::Union) {
        (clip, subject)
    } else {
        (subject, clip)
    };
    if subject.is_empty() {
        return Vec::new();
    }
    let shapes = subject.overlay(&clip, rule, FillRule::NonZero);
    shapes.into_iter().filter_map(to_polygon).collect()
}

fn to_float(contour: &[Point]) -> Contour {
    contour.iter().map(|p| [p.x as f64, p.y as f64]).collect()
}

/// Converts polygons to contours with counterclockwise hulls and clockwise holes.
fn to_contours(polygons: &[Polygon]) -> Vec<Contour> {
    let mut contours = Vec::new();
    for polygon in polygons {
        if polygon.hull().len() < 3 {
            continue;
        }
        let polygon = polygon.oriented();
        contours.extend(polygon.contours().map(to_float));
    }
    contours
}

/// Converts one output shape (outer contour first, holes after) back to the integer grid.
fn to_polygon(shape: Vec<Contour>) -> Option<Polygon> {
    let mut contours = shape.into_iter();
    let hull = snap_contour(contours.next()?)?;
    let holes = contours.filter_map(snap_contour).collect();
    Some(Polygon::with_holes(hull, holes).oriented())
}

fn snap_contour(contour: Contour) -> Option<Vec<Point>> {
    let mut points: Vec<Point> = Vec::with_capacity(contour.len());
    for [x, y] in contour {
        let p = Point::new(x.round() as i64, y.round() as i64);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    drop_collinear(&mut points);
    if points.len() < 3 || contour_area2(&points) == 0 {
        return None;
    }
    Some(points)
}

/// Removes vertices lying on the line through their neighbors.
fn drop_collinear(points: &mut Vec<Point>) {
    let mut i = 0;
    while points.len() >= 3 && i < points.len() {
        let n = points.len();
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        if (points[i] - prev).vprod(next - points[i]) == 0 {
            points.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn rect(left: i64, bot: i64, right: i64, top: i64) -> Region {
        Region::from(Rect::from_sides(left, bot, right, top))
    }

    #[test]
    fn convex_hull_drops_interior_and_collinear_points() {
        let pts = vec![
            Point::new(0, 0),
            Point::new(5, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(3, 3),
            Point::new(0, 10),
        ];
        let hull = convex_hull(pts);
        assert_eq!(
            hull,
            vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10)
            ]
        );
        assert!(convex_hull(vec![Point::new(0, 0), Point::new(0, 5), Point::new(0, 9)]).len() < 3);
    }

    #[test]
    fn difference_splits_rectangle() {
        let target = rect(0, 0, 100, 50);
        let gap = rect(40, 0, 60, 50);
        let mut parts = target.not(&gap).into_polygons();
        parts.sort_by_key(|p| p.bbox().map(|b| b.left()));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].bbox(), Some(Rect::from_sides(0, 0, 40, 50)));
        assert_eq!(parts[1].bbox(), Some(Rect::from_sides(60, 0, 100, 50)));
        assert!(parts.iter().all(Polygon::is_box));
    }

    #[test]
    fn difference_leaves_hole() {
        let target = rect(0, 0, 100, 100);
        let hole = rect(40, 40, 60, 60);
        let result = target.not(&hole);
        assert_eq!(result.len(), 1);
        assert_eq!(result.polygons()[0].holes().len(), 1);
        assert_eq!(result.area2(), 2 * (10_000 - 400));
    }

    #[test]
    fn subtracting_everything_leaves_nothing() {
        let mut target = rect(0, 0, 10, 10);
        target -= &rect(-5, -5, 15, 15);
        assert!(target.is_empty());
        assert!(Region::new().not(&rect(0, 0, 1, 1)).is_empty());
    }

    #[test]
    fn intersection_and_union() {
        let a = rect(0, 0, 20, 20);
        let b = rect(10, 10, 30, 30);
        assert_eq!(a.and(&b).bbox(), Some(Rect::from_sides(10, 10, 20, 20)));
        let u = a.or(&b);
        assert_eq!(u.len(), 1);
        assert_eq!(u.area2(), 2 * (400 + 400 - 100));
        assert!(a.and(&Region::new()).is_empty());
    }

    #[test]
    fn erosion_removes_thin_parts() {
        let mut region = rect(0, 0, 100, 50);
        region.insert(Rect::from_sides(100, 0, 200, 5));
        let eroded = region.sized(0, -4);
        assert_eq!(eroded.bbox(), Some(Rect::from_sides(0, 4, 100, 46)));
        let opened = eroded.sized(0, 4);
        assert_eq!(opened.bbox(), Some(Rect::from_sides(0, 0, 100, 50)));
        assert_eq!(opened.area2(), 2 * 5000);
    }

    #[test]
    fn erosion_beyond_half_width_vanishes() {
        assert!(rect(0, 0, 100, 5).sized(0, -3).is_empty());
        assert!(rect(0, 0, 5, 100).sized(-3, 0).is_empty());
        assert_eq!(
            rect(0, 0, 100, 6).sized(0, -2).bbox(),
            Some(Rect::from_sides(0, 2, 100, 4))
        );
    }

    #[test]
    fn mixed_sign_sizing() {
        let sized = rect(0, 0, 100, 50).sized(10, -5);
        assert_eq!(sized.bbox(), Some(Rect::from_sides(-10, 5, 110, 45)));
        assert_eq!(sized.area2(), 2 * 120 * 40);
    }

    #[test]
    fn raw_semantics_size_each_polygon() {
        let mut region = rect(0, 0, 10, 10);
        region.insert(Rect::from_sides(10, 0, 20, 10));
        region.set_merged_semantics(false);
        let shrunk = region.sized(-4, 0);
        assert_eq!(shrunk.len(), 2);
        region.set_merged_semantics(true);
        let shrunk = region.sized(-4, 0);
        assert_eq!(shrunk.len(), 1);
        assert_eq!(shrunk.bbox(), Some(Rect::from_sides(4, 0, 16, 10)));
    }

    #[test]
    fn dilation_rounds_nothing_for_boxes() {
        let grown = rect(0, 0, 10, 10).sized(2, 3);
        assert_eq!(grown.len(), 1);
        assert!(grown.polygons()[0].is_box());
        assert_eq!(grown.bbox(), Some(Rect::from_sides(-2, -3, 12, 13)));
    }
}
