//! Exact polygon coverage of area map pixels.
//!
//! Each contour is clipped against every pixel it may touch. Clipping runs in
//! arbitrary precision rational arithmetic, so the covered area of a pixel is
//! exact before it is rounded to an integer. Target polygons round down, so a
//! pixel only reaches its full area if the polygon really covers it. Blocking
//! polygons round up, so any overlap at all marks the pixel.

use geometry::prelude::{Bbox, Point, Polygon, Rect};
use geometry::polygon::contour_area2;
use num::integer::{div_ceil, div_floor};
use num::{BigInt, BigRational, Signed, ToPrimitive, Zero};

use crate::area_map::{Area, AreaMap};

type Q = BigRational;

/// How exact pixel coverage is turned into an [`Area`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round down. Partially covered pixels never count as full.
    #[default]
    Down,
    /// Round up. Any positive overlap leaves nonzero coverage.
    Up,
}

fn q(v: i64) -> Q {
    Q::from_integer(BigInt::from(v))
}

#[derive(Debug, Clone)]
struct QPoint {
    x: Q,
    y: Q,
}

impl From<Point> for QPoint {
    fn from(p: Point) -> Self {
        Self { x: q(p.x), y: q(p.y) }
    }
}

/// An axis-aligned half plane.
#[derive(Debug, Clone)]
enum HalfPlane {
    Right(Q),
    Left(Q),
    Above(Q),
    Below(Q),
}

impl HalfPlane {
    fn inside(&self, p: &QPoint) -> bool {
        match self {
            HalfPlane::Right(x) => &p.x >= x,
            HalfPlane::Left(x) => &p.x <= x,
            HalfPlane::Above(y) => &p.y >= y,
            HalfPlane::Below(y) => &p.y <= y,
        }
    }

    /// The point where segment `a`-`b` crosses the boundary line.
    fn crossing(&self, a: &QPoint, b: &QPoint) -> QPoint {
        match self {
            HalfPlane::Right(x) | HalfPlane::Left(x) => {
                let t = (x - &a.x) / (&b.x - &a.x);
                QPoint {
                    x: x.clone(),
                    y: &a.y + t * (&b.y - &a.y),
                }
            }
            HalfPlane::Above(y) | HalfPlane::Below(y) => {
                let t = (y - &a.y) / (&b.y - &a.y);
                QPoint {
                    x: &a.x + t * (&b.x - &a.x),
                    y: y.clone(),
                }
            }
        }
    }

    /// Sutherland-Hodgman clipping of a closed contour.
    fn clip(&self, contour: &[QPoint]) -> Vec<QPoint> {
        let mut out = Vec::with_capacity(contour.len() + 2);
        let Some(mut s) = contour.last() else {
            return out;
        };
        for e in contour {
            match (self.inside(s), self.inside(e)) {
                (true, true) => out.push(e.clone()),
                (false, true) => {
                    out.push(self.crossing(s, e));
                    out.push(e.clone());
                }
                (true, false) => out.push(self.crossing(s, e)),
                (false, false) => {}
            }
            s = e;
        }
        out
    }
}

fn area2(contour: &[QPoint]) -> Q {
    let n = contour.len();
    let mut sum = Q::zero();
    for i in 0..n {
        let a = &contour[i];
        let b = &contour[(i + 1) % n];
        sum += &a.x * &b.y - &a.y * &b.x;
    }
    sum
}

/// The half-open range of pixel indices along one axis whose pixels overlap `[lo, hi]` with positive length.
fn pixel_range(lo: i64, hi: i64, p0: i64, d: i64, p: i64, n: usize) -> (usize, usize) {
    let first = div_floor(lo - p0 - p, d) + 1;
    let last = div_ceil(hi - p0, d);
    let clamp = |v: i64| v.clamp(0, n as i64) as usize;
    (clamp(first), clamp(last))
}

/// Adds the area of `polygon` inside each pixel to `am`, rounded down.
///
/// Accumulators saturate at the pixel area. Returns true if any pixel
/// received nonzero coverage.
pub fn rasterize(polygon: &Polygon, am: &mut AreaMap) -> bool {
    rasterize_rounded(polygon, am, Rounding::Down)
}

/// Adds the area of `polygon` inside each pixel to `am` with the given rounding.
pub fn rasterize_rounded(polygon: &Polygon, am: &mut AreaMap, rounding: Rounding) -> bool {
    let Some(bbox) = polygon.bbox() else {
        return false;
    };
    let (p0, d, p) = (am.p0(), am.d(), am.p());
    let (i0, i1) = pixel_range(bbox.left(), bbox.right(), p0.x, d.x, p.x, am.nx());
    let (j0, j1) = pixel_range(bbox.bot(), bbox.top(), p0.y, d.y, p.y, am.ny());
    if i0 >= i1 || j0 >= j1 {
        return false;
    }

    if polygon.is_box() {
        return rasterize_box(bbox, am, (i0, i1), (j0, j1));
    }

    let w = i1 - i0;
    let mut acc = vec![Q::zero(); w * (j1 - j0)];

    for (k, contour) in polygon.contours().enumerate() {
        if contour_area2(contour) == 0 {
            continue;
        }
        // hulls add, holes subtract, whatever their winding
        let hole = k > 0;
        let contour: Vec<QPoint> = contour.iter().copied().map(QPoint::from).collect();

        for i in i0..i1 {
            let x0 = p0.x + d.x * i as i64;
            let strip = HalfPlane::Right(q(x0)).clip(&contour);
            let strip = HalfPlane::Left(q(x0 + p.x)).clip(&strip);
            if strip.len() < 3 {
                continue;
            }
            for j in j0..j1 {
                let y0 = p0.y + d.y * j as i64;
                let cell = HalfPlane::Above(q(y0)).clip(&strip);
                let cell = HalfPlane::Below(q(y0 + p.y)).clip(&cell);
                if cell.len() < 3 {
                    continue;
                }
                let a = area2(&cell).abs();
                let slot = &mut acc[(j - j0) * w + (i - i0)];
                if hole {
                    *slot -= a;
                } else {
                    *slot += a;
                }
            }
        }
    }

    let pixel_area = am.pixel_area();
    let two = q(2);
    let mut any = false;
    for j in j0..j1 {
        for i in i0..i1 {
            let exact = &acc[(j - j0) * w + (i - i0)] / &two;
            if !exact.is_positive() {
                continue;
            }
            let rounded = match rounding {
                Rounding::Down => exact.floor(),
                Rounding::Up => exact.ceil(),
            };
            // saturate before narrowing
            let a = rounded.to_integer().to_i64().map_or(pixel_area, |a| a.min(pixel_area));
            if a > 0 {
                let v = am.get_mut(i, j);
                *v = (*v).saturating_add(a as Area).min(pixel_area);
                any = true;
            }
        }
    }
    any
}

fn rasterize_box(bbox: Rect, am: &mut AreaMap, (i0, i1): (usize, usize), (j0, j1): (usize, usize)) -> bool {
    let pixel_area = am.pixel_area();
    let mut any = false;
    for j in j0..j1 {
        for i in i0..i1 {
            let Some(overlap) = am.pixel(i, j).intersection(bbox) else {
                continue;
            };
            let a = overlap.width() * overlap.height();
            if a > 0 {
                let v = am.get_mut(i, j);
                *v = (*v + a).min(pixel_area);
                any = true;
            }
        }
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_map(nx: usize, ny: usize) -> AreaMap {
        AreaMap::with_geometry(Point::zero(), Point::new(10, 10), Point::new(10, 10), nx, ny)
    }

    #[test]
    fn box_covers_pixels_exactly() {
        let mut am = unit_map(4, 2);
        let poly = Polygon::from(Rect::from_sides(5, 0, 30, 10));
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 50);
        assert_eq!(am.get(1, 0), 100);
        assert_eq!(am.get(2, 0), 100);
        assert_eq!(am.get(3, 0), 0);
        assert_eq!(am.get(0, 1), 0);
        assert_eq!(am.total_area(), 250);
    }

    #[test]
    fn triangle_area_is_floored() {
        let mut am = unit_map(1, 1);
        // covers 45 of 100 in the single pixel
        let poly = Polygon::from_verts(vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 9)]);
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 45);

        let mut am = unit_map(1, 1);
        // 3 * 3 / 2 = 4.5 rounds down
        let poly = Polygon::from_verts(vec![Point::new(0, 0), Point::new(3, 0), Point::new(0, 3)]);
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 4);
    }

    #[test]
    fn diagonal_edge_splits_pixels() {
        let mut am = unit_map(2, 2);
        let poly = Polygon::from_verts(vec![Point::new(0, 0), Point::new(20, 0), Point::new(0, 20)]);
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 100);
        assert_eq!(am.get(1, 0), 50);
        assert_eq!(am.get(0, 1), 50);
        assert_eq!(am.get(1, 1), 0);
    }

    #[test]
    fn holes_subtract_and_winding_is_irrelevant() {
        let mut hull = Rect::from_sides(0, 0, 30, 30).corners().to_vec();
        hull.reverse();
        let hole = Rect::from_sides(10, 10, 20, 20).corners().to_vec();
        let poly = Polygon::with_holes(hull, vec![hole]);
        let mut am = unit_map(3, 3);
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(1, 1), 0);
        assert_eq!(am.get(0, 0), 100);
        assert_eq!(am.get(2, 2), 100);
        assert_eq!(am.total_area(), 800);
    }

    #[test]
    fn gaps_between_pixels_are_ignored() {
        let mut am = AreaMap::with_geometry(Point::zero(), Point::new(20, 10), Point::new(10, 10), 3, 1);
        let poly = Polygon::from_verts(vec![
            Point::new(5, 0),
            Point::new(55, 0),
            Point::new(55, 10),
            Point::new(30, 12),
            Point::new(5, 10),
        ]);
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 50);
        assert_eq!(am.get(1, 0), 100);
        assert_eq!(am.get(2, 0), 100);
        assert_eq!(am.total_area(), 250);
    }

    #[test]
    fn coverage_saturates_and_misses_report_false() {
        let mut am = unit_map(1, 1);
        let poly = Polygon::from(Rect::from_sides(0, 0, 10, 10));
        assert!(rasterize(&poly, &mut am));
        assert!(rasterize(&poly, &mut am));
        assert_eq!(am.get(0, 0), 100);

        let far = Polygon::from(Rect::from_sides(100, 100, 110, 110));
        assert!(!rasterize(&far, &mut am));
        let touching = Polygon::from(Rect::from_sides(10, 0, 20, 10));
        assert!(!rasterize(&touching, &mut am));
    }

    #[test]
    fn rounding_up_marks_any_overlap() {
        // cuts the corner (9,10)-(10,10)-(10,9) off the pixel, half a unit
        let corner = Polygon::from_verts(vec![
            Point::new(-50, 69),
            Point::new(69, -50),
            Point::new(200, -50),
            Point::new(200, 200),
            Point::new(-50, 200),
        ]);
        let mut am = unit_map(1, 1);
        assert!(!rasterize(&corner, &mut am));
        assert_eq!(am.get(0, 0), 0);
        assert!(rasterize_rounded(&corner, &mut am, Rounding::Up));
        assert_eq!(am.get(0, 0), 1);
    }

    fn star() -> Polygon {
        Polygon::from_verts(vec![
            Point::new(99_156_220, 12_963_447),
            Point::new(46, 42),
            Point::new(38_351_493, 92_353_545),
            Point::new(27, 50),
            Point::new(-60_804_681, 79_390_156),
            Point::new(12, 38),
            Point::new(-99_156_116, -12_963_303),
            Point::new(14, 18),
            Point::new(-38_351_361, -92_353_349),
            Point::new(33, 10),
            Point::new(60_804_841, -79_389_908),
            Point::new(48, 22),
        ])
    }

    #[test]
    fn long_slanted_edges_stay_exact() {
        let mut am = unit_map(6, 6);
        assert!(rasterize(&star(), &mut am));
        assert_eq!(am.get(0, 0), 14);
        assert_eq!(am.get(3, 0), 42);
        assert_eq!(am.get(2, 2), 100);
        assert_eq!(am.get(5, 2), 70);
        assert_eq!(am.get(5, 5), 14);
        assert_eq!(am.total_area(), 2916);

        let mut up = unit_map(6, 6);
        assert!(rasterize_rounded(&star(), &mut up, Rounding::Up));
        assert_eq!(up.total_area(), 2940);
    }

    #[test]
    fn complement_coverage_adds_up() {
        let outside = Polygon::with_holes(
            Rect::from_sides(-200_000_000, -200_000_000, 200_000_000, 200_000_000)
                .corners()
                .to_vec(),
            vec![star().hull().to_vec()],
        );
        let mut inner = unit_map(6, 6);
        let mut outer = unit_map(6, 6);
        rasterize(&star(), &mut inner);
        rasterize_rounded(&outside, &mut outer, Rounding::Up);
        for j in 0..6 {
            for i in 0..6 {
                assert_eq!(inner.get(i, j) + outer.get(i, j), 100, "pixel ({i}, {j})");
            }
        }
    }
}
