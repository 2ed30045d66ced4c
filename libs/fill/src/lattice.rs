//! Rasterization of polygons onto every phase of a placement lattice.
//!
//! A lattice spanned by a row step `r` and a column step `c` is generally not
//! axis aligned, so its points cannot be described by a single rectangular
//! pixel grid. It does contain an axis-aligned super lattice, spanned by
//! `(pitch.x, 0)` and `(0, pitch.y)`. Every lattice point lies on exactly one
//! translate ("phase") of that super lattice, and each phase gets its own
//! [`AreaMap`].

use std::collections::HashSet;

use geometry::prelude::{Point, Polygon, Rect};
use num::integer::{div_ceil, div_floor, gcd};

use crate::area_map::AreaMap;
use crate::raster::{rasterize_rounded, Rounding};

/// The retained per-phase coverage maps of a polygon set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeRasterizer {
    row_step: Point,
    column_step: Point,
    origin: Point,
    row_steps: i64,
    column_steps: i64,
    columns_per_row: i64,
    rows_per_column: i64,
    pitch: Point,
    area_maps: Vec<AreaMap>,
}

impl LatticeRasterizer {
    /// Rasterizes `polygons` inside `rasterized_area` for every phase of the
    /// lattice `origin + i * row_step + j * column_step`, using pixels of size `dim`.
    ///
    /// Only phases with nonzero coverage are kept. The steps must satisfy
    /// `row_step.x > 0`, `column_step.y > 0` and `row_step x column_step > 0`,
    /// and `dim` must be positive in both directions.
    pub fn new(
        polygons: &[Polygon],
        rasterized_area: Rect,
        row_step: Point,
        column_step: Point,
        origin: Point,
        dim: Point,
    ) -> Self {
        Self::build(polygons, rasterized_area, row_step, column_step, origin, dim, Rounding::Down)
    }

    /// Like [`LatticeRasterizer::new`], but for blocking polygons: every pixel
    /// the polygons overlap by any positive area gets nonzero coverage.
    pub fn mask(
        polygons: &[Polygon],
        rasterized_area: Rect,
        row_step: Point,
        column_step: Point,
        origin: Point,
        dim: Point,
    ) -> Self {
        Self::build(polygons, rasterized_area, row_step, column_step, origin, dim, Rounding::Up)
    }

    fn build(
        polygons: &[Polygon],
        rasterized_area: Rect,
        row_step: Point,
        column_step: Point,
        origin: Point,
        dim: Point,
        rounding: Rounding,
    ) -> Self {
        debug_assert!(row_step.x > 0 && column_step.y > 0 && row_step.vprod(column_step) > 0);
        debug_assert!(dim.x > 0 && dim.y > 0);

        let (rx, ry) = (row_step.x, row_step.y);
        let (cx, cy) = (column_step.x, column_step.y);
        let det = rx * cy - ry * cx;

        // smallest multiples of each step whose sheared component the other step can cancel
        let g_row = gcd(cy, ry);
        let g_col = gcd(rx, cx);
        let mut row_steps = cy / g_row;
        let mut column_steps = rx / g_col;
        let mut pitch = Point::new(det / g_row, det / g_col);

        // pixels of one phase must not overlap
        let kx = (dim.x - 1) / pitch.x + 1;
        let ky = (dim.y - 1) / pitch.y + 1;
        row_steps *= kx;
        column_steps *= ky;
        pitch = Point::new(pitch.x * kx, pitch.y * ky);

        let columns_per_row = row_steps * ry / cy;
        let rows_per_column = column_steps * cx / rx;

        let mut rasterizer = Self {
            row_step,
            column_step,
            origin,
            row_steps,
            column_steps,
            columns_per_row,
            rows_per_column,
            pitch,
            area_maps: Vec::new(),
        };

        let ex = (cx * column_steps).abs().max((rx * row_steps).abs()).max(pitch.x);
        let ey = (cy * column_steps).abs().max((ry * row_steps).abs()).max(pitch.y);
        let Some(area) = rasterized_area.enlarge(Point::new(ex, ey)) else {
            return rasterizer;
        };

        let left = origin.x + div_floor(area.left() - origin.x, pitch.x) * pitch.x;
        let bot = origin.y + div_floor(area.bot() - origin.y, pitch.y) * pitch.y;
        let right = origin.x + div_ceil(area.right() - origin.x, pitch.x) * pitch.x;
        let top = origin.y + div_ceil(area.top() - origin.y, pitch.y) * pitch.y;
        let nx = ((right - left) / pitch.x) as usize;
        let ny = ((top - bot) / pitch.y) as usize;

        let phases = rasterizer.phase_offsets();
        let mut am = AreaMap::new();
        for offset in &phases {
            am.reinitialize(Point::new(left, bot) + *offset, pitch, dim, nx, ny);
            let mut any = false;
            for polygon in polygons {
                any |= rasterize_rounded(polygon, &mut am, rounding);
            }
            if any {
                rasterizer.area_maps.push(std::mem::take(&mut am));
            }
        }

        tracing::trace!(
            phases = phases.len(),
            retained = rasterizer.area_maps.len(),
            pitch_x = pitch.x,
            pitch_y = pitch.y,
            nx,
            ny,
            "rasterized lattice phases"
        );
        rasterizer
    }

    /// Offsets of every phase relative to the super lattice, each reduced into `[0, pitch)`.
    ///
    /// The `row_steps x column_steps` grid phases come first. Lattice points
    /// of the super cell that the grid misses (the "dead corners" a sheared
    /// lattice leaves) follow, in lattice-coordinate order.
    fn phase_offsets(&self) -> Vec<Point> {
        let pitch = self.pitch;
        let reduce = |v: Point| Point::new(v.x.rem_euclid(pitch.x), v.y.rem_euclid(pitch.y));

        let mut seen = HashSet::new();
        let mut offsets = Vec::new();
        for ic in 0..self.column_steps {
            for ir in 0..self.row_steps {
                let offset = reduce(self.row_step * ir + self.column_step * ic);
                if seen.insert(offset) {
                    offsets.push(offset);
                }
            }
        }

        let det = self.row_step.vprod(self.column_step) as i64;
        let expected = (pitch.x * pitch.y / det) as usize;
        if offsets.len() < expected {
            let (r, c) = (self.row_step, self.column_step);
            let corners = [
                Point::zero(),
                Point::new(pitch.x, 0),
                Point::new(0, pitch.y),
                pitch,
            ];
            // lattice coordinates (a, b) of a point p solve p = a * r + b * c
            let a_num = |p: Point| p.x * c.y - p.y * c.x;
            let b_num = |p: Point| p.y * r.x - p.x * r.y;
            let a_min = corners.iter().map(|&p| div_floor(a_num(p), det)).min().unwrap_or(0);
            let a_max = corners.iter().map(|&p| div_ceil(a_num(p), det)).max().unwrap_or(0);
            let b_min = corners.iter().map(|&p| div_floor(b_num(p), det)).min().unwrap_or(0);
            let b_max = corners.iter().map(|&p| div_ceil(b_num(p), det)).max().unwrap_or(0);
            for b in b_min..=b_max {
                for a in a_min..=a_max {
                    let v = r * a + c * b;
                    if (0..pitch.x).contains(&v.x)
                        && (0..pitch.y).contains(&v.y)
                        && seen.insert(v)
                    {
                        offsets.push(v);
                    }
                }
            }
        }
        debug_assert_eq!(offsets.len(), expected);
        offsets
    }

    /// The retained area maps, one per phase with coverage.
    pub fn area_maps(&self) -> &[AreaMap] {
        &self.area_maps
    }

    /// Mutable access to the retained area maps.
    pub fn area_maps_mut(&mut self) -> &mut [AreaMap] {
        &mut self.area_maps
    }

    /// Consumes the rasterizer, returning its area maps.
    pub fn into_area_maps(self) -> Vec<AreaMap> {
        self.area_maps
    }

    /// Finds the retained area map whose first pixel sits at `p0`.
    pub fn find(&self, p0: Point) -> Option<&AreaMap> {
        self.area_maps.iter().find(|am| am.p0() == p0)
    }

    /// The number of retained phases.
    pub fn len(&self) -> usize {
        self.area_maps.len()
    }

    /// Returns true if no phase has coverage.
    pub fn is_empty(&self) -> bool {
        self.area_maps.is_empty()
    }

    /// The axis-aligned super lattice pitch shared by all phases.
    pub fn pitch(&self) -> Point {
        self.pitch
    }

    /// The lattice origin.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Multiple of the row step spanning one horizontal super lattice period.
    pub fn row_steps(&self) -> i64 {
        self.row_steps
    }

    /// Multiple of the column step spanning one vertical super lattice period.
    pub fn column_steps(&self) -> i64 {
        self.column_steps
    }

    /// Column steps cancelled against `row_steps` row steps (signed).
    pub fn columns_per_row(&self) -> i64 {
        self.columns_per_row
    }

    /// Row steps cancelled against `column_steps` column steps (signed).
    pub fn rows_per_column(&self) -> i64 {
        self.rows_per_column
    }
}
