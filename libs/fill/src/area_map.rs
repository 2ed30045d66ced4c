//! Per-pixel coverage accumulators on a regular grid.

use geometry::prelude::{Point, Rect};

/// Covered area, in squared database units.
pub type Area = i64;

/// A grid of `nx * ny` pixels holding the area covered inside each pixel.
///
/// Pixel `(i, j)` spans the rectangle from `p0 + (i * d.x, j * d.y)` to that
/// corner plus `p`. The pitch `d` may exceed the pixel size `p`, leaving gaps
/// between neighbouring pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaMap {
    p0: Point,
    d: Point,
    p: Point,
    nx: usize,
    ny: usize,
    av: Vec<Area>,
}

impl AreaMap {
    /// Creates an empty map with no pixels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zeroed map with the given geometry.
    pub fn with_geometry(p0: Point, d: Point, p: Point, nx: usize, ny: usize) -> Self {
        let mut am = Self::new();
        am.reinitialize(p0, d, p, nx, ny);
        am
    }

    /// Resets the grid geometry and zeroes every accumulator.
    ///
    /// # Panics
    ///
    /// Panics if the pitch or pixel size is not positive, or if the pixel
    /// is larger than the pitch.
    pub fn reinitialize(&mut self, p0: Point, d: Point, p: Point, nx: usize, ny: usize) {
        assert!(
            d.x > 0 && d.y > 0,
            "area map pitch must be positive, got {:?}",
            d
        );
        assert!(
            p.x > 0 && p.y > 0 && p.x <= d.x && p.y <= d.y,
            "area map pixel {:?} must be positive and fit the pitch {:?}",
            p,
            d
        );
        self.p0 = p0;
        self.d = d;
        self.p = p;
        self.nx = nx;
        self.ny = ny;
        self.av.clear();
        self.av.resize(nx * ny, 0);
    }

    /// The lower-left corner of pixel `(0, 0)`.
    #[inline]
    pub fn p0(&self) -> Point {
        self.p0
    }

    /// The pixel pitch.
    #[inline]
    pub fn d(&self) -> Point {
        self.d
    }

    /// The pixel size.
    #[inline]
    pub fn p(&self) -> Point {
        self.p
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.nx && y < self.ny,
            "pixel ({}, {}) outside {}x{} area map",
            x,
            y,
            self.nx,
            self.ny
        );
        y * self.nx + x
    }

    /// The area accumulated in pixel `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Area {
        self.av[self.index(x, y)]
    }

    /// Mutable access to the accumulator of pixel `(x, y)`.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Area {
        let i = self.index(x, y);
        &mut self.av[i]
    }

    /// The area of a single pixel.
    #[inline]
    pub fn pixel_area(&self) -> Area {
        self.p.x * self.p.y
    }

    /// Returns true if pixel `(x, y)` is completely covered.
    #[inline]
    pub fn is_full(&self, x: usize, y: usize) -> bool {
        self.get(x, y) >= self.pixel_area()
    }

    /// The lower-left corner of pixel `(x, y)`.
    #[inline]
    pub fn pixel_origin(&self, x: usize, y: usize) -> Point {
        self.p0 + Point::new(self.d.x * x as i64, self.d.y * y as i64)
    }

    /// The footprint of pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Rect {
        let ll = self.pixel_origin(x, y);
        Rect::new(ll, ll + self.p)
    }

    /// The sum of all accumulators.
    pub fn total_area(&self) -> Area {
        self.av.iter().sum()
    }

    /// Returns true if any pixel has nonzero coverage.
    pub fn has_coverage(&self) -> bool {
        self.av.iter().any(|&a| a != 0)
    }

    /// Sets every accumulator to zero.
    pub fn clear(&mut self) {
        self.av.iter_mut().for_each(|a| *a = 0);
    }

    /// Shifts the grid by `delta`, zeroing the accumulators.
    ///
    /// Coverage is tied to absolute positions, so it is stale after a move.
    pub fn move_by(&mut self, delta: Point) {
        self.p0 += delta;
        self.clear();
    }

    /// The extent from the first pixel's lower-left corner to the last pixel's upper-right corner.
    ///
    /// Returns `None` for a map without pixels.
    pub fn bbox(&self) -> Option<Rect> {
        if self.nx == 0 || self.ny == 0 {
            return None;
        }
        let ur = self.pixel_origin(self.nx - 1, self.ny - 1) + self.p;
        Some(Rect::new(self.p0, ur))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_and_storage() {
        let mut am = AreaMap::with_geometry(
            Point::new(-5, 10),
            Point::new(12, 20),
            Point::new(10, 10),
            3,
            2,
        );
        assert_eq!(am.pixel_area(), 100);
        assert_eq!(am.total_area(), 0);
        assert_eq!(am.bbox(), Some(Rect::from_sides(-5, 10, 29, 40)));
        assert_eq!(am.pixel(2, 1), Rect::from_sides(19, 30, 29, 40));

        *am.get_mut(2, 1) = 100;
        *am.get_mut(0, 0) = 7;
        assert!(am.is_full(2, 1));
        assert!(!am.is_full(0, 0));
        assert_eq!(am.total_area(), 107);

        am.move_by(Point::new(1, 1));
        assert_eq!(am.p0(), Point::new(-4, 11));
        assert!(!am.has_coverage());
    }

    #[test]
    fn reinitialize_zeroes() {
        let mut am = AreaMap::with_geometry(Point::zero(), Point::new(1, 1), Point::new(1, 1), 2, 2);
        *am.get_mut(1, 1) = 1;
        am.reinitialize(Point::zero(), Point::new(2, 2), Point::new(1, 1), 4, 1);
        assert_eq!((am.nx(), am.ny()), (4, 1));
        assert_eq!(am.total_area(), 0);
        assert_eq!(AreaMap::new().bbox(), None);
    }

    #[test]
    #[should_panic]
    fn oversized_pixel_panics() {
        AreaMap::with_geometry(Point::zero(), Point::new(5, 5), Point::new(6, 5), 1, 1);
    }
}
