//! Greedy packing of fully covered pixels into instance arrays.

use geometry::prelude::{Point, Polygon, Rect, Transformation};
use layir::{CellId, Repetition};

use crate::area_map::AreaMap;
use crate::placement::Placement;

/// The result of packing one area map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packing {
    /// Placements in emission order.
    pub placements: Vec<Placement>,
    /// Cells placed, with arrays multiplied out.
    pub instances: u64,
    /// Footprints of the placed cells, enlarged by the fill margin.
    ///
    /// Only collected when footprint tracking is enabled.
    pub filled: Vec<Polygon>,
}

/// Converts the full pixels of an [`AreaMap`] into placements of a fill cell.
#[derive(Debug, Clone, Copy)]
pub struct InstancePacker {
    fill_cell: CellId,
    footprint: Rect,
    fill_margin: Option<Point>,
}

impl InstancePacker {
    /// Creates a packer placing `fill_cell`, whose footprint is `footprint`.
    pub fn new(fill_cell: CellId, footprint: Rect) -> Self {
        Self {
            fill_cell,
            footprint,
            fill_margin: None,
        }
    }

    /// Also report the footprint of every placement, enlarged by `margin`.
    pub fn with_filled_tracking(mut self, margin: Point) -> Self {
        self.fill_margin = Some(margin);
        self
    }

    /// Packs the full pixels of `am`, zeroing every pixel it consumes.
    ///
    /// Pixels with nonzero coverage in `exclusion`, a map with the same grid,
    /// are never used. Columns are scanned left to right and pixels bottom to
    /// top. Each unused full pixel starts the tallest run of usable pixels in
    /// its column, which is then widened to the right for as long as the whole
    /// run stays usable.
    pub fn create_instances(&self, am: &mut AreaMap, exclusion: Option<&AreaMap>) -> Packing {
        if let Some(ex) = exclusion {
            debug_assert_eq!((ex.nx(), ex.ny(), ex.d()), (am.nx(), am.ny(), am.d()));
        }
        let usable = |am: &AreaMap, i: usize, j: usize| {
            am.is_full(i, j) && exclusion.map_or(true, |ex| ex.get(i, j) <= 0)
        };

        let mut packing = Packing::default();
        let (nx, ny) = (am.nx(), am.ny());
        let (d, p) = (am.d(), am.p());

        for i in 0..nx {
            let mut j = 0;
            while j < ny {
                if !usable(am, i, j) {
                    j += 1;
                    continue;
                }

                let mut jj = j + 1;
                while jj < ny && usable(am, i, jj) {
                    jj += 1;
                }
                let mut ii = i + 1;
                while ii < nx && (j..jj).all(|k| usable(am, ii, k)) {
                    ii += 1;
                }

                for x in i..ii {
                    for y in j..jj {
                        *am.get_mut(x, y) = 0;
                    }
                }

                let trans = Transformation::from_offset(
                    am.pixel_origin(i, j) - self.footprint.lower_left(),
                );
                let (rows, columns) = ((jj - j) as u64, (ii - i) as u64);
                let placement = if rows > 1 || columns > 1 {
                    Placement::array(
                        self.fill_cell,
                        trans,
                        Repetition::new(Point::new(0, d.y), rows, Point::new(d.x, 0), columns),
                    )
                } else {
                    Placement::single(self.fill_cell, trans)
                };
                packing.placements.push(placement);
                packing.instances += rows * columns;

                if let Some(margin) = self.fill_margin {
                    if d == p {
                        let block = Rect::new(
                            am.pixel_origin(i, j),
                            am.pixel_origin(ii - 1, jj - 1) + p,
                        );
                        packing.filled.extend(block.enlarge(margin).map(Polygon::from));
                    } else {
                        for x in i..ii {
                            for y in j..jj {
                                packing
                                    .filled
                                    .extend(am.pixel(x, y).enlarge(margin).map(Polygon::from));
                            }
                        }
                    }
                }

                j = jj;
            }
        }

        packing
    }
}
