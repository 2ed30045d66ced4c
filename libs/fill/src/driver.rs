//! Polygon and region fill drivers.

use std::fmt;
use std::sync::Arc;

use geometry::prelude::{Bbox, Contains, Point, Polygon, Rect, Region};
use layir::CellId;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, span, trace, warn, Level};

use crate::error::{FillError, FillResult};
use crate::lattice::LatticeRasterizer;
use crate::options::{ExclusionStrategy, FillOptions, FirstHullVertex, OriginStrategy};
use crate::pack::InstancePacker;
use crate::placement::{FillTarget, PlacementSink};

/// Totals of a region fill.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FillSummary {
    /// Merged polygons processed.
    pub polygons: usize,
    /// Processed polygons that received no placement.
    pub unfilled_polygons: usize,
    /// Placements emitted. Arrays count once.
    pub placements: usize,
    /// Cells placed, with arrays multiplied out.
    pub instances: u64,
    /// Passes over the region.
    pub iterations: usize,
}

impl FillSummary {
    fn absorb(&mut self, other: FillSummary) {
        self.polygons += other.polygons;
        self.unfilled_polygons += other.unfilled_polygons;
        self.placements += other.placements;
        self.instances += other.instances;
        self.iterations += other.iterations;
    }
}

/// Parameters of one pass over a region.
#[derive(Debug, Clone, Copy)]
struct Pass {
    enhanced: bool,
    origin: Point,
    strategy: ExclusionStrategy,
    track_residual: bool,
}

/// What filling a single polygon achieved.
#[derive(Debug, Default, Clone, Copy)]
struct PolygonFill {
    placements: usize,
    instances: u64,
    exclusion_applied: bool,
}

/// Fills polygons with a fill cell placed on a row/column lattice.
///
/// Placements go into the target cell through a [`FillTarget`], which only
/// locks the container while a placement is inserted. Drivers for disjoint
/// areas may therefore run concurrently against the same library.
pub struct FillDriver<'a, S> {
    target: FillTarget<'a, S>,
    fill_cell: CellId,
    footprint: Rect,
    row_step: Point,
    column_step: Point,
    options: FillOptions,
    exclusion: Region,
    prepared_exclusion: Region,
    origin_strategy: Arc<dyn OriginStrategy>,
}

impl<S> fmt::Debug for FillDriver<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillDriver")
            .field("target", &self.target.cell())
            .field("fill_cell", &self.fill_cell)
            .field("footprint", &self.footprint)
            .field("row_step", &self.row_step)
            .field("column_step", &self.column_step)
            .field("options", &self.options)
            .field("exclusion", &self.exclusion.len())
            .field("origin_strategy", &self.origin_strategy)
            .finish()
    }
}

impl<'a, S: PlacementSink> FillDriver<'a, S> {
    /// Creates a driver placing `fill_cell`, whose footprint is `footprint`, at
    /// the points `origin + i * row_step + j * column_step`.
    ///
    /// The footprint must have positive width and height. The row step must
    /// point right, the column step up, and together they must form a
    /// right-handed lattice.
    pub fn new(
        target: FillTarget<'a, S>,
        fill_cell: CellId,
        footprint: Rect,
        row_step: Point,
        column_step: Point,
    ) -> FillResult<Self> {
        if footprint.width() <= 0 || footprint.height() <= 0 {
            return Err(FillError::InvalidFootprint(footprint));
        }
        if row_step.x <= 0 {
            return Err(FillError::InvalidRowStep(row_step));
        }
        if column_step.y <= 0 {
            return Err(FillError::InvalidColumnStep(column_step));
        }
        if row_step.vprod(column_step) <= 0 {
            return Err(FillError::LeftHandedLattice {
                row_step,
                column_step,
            });
        }
        Ok(Self {
            target,
            fill_cell,
            footprint,
            row_step,
            column_step,
            options: FillOptions::default(),
            exclusion: Region::new(),
            prepared_exclusion: Region::new(),
            origin_strategy: Arc::new(FirstHullVertex),
        })
    }

    /// Creates a driver that tiles the footprint without gaps.
    pub fn orthogonal(
        target: FillTarget<'a, S>,
        fill_cell: CellId,
        footprint: Rect,
    ) -> FillResult<Self> {
        Self::new(
            target,
            fill_cell,
            footprint,
            Point::new(footprint.width(), 0),
            Point::new(0, footprint.height()),
        )
    }

    pub fn with_options(mut self, options: FillOptions) -> Self {
        self.options = options;
        self
    }

    /// Keeps fill cells out of `exclusion`.
    pub fn with_exclusion(mut self, exclusion: Region) -> Self {
        self.prepared_exclusion = if exclusion.is_empty() {
            Region::new()
        } else {
            self.remove_slivers(&exclusion)
        };
        self.exclusion = exclusion;
        self
    }

    pub fn with_origin_strategy(mut self, strategy: impl OriginStrategy + 'static) -> Self {
        self.origin_strategy = Arc::new(strategy);
        self
    }

    #[inline]
    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    #[inline]
    pub fn exclusion(&self) -> &Region {
        &self.exclusion
    }

    /// Fills a single polygon.
    ///
    /// If `remaining_parts` is given, the parts of the polygon that are neither
    /// covered by a placement nor excluded are added to it.
    ///
    /// Returns true if a cell was placed or the exclusion overlaps the polygon.
    pub fn fill_polygon(
        &self,
        polygon: &Polygon,
        mut remaining_parts: Option<&mut Region>,
    ) -> FillResult<bool> {
        let pass = self.pass(
            self.options.enhanced_fill,
            self.options.origin,
            remaining_parts.is_some(),
        );
        let fill = self.fill_polygon_impl(polygon, &pass, remaining_parts.as_deref_mut())?;
        if fill.instances == 0 && fill.exclusion_applied {
            if let Some(parts) = remaining_parts {
                parts.extend(self.unexcluded(polygon).into_polygons());
            }
        }
        Ok(fill.instances > 0 || fill.exclusion_applied)
    }

    /// Fills every merged polygon of `region`.
    ///
    /// Residual parts of polygons that received fill are added to
    /// `remaining_parts`. Polygons that received none are added, less the
    /// exclusion, to `remaining_polygons`.
    pub fn fill_region(
        &self,
        region: &Region,
        remaining_parts: Option<&mut Region>,
        remaining_polygons: Option<&mut Region>,
    ) -> FillResult<FillSummary> {
        let pass = self.pass(
            self.options.enhanced_fill,
            self.options.origin,
            remaining_parts.is_some(),
        );
        let mut summary = self.fill_region_pass(region, &pass, 0, remaining_parts, remaining_polygons)?;
        summary.iterations = 1;
        Ok(summary)
    }

    /// Fills `region`, then keeps filling the residue of the previous pass until nothing is left.
    ///
    /// Every pass uses enhanced fill with the configured origin. Polygons that
    /// receive no fill in a pass are not retried; they are added to
    /// `remaining` instead.
    ///
    /// Fails with [`FillError::IterationLimit`] once the configured maximum
    /// number of passes is exhausted.
    pub fn fill_region_repeat(
        &self,
        region: &Region,
        mut remaining: Option<&mut Region>,
    ) -> FillResult<FillSummary> {
        let mut summary = FillSummary::default();
        let mut current = region.merged();
        let mut iteration = 0;

        while !current.is_empty() {
            if let Some(max) = self.options.max_iterations {
                if iteration >= max {
                    error!(
                        iterations = iteration,
                        residual_polygons = current.len(),
                        "repeated fill did not converge"
                    );
                    return Err(FillError::IterationLimit {
                        iterations: iteration,
                    });
                }
            }

            let pass = self.pass(true, self.options.origin, true);
            let mut parts = Region::new();
            let mut failed = Region::new();
            let pass_summary =
                self.fill_region_pass(&current, &pass, iteration, Some(&mut parts), Some(&mut failed))?;
            summary.absorb(pass_summary);
            summary.iterations += 1;
            if let Some(remaining) = remaining.as_deref_mut() {
                remaining.extend(failed.into_polygons());
            }
            current = parts.merged();
            iteration += 1;
        }

        debug!(
            iterations = summary.iterations,
            instances = summary.instances,
            "repeated fill converged"
        );
        Ok(summary)
    }

    fn pass(&self, enhanced: bool, origin: Point, track_residual: bool) -> Pass {
        let strategy = match self.options.exclusion_strategy {
            ExclusionStrategy::Auto if enhanced || track_residual => ExclusionStrategy::Subtractive,
            ExclusionStrategy::Auto => ExclusionStrategy::DualMask,
            ExclusionStrategy::DualMask if enhanced || track_residual => {
                warn!(
                    enhanced,
                    track_residual,
                    "dual mask exclusion is incompatible with enhanced fill and residual tracking, using subtractive exclusion"
                );
                ExclusionStrategy::Subtractive
            }
            strategy => strategy,
        };
        Pass {
            enhanced,
            origin,
            strategy,
            track_residual,
        }
    }

    fn fill_region_pass(
        &self,
        region: &Region,
        pass: &Pass,
        iteration: usize,
        mut remaining_parts: Option<&mut Region>,
        mut remaining_polygons: Option<&mut Region>,
    ) -> FillResult<FillSummary> {
        let span = span!(Level::INFO, "fill region", iteration);
        let _guard = span.enter();

        let merged = region.merged();
        let total = merged.len();
        let mut summary = FillSummary::default();

        for (index, polygon) in merged.iter().enumerate() {
            let fill = self.fill_polygon_impl(polygon, pass, remaining_parts.as_deref_mut())?;
            summary.polygons += 1;
            summary.placements += fill.placements;
            summary.instances += fill.instances;
            if fill.instances == 0 {
                summary.unfilled_polygons += 1;
                if let Some(polygons) = remaining_polygons.as_deref_mut() {
                    if fill.exclusion_applied {
                        polygons.extend(self.unexcluded(polygon).into_polygons());
                    } else {
                        polygons.insert(polygon.clone());
                    }
                }
            }
            debug!(
                polygon = index + 1,
                total,
                instances = fill.instances,
                "filled polygon"
            );
        }

        Ok(summary)
    }

    fn fill_polygon_impl(
        &self,
        polygon: &Polygon,
        pass: &Pass,
        remaining_parts: Option<&mut Region>,
    ) -> FillResult<PolygonFill> {
        let fp0 = Region::from(polygon.clone());
        let mut fill = PolygonFill {
            exclusion_applied: !self.exclusion.is_empty() && fp0.and(&self.exclusion).area2() > 0,
            ..Default::default()
        };

        let packer = if pass.track_residual {
            InstancePacker::new(self.fill_cell, self.footprint)
                .with_filled_tracking(self.options.fill_margin)
        } else {
            InstancePacker::new(self.fill_cell, self.footprint)
        };
        let dim = self.footprint.dims();
        let mut filled = Region::new();

        match pass.strategy {
            ExclusionStrategy::DualMask => {
                let fpa = self.remove_slivers(&fp0);
                let Some(bbox) = fpa.bbox() else {
                    return Ok(fill);
                };
                let mut lattice = LatticeRasterizer::new(
                    fpa.polygons(),
                    bbox,
                    self.row_step,
                    self.column_step,
                    pass.origin,
                    dim,
                );
                let mask = (!self.prepared_exclusion.is_empty()).then(|| {
                    LatticeRasterizer::mask(
                        self.prepared_exclusion.polygons(),
                        bbox,
                        self.row_step,
                        self.column_step,
                        pass.origin,
                        dim,
                    )
                });
                for am in lattice.area_maps_mut() {
                    let excluded = mask.as_ref().and_then(|mask| mask.find(am.p0()));
                    let packing = packer.create_instances(am, excluded);
                    fill.placements += packing.placements.len();
                    fill.instances += packing.instances;
                    filled.extend(packing.filled);
                    for placement in packing.placements {
                        self.target.insert(placement)?;
                    }
                }
            }
            _ => {
                let fpa = if self.prepared_exclusion.is_empty() {
                    self.remove_slivers(&fp0)
                } else {
                    self.remove_slivers(&fp0.not(&self.prepared_exclusion))
                };
                for sub in fpa.iter() {
                    let Some(bbox) = sub.bbox() else {
                        continue;
                    };
                    let origin = self.polygon_origin(sub, bbox, pass);
                    trace!(?origin, ?bbox, "rasterizing sub-polygon");
                    let mut lattice = LatticeRasterizer::new(
                        std::slice::from_ref(sub),
                        bbox,
                        self.row_step,
                        self.column_step,
                        origin,
                        dim,
                    );
                    for am in lattice.area_maps_mut() {
                        let packing = packer.create_instances(am, None);
                        fill.placements += packing.placements.len();
                        fill.instances += packing.instances;
                        filled.extend(packing.filled);
                        for placement in packing.placements {
                            self.target.insert(placement)?;
                        }
                    }
                }
            }
        }

        if fill.instances > 0 {
            if let Some(parts) = remaining_parts {
                let covered = filled.or(&self.exclusion);
                parts.extend(fp0.not(&covered).into_polygons());
            }
        }
        Ok(fill)
    }

    /// The lattice origin of a sub-polygon.
    fn polygon_origin(&self, polygon: &Polygon, bbox: Rect, pass: &Pass) -> Point {
        if !pass.enhanced {
            return pass.origin;
        }
        match self.options.glue_box {
            Some(glue) if !glue.encloses(&bbox) => pass.origin,
            _ => self.origin_strategy.origin(polygon, pass.origin),
        }
    }

    /// Removes parts of `region` too thin to hold the fill cell.
    ///
    /// Each axis is opened separately. Erosion runs on the merged region,
    /// dilation polygon by polygon, so slivers are not reintroduced by merging.
    fn remove_slivers(&self, region: &Region) -> Region {
        let dx = (self.footprint.width() / 2 - 1).max(0);
        let dy = (self.footprint.height() / 2 - 1).max(0);
        let mut region = region.clone();
        for (sx, sy) in [(dx, 0), (0, dy)] {
            if sx == 0 && sy == 0 {
                continue;
            }
            region.set_merged_semantics(true);
            region.size(-sx, -sy);
            region.set_merged_semantics(false);
            region.size(sx, sy);
        }
        region.set_merged_semantics(true);
        region.merged()
    }

    /// The parts of `polygon` outside the exclusion.
    fn unexcluded(&self, polygon: &Polygon) -> Region {
        Region::from(polygon.clone()).not(&self.exclusion)
    }
}
