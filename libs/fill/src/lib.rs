//! Automatic fill of layout regions with instances of a fill cell.
//!
//! A fill cell is placed on the lattice `origin + i * row_step + j * column_step`
//! wherever its footprint lies completely inside the target area and outside
//! the exclusion area. The pipeline is:
//!
//! 1. [`FillDriver`] strips slivers too thin to hold a cell from the target
//!    and the exclusion.
//! 2. [`LatticeRasterizer`] splits the lattice into axis-aligned phases and
//!    rasterizes the target onto one [`AreaMap`] per phase, exactly.
//! 3. [`InstancePacker`] turns the fully covered pixels of each map into
//!    rectangular instance arrays.
//! 4. The driver inserts the placements into the target cell and optionally
//!    reports the area left uncovered, which [`FillDriver::fill_region_repeat`]
//!    fills again until nothing fillable remains.
//!
//! # Example
//!
//! ```
//! use std::sync::Mutex;
//! use fill::{FillDriver, FillTarget};
//! use geometry::prelude::*;
//! use layir::{Cell, LibraryBuilder};
//!
//! let mut lib = LibraryBuilder::<()>::new();
//! let fill_cell = lib.add_cell(Cell::new("fill"));
//! let top = lib.add_cell(Cell::new("top"));
//! let lib = Mutex::new(lib);
//!
//! let driver = FillDriver::orthogonal(
//!     FillTarget::new(&lib, top),
//!     fill_cell,
//!     Rect::from_sides(0, 0, 10, 10),
//! )
//! .unwrap();
//! let summary = driver
//!     .fill_region(&Region::from(Rect::from_sides(0, 0, 100, 50)), None, None)
//!     .unwrap();
//! assert_eq!(summary.placements, 1);
//! assert_eq!(summary.instances, 50);
//! ```

pub mod area_map;
pub mod driver;
pub mod error;
pub mod lattice;
pub mod options;
pub mod pack;
pub mod placement;
pub mod raster;


pub use area_map::{Area, AreaMap};
pub use driver::{FillDriver, FillSummary};
pub use error::{FillError, FillResult};
pub use lattice::LatticeRasterizer;
pub use options::{ExclusionStrategy, FillOptions, FirstHullVertex, OriginStrategy};
pub use pack::{InstancePacker, Packing};
pub use placement::{FillTarget, Placement, PlacementSink};
pub use raster::{rasterize, rasterize_rounded, Rounding};
