//! Fill configuration.

use std::fmt::Debug;

use geometry::prelude::{Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::error::FillResult;

/// The default cap on repeat-fill iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 256;

/// How an exclusion region keeps fill cells away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionStrategy {
    /// Subtractive when enhanced fill or residual tracking is active,
    /// dual mask otherwise.
    #[default]
    Auto,
    /// Remove the exclusion from the target polygon before rasterizing.
    Subtractive,
    /// Rasterize the exclusion on the same lattice and skip any pixel it touches.
    ///
    /// Cannot be combined with enhanced fill or residual tracking; such fills
    /// fall back to [`ExclusionStrategy::Subtractive`].
    DualMask,
}

/// Options controlling a [`FillDriver`](crate::FillDriver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillOptions {
    /// The lattice origin.
    pub origin: Point,
    /// Picks a lattice origin per polygon using the driver's [`OriginStrategy`].
    pub enhanced_fill: bool,
    /// Enlargement of placed footprints when computing residual area.
    pub fill_margin: Point,
    /// With enhanced fill, polygons not enclosed by this box keep [`FillOptions::origin`].
    pub glue_box: Option<Rect>,
    pub exclusion_strategy: ExclusionStrategy,
    /// Maximum number of passes of a repeated fill. `None` removes the limit.
    pub max_iterations: Option<usize>,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            origin: Point::zero(),
            enhanced_fill: false,
            fill_margin: Point::zero(),
            glue_box: None,
            exclusion_strategy: ExclusionStrategy::default(),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }
}

impl FillOptions {
    /// Parses options from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> FillResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_enhanced_fill(mut self, enhanced_fill: bool) -> Self {
        self.enhanced_fill = enhanced_fill;
        self
    }

    pub fn with_fill_margin(mut self, fill_margin: Point) -> Self {
        self.fill_margin = fill_margin;
        self
    }

    pub fn with_glue_box(mut self, glue_box: Rect) -> Self {
        self.glue_box = Some(glue_box);
        self
    }

    pub fn with_exclusion_strategy(mut self, exclusion_strategy: ExclusionStrategy) -> Self {
        self.exclusion_strategy = exclusion_strategy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Chooses the lattice origin of a single polygon during enhanced fill.
pub trait OriginStrategy: Debug + Send + Sync {
    /// The origin to use for `polygon`, or `fallback` if the strategy has no opinion.
    fn origin(&self, polygon: &Polygon, fallback: Point) -> Point;
}

/// Anchors the lattice at the first vertex of the polygon's hull.
///
/// Boolean results start their hull at the lowest vertex, leftmost on ties.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FirstHullVertex;

impl OriginStrategy for FirstHullVertex {
    fn origin(&self, polygon: &Polygon, fallback: Point) -> Point {
        polygon.hull().first().copied().unwrap_or(fallback)
    }
}
