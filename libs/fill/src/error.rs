//! Fill result and error types.

use geometry::prelude::{Point, Rect};
use layir::LayirError;

/// The [`FillError`] result type.
pub type FillResult<T> = Result<T, FillError>;

/// A fill error.
///
/// Geometry that simply cannot hold a fill cell is not an error; it is
/// reported through the remaining-polygon outputs instead.
#[derive(thiserror::Error, Debug)]
pub enum FillError {
    /// The row step must point to the right.
    #[error("invalid row step {0:?}: the x component must be positive")]
    InvalidRowStep(Point),
    /// The column step must point upward.
    #[error("invalid column step {0:?}: the y component must be positive")]
    InvalidColumnStep(Point),
    /// The row and column steps must span a right-handed lattice.
    #[error("row step {row_step:?} and column step {column_step:?} do not form a right-handed lattice")]
    LeftHandedLattice {
        /// The row step.
        row_step: Point,
        /// The column step.
        column_step: Point,
    },
    /// The fill cell footprint encloses no area.
    #[error("invalid fill cell footprint {0:?}: width and height must be positive")]
    InvalidFootprint(Rect),
    /// Repeated filling did not converge.
    #[error("repeated fill did not converge after {iterations} iterations")]
    IterationLimit {
        /// Iterations completed before giving up.
        iterations: usize,
    },
    /// Another thread panicked while holding the target lock.
    #[error("target lock poisoned")]
    Poisoned,
    /// The placement could not be inserted into the target library.
    #[error(transparent)]
    Layir(#[from] LayirError),
    /// Fill options could not be parsed.
    #[error(transparent)]
    Config(#[from] toml::de::Error),
}
