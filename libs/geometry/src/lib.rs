//! 2-D integer geometry for layout fill.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect) and carve a gap out of it:
//!
//! ```
//! # use geometry::prelude::*;
//! let target = Region::from(Rect::from_sides(0, 0, 100, 50));
//! let gap = Region::from(Rect::from_sides(40, 0, 60, 50));
//! assert_eq!(target.not(&gap).len(), 2);
//! ```
#![warn(missing_docs)]

pub mod bbox;
pub mod contains;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod region;
pub mod shape;
pub mod transform;
