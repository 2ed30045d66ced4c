//! An import prelude that re-exports commonly used items.

pub use crate::bbox::{Bbox, BoundingUnion};
pub use crate::contains::{Containment, Contains};
pub use crate::point::Point;
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::region::Region;
pub use crate::shape::Shape;
pub use crate::transform::{Transformation, Translate, TranslateMut};
