//! Labeled series and tables whose columns may hold geometries.
//!
//! [`GeoSeries`] and [`GeoFrame`] are minimal row-labeled containers: enough to carry a
//! [`GeometryArray`](crate::GeometryArray) next to plain Arrow columns, align on row labels and
//! expose the `geos` accessors.

mod accessor;
mod column;
mod frame;
mod index;
pub mod rich;
mod series;

pub use accessor::{GeosAccessor, GeosFrameAccessor, GeosFrameAccessorMut};
pub use column::Column;
pub use frame::GeoFrame;
pub use index::{Label, RowIndex};
pub use rich::{RichColumn, RichFrame, RichSeries};
pub use series::GeoSeries;
