//! Columnar geometry arrays for tabular data, plus vectorized geometry operations dispatched
//! over those arrays.
//!
//! The central type is [`GeometryArray`][array::GeometryArray], a nullable column of shared
//! geometry handles that a table can slice, gather, concatenate and factorize like any other
//! column. Operations are described once in a static registry ([`dispatch`]) and applied to a
//! column through [`GeoSeries::geos`][table::GeoSeries::geos] or to every geometry column of a
//! table through [`GeoFrame::geos`][table::GeoFrame::geos].

#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use array::GeometryArray;
pub use datatypes::GeometryDtype;
pub use scalar::Geometry;

pub mod array;
pub mod datatypes;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod kernel;
pub mod scalar;
pub mod table;
#[cfg(test)]
pub(crate) mod test;
