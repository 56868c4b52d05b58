//! Decodes ".shp"/".dbf" pairs and flattens them into mesh buffers.
//!
//! * `read::shapefile` decodes both files and joins them by position.
//! * `mesh` turns the joined features into points, connectivity and
//!   per-cell attribute arrays, and hands them to a `MeshSink`.

pub mod read;
pub mod mesh;

pub use crate::mesh::{export, flatten, ExportError, ExportOptions, MeshBuffers, MeshSink};
pub use crate::read::shapefile::{Shapefile, ShapefileError};
