//! Reads ".shp" and accompanying ".dbf" files.
//!
//! There are two pieces of information ".shp" and ".dbf" files _don't_
//! contain:
//!
//! * The _projection_ isn't specified. Sometimes there's a ".prj" file that
//!   contains that information, but no file format can represent all the
//!   projections out there in the world. This library ignores the file and
//!   returns `f64` points.
//! * The ".dbf" _encoding_ isn't reliably specified. Callers pick one; the
//!   `open_ascii()`, `open_utf8()` and `open_windows1252()` helpers cover
//!   the common cases.
//!
//! The n-th ".shp" record describes the same feature as the n-th ".dbf"
//! record. Files that disagree on how many records there are won't open.
//!
//! # Examples
//!
//! Open by ".shp" filename:
//!
//! ```no_run
//! use std::path::Path;
//! use gismesh::read::shapefile;
//!
//! let shapefile = shapefile::open_utf8(Path::new("parcels.shp")).unwrap();
//!
//! for feature in shapefile.features() {
//!     println!("{}", feature);
//! }
//! ```
//!
//! Decode files that are already in memory:
//!
//! ```no_run
//! # extern crate encoding;
//! # extern crate gismesh;
//!
//! # fn main() {
//! use std::fs;
//! use gismesh::read::shapefile::Shapefile;
//!
//! let shp = fs::read("parcels.shp").unwrap();
//! let dbf = fs::read("parcels.dbf").unwrap();
//!
//! let shapefile = Shapefile::read(shp, dbf, encoding::all::UTF_8).unwrap();
//! println!("{} {} features", shapefile.len(), shapefile.shape_type());
//! # }
//! ```
//!
//! Dump DBF data:
//!
//! ```no_run
//! use std::path::Path;
//! use gismesh::read::shapefile;
//!
//! let shapefile = shapefile::open_utf8(Path::new("parcels.shp")).unwrap();
//!
//! for feature in shapefile.features() {
//!     for (name, value) in feature.data.iter() {
//!         print!("{}: {}; ", name, value);
//!     }
//!     println!("");
//! }
//! ```

use std::path::Path;

pub mod dbf;
pub mod shp;
pub mod shapefile;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::dbf::{DbfError, DbfField, DbfMeta, DbfRecord, DbfType, DbfValue};
pub use self::shp::{ShpBoundingBox, ShpError, ShpHeader, ShpPoint, ShpPointZ, ShpRecord, ShpShape, ShpShapeType};
pub use self::shapefile::{Feature, Shapefile, ShapefileError};
pub use self::shapefile::{join, open};

pub fn open_ascii(shp_path: &Path) -> Result<Shapefile, ShapefileError> {
    open(shp_path, encoding::all::ASCII)
}

pub fn open_utf8(shp_path: &Path) -> Result<Shapefile, ShapefileError> {
    open(shp_path, encoding::all::UTF_8)
}

pub fn open_windows1252(shp_path: &Path) -> Result<Shapefile, ShapefileError> {
    open(shp_path, encoding::all::WINDOWS_1252)
}
