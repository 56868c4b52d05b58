use std::fmt;
use std::path::{Path, PathBuf};
use encoding::EncodingRef;
use log::info;
use thiserror::Error;

use super::dbf;
use super::shp;

#[derive(Debug, Error)]
pub enum ShapefileError {
    #[error(transparent)]
    ShpError(#[from] shp::ShpError),

    #[error(transparent)]
    DbfError(#[from] dbf::DbfError),

    #[error("'.shp' file has {n_shapes} records, but '.dbf' file has {n_records}")]
    JoinMismatch { n_shapes: usize, n_records: usize },
}

/// A shape and its attributes: the n-th ".shp" record with the n-th ".dbf"
/// record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub shape: shp::ShpRecord,
    pub data: dbf::DbfRecord,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {{{}}}", self.shape, self.data)
    }
}

/// Pairs shapes with records by position.
///
/// Fails, returning nothing, unless there are exactly as many of each.
pub fn join(shapes: Box<[shp::ShpRecord]>, records: Box<[dbf::DbfRecord]>) -> Result<Box<[Feature]>, ShapefileError> {
    if shapes.len() != records.len() {
        return Err(ShapefileError::JoinMismatch { n_shapes: shapes.len(), n_records: records.len() });
    }

    let features: Vec<Feature> = shapes.into_vec().into_iter()
        .zip(records.into_vec().into_iter())
        .map(|(shape, data)| Feature { shape: shape, data: data })
        .collect();

    Ok(features.into_boxed_slice())
}

/// A fully-decoded ".shp" and ".dbf" pair.
///
/// # Examples
///
/// ```
/// # extern crate encoding;
/// # extern crate gismesh;
///
/// # fn main() {
/// use gismesh::read::shapefile::Shapefile;
///
/// // A .shp with no shapes, and a .dbf with no fields and no records
/// let mut shp = vec![ 0, 0, 0x27, 0x0a ];
/// shp.extend_from_slice(&[ 0; 20 ]);
/// shp.extend_from_slice(&[ 0, 0, 0, 50 ]); // 50 words == 100 bytes
/// shp.extend_from_slice(&[ 0xe8, 0x03, 0, 0 ]); // version 1000
/// shp.extend_from_slice(&[ 5, 0, 0, 0 ]); // Polygon
/// shp.extend_from_slice(&[ 0; 64 ]);
///
/// let mut dbf = vec![ 0x03, 119, 4, 1, 0, 0, 0, 0, 33, 0, 1, 0 ];
/// dbf.extend_from_slice(&[ 0; 20 ]);
/// dbf.push(0x0d);
///
/// let shapefile = Shapefile::read(&shp[..], &dbf[..], encoding::all::ASCII).unwrap();
/// assert!(shapefile.is_empty());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Shapefile {
    header: shp::ShpHeader,
    dbf_meta: dbf::DbfMeta,
    features: Box<[Feature]>,
}

impl Shapefile {
    /// Decodes both files from memory.
    pub fn read<R: AsRef<[u8]>, S: AsRef<[u8]>>(shp_data: R, dbf_data: S, encoding: EncodingRef) -> Result<Shapefile, ShapefileError> {
        let shp_reader = shp::ShpReader::new(shp_data)?;
        let dbf_reader = dbf::DbfReader::new(dbf_data, encoding)?;
        Shapefile::from_readers(shp_reader, dbf_reader)
    }

    /// Reads every record from both readers, then joins them.
    pub fn from_readers<R: AsRef<[u8]>, S: AsRef<[u8]>>(shp_reader: shp::ShpReader<R>, dbf_reader: dbf::DbfReader<S>) -> Result<Shapefile, ShapefileError> {
        let header = shp_reader.header;
        let dbf_meta = dbf_reader.meta.clone();

        let shapes = shp_reader.read_all()?;
        let records = dbf_reader.read_all()?;
        let features = join(shapes, records)?;

        Ok(Shapefile {
            header: header,
            dbf_meta: dbf_meta,
            features: features,
        })
    }

    pub fn header(&self) -> &shp::ShpHeader {
        &self.header
    }

    pub fn shape_type(&self) -> shp::ShpShapeType {
        self.header.shape_type
    }

    pub fn dbf_meta(&self) -> &dbf::DbfMeta {
        &self.dbf_meta
    }

    pub fn fields(&self) -> &[dbf::DbfField] {
        &self.dbf_meta.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&dbf::DbfField> {
        self.dbf_meta.fields.iter().find(|f| f.name == name)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn shapes(&self) -> impl Iterator<Item=&shp::ShpRecord> {
        self.features.iter().map(|f| &f.shape)
    }

    pub fn records(&self) -> impl Iterator<Item=&dbf::DbfRecord> {
        self.features.iter().map(|f| &f.data)
    }

    pub fn into_features(self) -> Box<[Feature]> {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Open by ".shp" filename.
///
/// This will automatically search for the accompanying ".dbf"; it will fail
/// if that file does not exist. Both files are closed before this returns.
///
/// # Example
///
/// ```no_run
/// # extern crate encoding;
/// # extern crate gismesh;
///
/// # fn main() {
/// use std::path::Path;
/// use gismesh::read::shapefile::shapefile;
///
/// let shapefile = shapefile::open(Path::new("parcels.shp"), encoding::all::UTF_8).unwrap();
///
/// for feature in shapefile.features() {
///     println!("{}", feature);
/// }
/// # }
/// ```
pub fn open(shp_path: &Path, encoding: EncodingRef) -> Result<Shapefile, ShapefileError> {
    let shp_reader = shp::open(shp_path)?;

    let mut dbf_path = PathBuf::from(shp_path);
    dbf_path.set_extension("dbf");
    let dbf_reader = dbf::open(dbf_path.as_path(), encoding)?;

    info!("opened {} ({}) and {} ({} records)", shp_path.display(), shp_reader.header.shape_type, dbf_path.display(), dbf_reader.meta.n_records);

    Shapefile::from_readers(shp_reader, dbf_reader)
}
