//! Flattens decoded features into mesh buffers.
//!
//! A mesh file wants one big list of points plus a compressed-sparse-row
//! description of which points belong to which cell. Every shape becomes
//! exactly one cell, so:
//!
//! * `points` holds every vertex of every shape, in shape order;
//! * `points_per_shape[i]` is the vertex count of shape `i`;
//! * `cell_offsets[i]` is the running total through shape `i`;
//! * `connectivity` is `0 .. n_points`, because no vertex is shared.
//!
//! Attributes ride along as one array per field, one element per cell.
//! Numbers go in `cell_data`; everything else is stringified into
//! `text_data` and exported as comments.

use std::collections::BTreeMap;
use std::io;
use log::debug;
use thiserror::Error;

use crate::read::shapefile::dbf::{DbfField, DbfValue};
use crate::read::shapefile::shapefile::{Feature, Shapefile};
use crate::read::shapefile::shp::{ShpHeader, ShpShapeType};

pub mod sink;

pub use self::sink::{export, MeshSink};

const TEXT_FIELDS_INTRO: &str = "Text fields as lists with one element for each shape follows...";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Shape type {0} has no mesh cell type")]
    UnsupportedExport(ShpShapeType),

    #[error("Mesh sink failed: {0}")]
    Sink(#[from] io::Error),
}

/// VTK cell type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Vertex = 1,
    PolyVertex = 2,
    PolyLine = 4,
    Polygon = 7,
}

impl CellType {
    pub fn for_shape_type(shape_type: ShpShapeType) -> Result<CellType, ExportError> {
        match shape_type {
            ShpShapeType::Point | ShpShapeType::PointZ => Ok(CellType::Vertex),
            ShpShapeType::MultiPoint | ShpShapeType::MultiPointZ => Ok(CellType::PolyVertex),
            ShpShapeType::PolyLine | ShpShapeType::PolyLineZ => Ok(CellType::PolyLine),
            ShpShapeType::Polygon | ShpShapeType::PolygonZ => Ok(CellType::Polygon),
            _ => Err(ExportError::UnsupportedExport(shape_type)),
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// Coordinates as three parallel arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Points {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Points {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn push(&mut self, (x, y, z): (f64, f64, f64)) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }
}

/// One numeric attribute, one element per cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellArray {
    /// Numbers without decimals. Blanks become 0.
    Int(Vec<i64>),
    /// Numbers with decimals. Blanks become NaN.
    Float(Vec<f64>),
}

impl CellArray {
    fn for_field(field: &DbfField, capacity: usize) -> CellArray {
        if field.decimal_count == 0 {
            CellArray::Int(Vec::with_capacity(capacity))
        } else {
            CellArray::Float(Vec::with_capacity(capacity))
        }
    }

    fn push(&mut self, value: &DbfValue) {
        match *self {
            CellArray::Int(ref mut v) => v.push(match *value {
                DbfValue::Integer(i) => i,
                DbfValue::Float(x) => x as i64,
                _ => 0,
            }),
            CellArray::Float(ref mut v) => v.push(match *value {
                DbfValue::Integer(i) => i as f64,
                DbfValue::Float(x) => x,
                _ => std::f64::NAN,
            }),
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            CellArray::Int(ref v) => v.len(),
            CellArray::Float(ref v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Repeats element `i` `counts[i]` times.
    pub fn repeat_by(&self, counts: &[usize]) -> CellArray {
        fn repeat<T: Copy>(values: &[T], counts: &[usize]) -> Vec<T> {
            values.iter()
                .zip(counts.iter())
                .flat_map(|(&v, &n)| std::iter::repeat(v).take(n))
                .collect()
        }

        match *self {
            CellArray::Int(ref v) => CellArray::Int(repeat(v, counts)),
            CellArray::Float(ref v) => CellArray::Float(repeat(v, counts)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// z for shapes that have none. `None` means the ".shp" header's zmin.
    pub default_z: Option<f64>,
    /// Written ahead of the generated text-field comments.
    pub comments: Vec<String>,
}

/// Everything a mesh sink needs, derived from a feature list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub shape_type: ShpShapeType,
    pub points: Points,
    pub points_per_shape: Vec<usize>,
    pub connectivity: Vec<usize>,
    pub cell_offsets: Vec<usize>,
    pub cell_types: Vec<CellType>,
    pub cell_data: BTreeMap<String, CellArray>,
    pub text_data: BTreeMap<String, Vec<String>>,
}

/// Builds mesh buffers from features, in feature order.
///
/// `fields` describes each feature's attributes. When two fields share a
/// name, the later one wins.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use gismesh::mesh::{self, ExportOptions};
/// use gismesh::read::shapefile;
///
/// let shapefile = shapefile::open_utf8(Path::new("parcels.shp")).unwrap();
/// let buffers = mesh::flatten(shapefile.header(), shapefile.fields(), shapefile.features(), &ExportOptions::default()).unwrap();
///
/// println!("{} points in {} cells", buffers.points.len(), buffers.n_cells());
/// ```
pub fn flatten(header: &ShpHeader, fields: &[DbfField], features: &[Feature], options: &ExportOptions) -> Result<MeshBuffers, ExportError> {
    let cell_type = CellType::for_shape_type(header.shape_type)?;
    let default_z = options.default_z.unwrap_or(header.z_range.0);

    let mut points = Points::default();
    let mut points_per_shape = Vec::with_capacity(features.len());
    for feature in features {
        let xyz = feature.shape.shape.xyz(default_z);
        points_per_shape.push(xyz.len());
        for p in xyz {
            points.push(p);
        }
    }

    let cell_offsets: Vec<usize> = points_per_shape.iter()
        .scan(0, |total, &n| {
            *total += n;
            Some(*total)
        })
        .collect();
    let connectivity: Vec<usize> = (0 .. points.len()).collect();
    let cell_types = vec![ cell_type; features.len() ];

    // name => ordinal. Later duplicates replace earlier ones.
    let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, field) in fields.iter().enumerate() {
        columns.insert(&field.name[..], i);
    }

    let mut cell_data = BTreeMap::new();
    let mut text_data = BTreeMap::new();
    for (name, &i) in columns.iter() {
        let field = &fields[i];
        let values = features.iter().map(|f| f.data.values().get(i).unwrap_or(&DbfValue::Null));

        if field.data_type.is_numeric() {
            let mut array = CellArray::for_field(field, features.len());
            for value in values {
                array.push(value);
            }
            cell_data.insert(name.to_string(), array);
        } else {
            text_data.insert(name.to_string(), values.map(|v| v.to_string()).collect());
        }
    }

    debug!("Flattened {} {} shapes into {} points, {} numeric and {} text fields", features.len(), header.shape_type, points.len(), cell_data.len(), text_data.len());

    Ok(MeshBuffers {
        shape_type: header.shape_type,
        points: points,
        points_per_shape: points_per_shape,
        connectivity: connectivity,
        cell_offsets: cell_offsets,
        cell_types: cell_types,
        cell_data: cell_data,
        text_data: text_data,
    })
}

impl MeshBuffers {
    pub fn from_shapefile(shapefile: &Shapefile, options: &ExportOptions) -> Result<MeshBuffers, ExportError> {
        flatten(shapefile.header(), shapefile.fields(), shapefile.features(), options)
    }

    pub fn n_cells(&self) -> usize {
        self.points_per_shape.len()
    }

    /// `extra`, then one line per text field: `name: [a,b,c]`.
    pub fn comments(&self, extra: &[String]) -> Vec<String> {
        let mut ret = extra.to_vec();

        if !self.text_data.is_empty() {
            ret.push(TEXT_FIELDS_INTRO.to_string());
            for (name, values) in self.text_data.iter() {
                ret.push(format!("{}: [{}]", name, values.join(",")));
            }
        }

        ret
    }

    /// `cell_data`, with each cell's value repeated once per point in the
    /// cell. For point clouds, which carry data per point.
    pub fn per_point_cell_data(&self) -> BTreeMap<String, CellArray> {
        self.cell_data.iter()
            .map(|(name, array)| (name.clone(), array.repeat_by(&self.points_per_shape)))
            .collect()
    }
}
