//! Reads ESRI ".shp" Shapefile, as per
//! https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
//!
//! The whole file is decoded from memory. Every record begins with a
//! big-endian record number and content length; what follows depends on the
//! file-global shape type in the header.
use std::fmt;
use std::fs;
use std::io;
use std::io::Read;
use std::iter;
use std::path::Path;
use itertools::Itertools;
use log::{debug, trace, warn};
use thiserror::Error;

use crate::read::cursor::{ByteCursor, Endian, TruncatedInput};

const SHP_HEADER_LENGTH: usize = 100;
const SHP_RECORD_HEADER_LENGTH: usize = 8;
const SHP_MAGIC_NUMBER: u32 = 9994; // 0x0000270a
const SHP_VERSION: u32 = 1000;
const SHP_POINT_LENGTH: usize = 16;
const NO_PARTS: &[u32] = &[];
const ONE_PART: &[u32] = &[ 0 ];

#[derive(Debug, Error)]
pub enum ShpError {
    #[error("I/O error: {0}")]
    IOError(#[from] io::Error),

    #[error(transparent)]
    TruncatedInput(#[from] TruncatedInput),

    #[error("File has wrong magic number at byte {offset}: found {found:#010x}, expected 0x0000270a")]
    BadMagic { offset: usize, found: u32 },

    #[error("File has wrong version at byte {offset}: found {found}, expected 1000")]
    UnsupportedVersion { offset: usize, found: u32 },

    #[error("File has nonexistent shape type {code} at byte {offset}")]
    UnknownShapeType { offset: usize, code: u32 },

    #[error("Record number {record_number} is malformed at byte {offset}: {reason}")]
    MalformedRecord { offset: usize, record_number: u32, reason: String },

    #[error("File has {remaining} unreadable bytes at byte {offset}")]
    TrailingData { offset: usize, remaining: usize },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShpShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShpShapeType {
    pub fn with_u32(u: u32) -> Option<ShpShapeType> {
        match u {
            0  => Some(ShpShapeType::Null),
            1  => Some(ShpShapeType::Point),
            3  => Some(ShpShapeType::PolyLine),
            5  => Some(ShpShapeType::Polygon),
            8  => Some(ShpShapeType::MultiPoint),
            11 => Some(ShpShapeType::PointZ),
            13 => Some(ShpShapeType::PolyLineZ),
            15 => Some(ShpShapeType::PolygonZ),
            18 => Some(ShpShapeType::MultiPointZ),
            21 => Some(ShpShapeType::PointM),
            23 => Some(ShpShapeType::PolyLineM),
            25 => Some(ShpShapeType::PolygonM),
            28 => Some(ShpShapeType::MultiPointM),
            31 => Some(ShpShapeType::MultiPatch),
            _ => None,
        }
    }

    pub fn code(&self) -> u32 {
        match *self {
            ShpShapeType::Null => 0,
            ShpShapeType::Point => 1,
            ShpShapeType::PolyLine => 3,
            ShpShapeType::Polygon => 5,
            ShpShapeType::MultiPoint => 8,
            ShpShapeType::PointZ => 11,
            ShpShapeType::PolyLineZ => 13,
            ShpShapeType::PolygonZ => 15,
            ShpShapeType::MultiPointZ => 18,
            ShpShapeType::PointM => 21,
            ShpShapeType::PolyLineM => 23,
            ShpShapeType::PolygonM => 25,
            ShpShapeType::MultiPointM => 28,
            ShpShapeType::MultiPatch => 31,
        }
    }

    /// True iff shapes of this type store a z per vertex.
    pub fn has_z(&self) -> bool {
        match *self {
            ShpShapeType::PointZ
                | ShpShapeType::PolyLineZ
                | ShpShapeType::PolygonZ
                | ShpShapeType::MultiPointZ
                | ShpShapeType::MultiPatch => true,
            _ => false,
        }
    }
}

impl fmt::Display for ShpShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Minimum bounding rectangle, in file order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShpBoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A (min, max) pair: z range or measure range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShpRange(pub f64, pub f64);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShpHeader {
    /// File length the header claims. Informational: decoding runs to the
    /// real end of the buffer.
    pub file_n_bytes: usize,
    pub shape_type: ShpShapeType,
    pub bounding_box: ShpBoundingBox,
    pub z_range: ShpRange,
    pub m_range: ShpRange,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ShpPoint(pub f64, pub f64);

impl fmt::Display for ShpPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ShpPointZ(pub f64, pub f64, pub f64);

impl fmt::Display for ShpPointZ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

/// Per-vertex measures and their declared range.
#[derive(Debug, Clone, PartialEq)]
pub struct ShpMeasures {
    pub range: ShpRange,
    pub values: Box<[f64]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShpMultiPoint {
    pub bounding_box: ShpBoundingBox,
    pub points: Box<[ShpPoint]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShpMultiPointZ {
    pub bounding_box: ShpBoundingBox,
    pub points: Box<[ShpPointZ]>,
    pub z_range: ShpRange,
    pub measures: Option<ShpMeasures>,
}

/// A PolyLine or Polygon: points split into parts.
///
/// `parts[i]` is the index of the first point of part `i`. `parts[0]` is
/// always 0, and parts never go backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ShpPoly {
    pub bounding_box: ShpBoundingBox,
    pub parts: Box<[u32]>,
    pub points: Box<[ShpPoint]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShpPolyZ {
    pub bounding_box: ShpBoundingBox,
    pub parts: Box<[u32]>,
    pub points: Box<[ShpPointZ]>,
    pub z_range: ShpRange,
    pub measures: Option<ShpMeasures>,
}

/// Splits `points` at each part offset.
///
/// Assumes `parts` has been validated (see `check_parts()`).
fn split_parts<'a, T>(parts: &[u32], points: &'a [T]) -> Vec<&'a [T]> {
    parts.iter()
        .map(|&p| p as usize)
        .chain(iter::once(points.len()))
        .tuple_windows()
        .map(|(start, end)| &points[start .. end])
        .collect()
}

impl ShpPoly {
    /// Returns each ring (Polygon) or line (PolyLine), in order.
    pub fn rings(&self) -> Vec<&[ShpPoint]> {
        split_parts(&self.parts, &self.points)
    }
}

impl ShpPolyZ {
    pub fn rings(&self) -> Vec<&[ShpPointZ]> {
        split_parts(&self.parts, &self.points)
    }
}

/// One decoded shape. The variant always matches the file's shape type,
/// except `Null`, which any record may use.
#[derive(Debug, Clone, PartialEq)]
pub enum ShpShape {
    Null,
    Point(ShpPoint),
    PointZ { point: ShpPointZ, m: Option<f64> },
    MultiPoint(ShpMultiPoint),
    MultiPointZ(ShpMultiPointZ),
    PolyLine(ShpPoly),
    PolyLineZ(ShpPolyZ),
    Polygon(ShpPoly),
    PolygonZ(ShpPolyZ),
}

impl ShpShape {
    pub fn shape_type(&self) -> ShpShapeType {
        match *self {
            ShpShape::Null => ShpShapeType::Null,
            ShpShape::Point(_) => ShpShapeType::Point,
            ShpShape::PointZ { .. } => ShpShapeType::PointZ,
            ShpShape::MultiPoint(_) => ShpShapeType::MultiPoint,
            ShpShape::MultiPointZ(_) => ShpShapeType::MultiPointZ,
            ShpShape::PolyLine(_) => ShpShapeType::PolyLine,
            ShpShape::PolyLineZ(_) => ShpShapeType::PolyLineZ,
            ShpShape::Polygon(_) => ShpShapeType::Polygon,
            ShpShape::PolygonZ(_) => ShpShapeType::PolygonZ,
        }
    }

    pub fn n_points(&self) -> usize {
        match *self {
            ShpShape::Null => 0,
            ShpShape::Point(_) | ShpShape::PointZ { .. } => 1,
            ShpShape::MultiPoint(ref mp) => mp.points.len(),
            ShpShape::MultiPointZ(ref mp) => mp.points.len(),
            ShpShape::PolyLine(ref p) | ShpShape::Polygon(ref p) => p.points.len(),
            ShpShape::PolyLineZ(ref p) | ShpShape::PolygonZ(ref p) => p.points.len(),
        }
    }

    /// Index of the first point of each part. Shapes without explicit parts
    /// have a single part starting at 0; `Null` has none.
    pub fn part_offsets(&self) -> &[u32] {
        match *self {
            ShpShape::Null => NO_PARTS,
            ShpShape::PolyLine(ref p) | ShpShape::Polygon(ref p) => &p.parts,
            ShpShape::PolyLineZ(ref p) | ShpShape::PolygonZ(ref p) => &p.parts,
            _ => ONE_PART,
        }
    }

    /// All vertices as (x, y, z), in file order. Shapes without z get
    /// `default_z`.
    pub fn xyz(&self, default_z: f64) -> Vec<(f64, f64, f64)> {
        fn xy(points: &[ShpPoint], z: f64) -> Vec<(f64, f64, f64)> {
            points.iter().map(|p| (p.0, p.1, z)).collect()
        }
        fn xyz(points: &[ShpPointZ]) -> Vec<(f64, f64, f64)> {
            points.iter().map(|p| (p.0, p.1, p.2)).collect()
        }

        match *self {
            ShpShape::Null => vec![],
            ShpShape::Point(p) => vec![ (p.0, p.1, default_z) ],
            ShpShape::PointZ { point, .. } => vec![ (point.0, point.1, point.2) ],
            ShpShape::MultiPoint(ref mp) => xy(&mp.points, default_z),
            ShpShape::MultiPointZ(ref mp) => xyz(&mp.points),
            ShpShape::PolyLine(ref p) | ShpShape::Polygon(ref p) => xy(&p.points, default_z),
            ShpShape::PolyLineZ(ref p) | ShpShape::PolygonZ(ref p) => xyz(&p.points),
        }
    }
}

impl fmt::Display for ShpShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShpShape::Null => write!(f, "Null"),
            ShpShape::Point(p) => write!(f, "Point{}", p),
            ShpShape::PointZ { point, .. } => write!(f, "PointZ{}", point),
            _ => {
                let mut r = write!(f, "{}[", self.shape_type());
                let points = self.xyz(0.);
                for (i, ring) in split_parts(self.part_offsets(), &points).iter().enumerate() {
                    if i > 0 {
                        r = r.and_then(|_| write!(f, "|"));
                    }
                    for (j, p) in ring.iter().enumerate() {
                        if j > 0 {
                            r = r.and_then(|_| write!(f, ","));
                        }
                        r = r.and_then(|_| write!(f, "({},{},{})", p.0, p.1, p.2));
                    }
                }
                r.and_then(|_| write!(f, "]"))
            }
        }
    }
}

/// One ".shp" record.
#[derive(Debug, Clone, PartialEq)]
pub struct ShpRecord {
    /// 1-based, as stored in the file.
    pub record_number: u32,
    pub shape: ShpShape,
}

impl fmt::Display for ShpRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {}", self.record_number, self.shape)
    }
}

fn read_bounding_box(c: &mut ByteCursor) -> Result<ShpBoundingBox, TruncatedInput> {
    Ok(ShpBoundingBox {
        xmin: c.read_f64(Endian::Little)?,
        ymin: c.read_f64(Endian::Little)?,
        xmax: c.read_f64(Endian::Little)?,
        ymax: c.read_f64(Endian::Little)?,
    })
}

fn read_range(c: &mut ByteCursor) -> Result<ShpRange, TruncatedInput> {
    Ok(ShpRange(c.read_f64(Endian::Little)?, c.read_f64(Endian::Little)?))
}

/// Reads the first 100 bytes of the file.
///
/// Side-effect: advances the cursor 100 bytes (or less, on error). The magic
/// number is checked before anything else is read.
pub fn read_shp_header(c: &mut ByteCursor) -> Result<ShpHeader, ShpError> {
    let offset = c.offset();
    let magic_number = c.read_u32(Endian::Big)?;
    if magic_number != SHP_MAGIC_NUMBER {
        return Err(ShpError::BadMagic { offset: offset, found: magic_number });
    }

    c.skip(20)?;
    let file_len = c.read_u32(Endian::Big)? as usize;

    let offset = c.offset();
    let version = c.read_u32(Endian::Little)?;
    if version != SHP_VERSION {
        return Err(ShpError::UnsupportedVersion { offset: offset, found: version });
    }

    let offset = c.offset();
    let shape_type_u32 = c.read_u32(Endian::Little)?;
    let shape_type = match ShpShapeType::with_u32(shape_type_u32) {
        Some(t) => t,
        None => return Err(ShpError::UnknownShapeType { offset: offset, code: shape_type_u32 }),
    };

    let header = ShpHeader {
        file_n_bytes: file_len * 2,
        shape_type: shape_type,
        bounding_box: read_bounding_box(c)?,
        z_range: read_range(c)?,
        m_range: read_range(c)?,
    };
    debug!("read .shp header: {:?}", header);

    Ok(header)
}

/// Reads a point count, refusing counts that can't fit in what's left of
/// the record.
fn read_count(c: &mut ByteCursor, bytes_each: usize, what: &str) -> Result<usize, String> {
    let offset = c.offset();
    let n = c.read_u32(Endian::Little).map_err(|e| e.to_string())? as usize;
    match n.checked_mul(bytes_each) {
        Some(needed) if needed <= c.remaining() => Ok(n),
        _ => Err(format!("{} count {} at byte {} needs more bytes than the {} left in the record", what, n, offset, c.remaining())),
    }
}

fn read_points(c: &mut ByteCursor, n: usize) -> Result<Box<[ShpPoint]>, TruncatedInput> {
    let mut points = Vec::<ShpPoint>::with_capacity(n);
    for _ in 0..n {
        points.push(ShpPoint(c.read_f64(Endian::Little)?, c.read_f64(Endian::Little)?));
    }
    Ok(points.into_boxed_slice())
}

fn read_f64s(c: &mut ByteCursor, n: usize) -> Result<Box<[f64]>, TruncatedInput> {
    let mut ret = Vec::<f64>::with_capacity(n);
    for _ in 0..n {
        ret.push(c.read_f64(Endian::Little)?);
    }
    Ok(ret.into_boxed_slice())
}

/// Reads the z block and the optional measure block that trail Z shapes,
/// and lifts `points` to 3D.
fn read_z_and_measures(c: &mut ByteCursor, points: &[ShpPoint]) -> Result<(Box<[ShpPointZ]>, ShpRange, Option<ShpMeasures>), TruncatedInput> {
    let z_range = read_range(c)?;
    let zs = read_f64s(c, points.len())?;
    let points_z: Vec<ShpPointZ> = points.iter().zip(zs.iter())
        .map(|(p, &z)| ShpPointZ(p.0, p.1, z))
        .collect();

    let measures = if c.is_empty() {
        None
    } else {
        let range = read_range(c)?;
        Some(ShpMeasures { range: range, values: read_f64s(c, points.len())? })
    };

    Ok((points_z.into_boxed_slice(), z_range, measures))
}

/// Ensures parts start at 0, never go backwards and all point inside the
/// record.
fn check_parts(parts: &[u32], n_points: usize) -> Result<(), String> {
    if parts.is_empty() {
        return Err("it has no parts".to_string());
    }

    if parts[0] != 0 {
        return Err(format!("its first part starts at point {}, not 0", parts[0]));
    }

    if let Some((a, b)) = parts.iter().tuple_windows().find(|&(a, b)| b < a) {
        return Err(format!("its parts go backwards, from point {} to point {}", a, b));
    }

    if let Some(p) = parts.iter().find(|&&p| p as usize >= n_points) {
        return Err(format!("it has a part starting at point {}, but there are only {} points in the record", p, n_points));
    }

    Ok(())
}

/// Reads the body shared by PolyLine/Polygon and their Z variants: bounding
/// box, counts, parts and x/y points.
fn read_poly_body(c: &mut ByteCursor) -> Result<(ShpBoundingBox, Box<[u32]>, Box<[ShpPoint]>), RecordError> {
    let bounding_box = read_bounding_box(c)?;
    let parts_offset = c.offset();
    let num_parts = c.read_u32(Endian::Little)? as usize;
    let num_points = read_count(c, SHP_POINT_LENGTH, "point").map_err(RecordError::Invalid)?;

    if num_parts.checked_mul(4).map_or(true, |needed| needed > c.remaining()) {
        return Err(RecordError::Invalid(format!("part count {} at byte {} needs more bytes than the record holds", num_parts, parts_offset)));
    }
    let mut parts = Vec::<u32>::with_capacity(num_parts);
    for _ in 0..num_parts {
        parts.push(c.read_u32(Endian::Little)?);
    }
    let points = read_points(c, num_points)?;

    check_parts(&parts, points.len()).map_err(RecordError::Invalid)?;

    Ok((bounding_box, parts.into_boxed_slice(), points))
}

/// Why a record's content couldn't be decoded. Converted to `ShpError` by
/// `read_record()`, which knows the record number.
enum RecordError {
    Truncated(TruncatedInput),
    Invalid(String),
}

impl From<TruncatedInput> for RecordError {
    fn from(err: TruncatedInput) -> RecordError {
        RecordError::Truncated(err)
    }
}

/// Decodes a record's content (after its record type) according to the
/// file's shape type.
fn parse_shape(c: &mut ByteCursor, shape_type: ShpShapeType) -> Result<ShpShape, RecordError> {
    match shape_type {
        ShpShapeType::Point => {
            Ok(ShpShape::Point(ShpPoint(c.read_f64(Endian::Little)?, c.read_f64(Endian::Little)?)))
        }
        ShpShapeType::PointZ => {
            let x = c.read_f64(Endian::Little)?;
            let y = c.read_f64(Endian::Little)?;
            let z = c.read_f64(Endian::Little)?;
            let m = if c.is_empty() { None } else { Some(c.read_f64(Endian::Little)?) };
            Ok(ShpShape::PointZ { point: ShpPointZ(x, y, z), m: m })
        }
        ShpShapeType::MultiPoint => {
            let bounding_box = read_bounding_box(c)?;
            let n = read_count(c, SHP_POINT_LENGTH, "point").map_err(RecordError::Invalid)?;
            Ok(ShpShape::MultiPoint(ShpMultiPoint {
                bounding_box: bounding_box,
                points: read_points(c, n)?,
            }))
        }
        ShpShapeType::MultiPointZ => {
            let bounding_box = read_bounding_box(c)?;
            let n = read_count(c, SHP_POINT_LENGTH, "point").map_err(RecordError::Invalid)?;
            let points = read_points(c, n)?;
            let (points, z_range, measures) = read_z_and_measures(c, &points)?;
            Ok(ShpShape::MultiPointZ(ShpMultiPointZ {
                bounding_box: bounding_box,
                points: points,
                z_range: z_range,
                measures: measures,
            }))
        }
        ShpShapeType::PolyLine | ShpShapeType::Polygon => {
            let (bounding_box, parts, points) = read_poly_body(c)?;
            let poly = ShpPoly { bounding_box: bounding_box, parts: parts, points: points };
            if shape_type == ShpShapeType::PolyLine {
                Ok(ShpShape::PolyLine(poly))
            } else {
                Ok(ShpShape::Polygon(poly))
            }
        }
        ShpShapeType::PolyLineZ | ShpShapeType::PolygonZ => {
            let (bounding_box, parts, points) = read_poly_body(c)?;
            let (points, z_range, measures) = read_z_and_measures(c, &points)?;
            let poly = ShpPolyZ {
                bounding_box: bounding_box,
                parts: parts,
                points: points,
                z_range: z_range,
                measures: measures,
            };
            if shape_type == ShpShapeType::PolyLineZ {
                Ok(ShpShape::PolyLineZ(poly))
            } else {
                Ok(ShpShape::PolygonZ(poly))
            }
        }
        ShpShapeType::Null => {
            Err(RecordError::Invalid("the file declares Null shapes, but the record is not Null".to_string()))
        }
        unsupported => {
            Err(RecordError::Invalid(format!("shape type {} is not supported", unsupported)))
        }
    }
}

/// Reads the next record, including its 8-byte record header.
///
/// Side effect: advances the cursor past the record. A record-local shape
/// type of 0 makes a Null record, whatever the file's shape type.
pub fn read_record(c: &mut ByteCursor, shape_type: ShpShapeType) -> Result<ShpRecord, ShpError> {
    let record_number = c.read_u32(Endian::Big)?;
    let content_length = c.read_u32(Endian::Big)? as usize * 2;
    let content_offset = c.offset();
    let content = c.read_bytes(content_length)?;

    let malformed = |offset: usize, reason: String| ShpError::MalformedRecord {
        offset: offset,
        record_number: record_number,
        reason: reason,
    };

    let mut rc = ByteCursor::with_base(content, content_offset);
    let record_type = rc.read_u32(Endian::Little)
        .map_err(|_| malformed(content_offset, format!("its content is {} bytes, too short to hold a shape type", content_length)))?;

    if record_type == 0 {
        trace!("read .shp record {}: Null", record_number);
        return Ok(ShpRecord { record_number: record_number, shape: ShpShape::Null });
    }

    if record_type != shape_type.code() {
        return Err(malformed(content_offset, format!("found shape type {}, but the file has shape type {}", record_type, shape_type.code())));
    }

    let shape = match parse_shape(&mut rc, shape_type) {
        Ok(shape) => shape,
        Err(RecordError::Invalid(reason)) => return Err(malformed(rc.offset(), reason)),
        Err(RecordError::Truncated(err)) => {
            return Err(malformed(err.offset, format!("the record header says it has {} bytes, but its shape needs more", content_length)));
        }
    };

    if !rc.is_empty() {
        return Err(malformed(rc.offset(), format!("the record header says it has {} bytes, but its shape only used {}", content_length, rc.position())));
    }

    trace!("read .shp record {}: {} with {} points", record_number, shape_type, shape.n_points());

    Ok(ShpRecord { record_number: record_number, shape: shape })
}

/// Reads an ESRI ".shp" Shapefile held in memory, one record per `next()`.
///
/// After the first error, the iterator ends: there is no way to find the
/// next record once one has been misread.
///
/// # Example
///
/// ```no_run
/// use gismesh::read::shapefile::shp::{ShpReader, ShpShapeType};
///
/// let bytes = std::fs::read("parcels.shp").unwrap();
///
/// // builder returns Result<ShpReader, ShpError>
/// let shp_reader = ShpReader::new(&bytes[..]).unwrap();
/// assert_eq!(ShpShapeType::Polygon, shp_reader.header.shape_type);
///
/// for record in shp_reader {
///     // record is a Result<ShpRecord, ShpError>
///     println!("{}", record.unwrap());
/// }
/// ```
#[derive(Debug)]
pub struct ShpReader<B: AsRef<[u8]>> {
    data: B,
    pos: usize,
    failed: bool,
    pub header: ShpHeader,
}

impl<B: AsRef<[u8]>> ShpReader<B> {
    pub fn new(data: B) -> Result<ShpReader<B>, ShpError> {
        let header = read_shp_header(&mut ByteCursor::new(data.as_ref()))?;

        let n_bytes = data.as_ref().len();
        if header.file_n_bytes != n_bytes {
            warn!("The .shp header says the file is {} bytes long, but it is {} bytes long", header.file_n_bytes, n_bytes);
        }

        Ok(ShpReader {
            data: data,
            pos: SHP_HEADER_LENGTH,
            failed: false,
            header: header,
        })
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads every remaining record, failing on the first bad one.
    pub fn read_all(self) -> Result<Box<[ShpRecord]>, ShpError> {
        let records = self.collect::<Result<Vec<ShpRecord>, ShpError>>()?;
        Ok(records.into_boxed_slice())
    }
}

/// True when `rest` is one final "record" too short to hold even a shape
/// type: leftover bytes rather than a record.
fn is_trailing_padding(rest: &[u8]) -> bool {
    let mut c = ByteCursor::new(rest);
    match c.skip(4).and_then(|_| c.read_u32(Endian::Big)) {
        Ok(n_words) => {
            let content_length = n_words as usize * 2;
            content_length < 4 && SHP_RECORD_HEADER_LENGTH + content_length >= rest.len()
        }
        Err(_) => false,
    }
}

impl<B: AsRef<[u8]>> Iterator for ShpReader<B> {
    type Item = Result<ShpRecord, ShpError>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data.as_ref();

        if self.failed || self.pos >= data.len() {
            return None;
        }

        let remaining = data.len() - self.pos;
        if remaining < SHP_RECORD_HEADER_LENGTH {
            self.failed = true;
            return Some(Err(ShpError::TrailingData { offset: self.pos, remaining: remaining }));
        }

        if is_trailing_padding(&data[self.pos ..]) {
            self.failed = true;
            return Some(Err(ShpError::TrailingData { offset: self.pos, remaining: remaining }));
        }

        let mut c = ByteCursor::with_base(&data[self.pos ..], self.pos);
        match read_record(&mut c, self.header.shape_type) {
            Ok(record) => {
                self.pos += c.position();
                Some(Ok(record))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Reads an ESRI ".shp" Shapefile from disk into memory.
///
/// The file is closed before this returns, whether or not it was valid.
pub fn open(path: &Path) -> Result<ShpReader<Vec<u8>>, ShpError> {
    let mut buf = Vec::new();
    fs::File::open(path)?.read_to_end(&mut buf)?;
    ShpReader::new(buf)
}
