//! Reads xbase ".dbf" file, as per
//! https://www.clicketyclick.dk/databases/xbase/format/dbf.html
//!
//! Only the dBase III family is supported: that's what shapefile tools write.

use std::fmt;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use chrono::NaiveDate;
use encoding::{DecoderTrap, EncodingRef};
use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;
use thiserror::Error;

use crate::read::cursor::{ByteCursor, Endian, TruncatedInput};

const DBF_HEADER_LENGTH: usize = 32;
const DBF_FIELD_DESCRIPTOR_LENGTH: usize = 32;
const DBF_HEADER_TERMINATOR: u8 = 0x0d;
const DBF_VERSION_DBASE3: u8 = 0x03;
const DBF_VERSION_DBASE3_MEMO: u8 = 0x83;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^[+-]?\d+$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
    static ref YYYYMMDD: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
}

#[derive(Debug, Error)]
pub enum DbfError {
    #[error("I/O error: {0}")]
    IOError(#[from] io::Error),

    #[error(transparent)]
    TruncatedInput(#[from] TruncatedInput),

    #[error("File has unsupported version byte {found:#04x} at byte {offset}; expected a dBase III file")]
    UnsupportedVersion { offset: usize, found: u8 },

    #[error("Corrupt header at byte {offset}: {reason}")]
    CorruptHeader { offset: usize, reason: String },

    #[error("Record {record_number}, field '{field}' at byte {offset}: {reason}")]
    FieldConversion { offset: usize, record_number: usize, field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbfType {
    Char,
    Numeric,
    Float,
    Logical,
    Date,
    Memo,
}

impl DbfType {
    fn with_u8(u: u8) -> Option<DbfType> {
        match u {
            b'C' => Some(DbfType::Char),
            b'N' => Some(DbfType::Numeric),
            b'F' => Some(DbfType::Float),
            b'L' => Some(DbfType::Logical),
            b'D' => Some(DbfType::Date),
            b'M' => Some(DbfType::Memo),
            _ => None,
        }
    }

    /// True for types that decode to numbers.
    pub fn is_numeric(&self) -> bool {
        *self == DbfType::Numeric || *self == DbfType::Float
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    /// A blank Numeric, Float or Date field.
    Null,
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    /// Char, Logical and Memo fields, decoded but otherwise untouched.
    Text(String),
}

impl fmt::Display for DbfValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DbfValue::Null => Ok(()),
            DbfValue::Integer(i) => write!(f, "{}", i),
            DbfValue::Float(x) => write!(f, "{}", x),
            DbfValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DbfValue::Text(ref s) => write!(f, "{}", s),
        }
    }
}

/// One column's description.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfField {
    pub name: String,
    pub data_type: DbfType,
    /// Position of the field's first byte within a record, counting the
    /// deletion marker.
    pub offset: usize,
    pub len: u8,
    pub decimal_count: u8,
    pub indexed: bool,
}

fn decode_text(raw: &[u8], encoding: EncodingRef) -> Result<String, String> {
    encoding.decode(raw, DecoderTrap::Replace)
        .map(|s| s.trim_end_matches(|c: char| c == ' ' || c == '\0').to_string())
        .map_err(|e| e.into_owned())
}

fn decode_ascii(raw: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(raw)
        .map(|s| s.trim_matches(|c: char| c == ' ' || c == '\0'))
        .map_err(|_| format!("{:?} is not ASCII", raw))
}

impl DbfField {
    /// Converts a field's raw bytes to a typed value.
    ///
    /// Numbers with `decimal_count == 0` become `Integer`; other numbers
    /// become `Float`. Dates must be `YYYYMMDD`. Blank numbers and dates are
    /// `Null`.
    pub fn parse(&self, raw: &[u8], encoding: EncodingRef) -> Result<DbfValue, String> {
        match self.data_type {
            DbfType::Char | DbfType::Logical | DbfType::Memo => {
                decode_text(raw, encoding).map(DbfValue::Text)
            }
            DbfType::Numeric | DbfType::Float => {
                let s = decode_ascii(raw)?;
                if s.is_empty() {
                    Ok(DbfValue::Null)
                } else if self.decimal_count == 0 {
                    if !INTEGER.is_match(s) {
                        return Err(format!("'{}' is not an integer", s));
                    }
                    s.parse::<i64>()
                        .map(DbfValue::Integer)
                        .map_err(|e| format!("'{}' is not an integer: {}", s, e))
                } else {
                    if !DECIMAL.is_match(s) {
                        return Err(format!("'{}' is not a number", s));
                    }
                    s.parse::<f64>()
                        .map(DbfValue::Float)
                        .map_err(|e| format!("'{}' is not a number: {}", s, e))
                }
            }
            DbfType::Date => {
                let s = decode_ascii(raw)?;
                if s.is_empty() {
                    return Ok(DbfValue::Null);
                }
                let caps = match YYYYMMDD.captures(s) {
                    Some(caps) => caps,
                    None => return Err(format!("'{}' is not a YYYYMMDD date", s)),
                };
                // The regex guarantees all-digit captures
                let y = caps[1].parse::<i32>().map_err(|e| e.to_string())?;
                let m = caps[2].parse::<u32>().map_err(|e| e.to_string())?;
                let d = caps[3].parse::<u32>().map_err(|e| e.to_string())?;
                NaiveDate::from_ymd_opt(y, m, d)
                    .map(DbfValue::Date)
                    .ok_or_else(|| format!("'{}' is not a valid date", s))
            }
        }
    }
}

/// Everything the ".dbf" header says.
#[derive(Clone)]
pub struct DbfMeta {
    pub version: u8,
    pub n_records: usize,
    pub n_header_bytes: usize,
    pub n_bytes_per_record: usize,
    pub fields: Arc<[DbfField]>,
    pub encoding: EncodingRef,
}

// encoding::EncodingRef does not implement std::fmt::Debug
impl fmt::Debug for DbfMeta {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("DbfMeta")
            .field("version", &self.version)
            .field("n_records", &self.n_records)
            .field("n_header_bytes", &self.n_header_bytes)
            .field("n_bytes_per_record", &self.n_bytes_per_record)
            .field("fields", &self.fields)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl DbfMeta {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| &f.name[..]).collect()
    }
}

/// One row: values in field order. The deletion marker is not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfRecord {
    /// 1-based, to match ".shp" record numbers.
    pub record_number: usize,
    fields: Arc<[DbfField]>,
    values: Box<[DbfValue]>,
}

impl DbfRecord {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    pub fn values(&self) -> &[DbfValue] {
        &self.values
    }

    /// Returns (field name, value) of the field at `ordinal`.
    pub fn get(&self, ordinal: usize) -> Option<(&str, &DbfValue)> {
        self.values.get(ordinal).map(|v| (&self.fields[ordinal].name[..], v))
    }

    /// Returns the value of the first field called `name`.
    pub fn value(&self, name: &str) -> Option<&DbfValue> {
        self.fields.iter().position(|f| f.name == name).map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item=(&str, &DbfValue)> {
        self.fields.iter().map(|f| &f.name[..]).zip(self.values.iter())
    }
}

impl fmt::Display for DbfRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = Ok(());
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                r = r.and_then(|_| write!(f, "; "));
            }
            r = r.and_then(|_| write!(f, "{}: {}", name, value));
        }
        r
    }
}

fn corrupt(offset: usize, reason: String) -> DbfError {
    DbfError::CorruptHeader { offset: offset, reason: reason }
}

/// Reads one 32-byte field descriptor.
///
/// `record_offset` is where this field starts within each record.
fn read_field_descriptor(c: &mut ByteCursor, record_offset: usize) -> Result<DbfField, DbfError> {
    // 11 bytes, zero-filled
    let name_bytes = c.read_fixed_string(11)?;
    let name_len = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
    let name = String::from_utf8_lossy(&name_bytes[.. name_len]).trim().to_string();

    let offset = c.offset();
    let type_u8 = c.read_u8()?;
    let data_type = match DbfType::with_u8(type_u8) {
        Some(t) => t,
        None => return Err(corrupt(offset, format!("field '{}' has unknown type {:?}", name, type_u8 as char))),
    };

    c.skip(4)?; // field data address
    let len = c.read_u8()?;
    let decimal_count = c.read_u8()?;
    c.skip(2)?; // work area ID
    c.skip(1)?; // example
    c.skip(10)?; // reserved

    let offset = c.offset();
    let index_flag = c.read_u8()?;
    if index_flag > 1 {
        return Err(corrupt(offset, format!("field '{}' has index flag {}; expected 0 or 1", name, index_flag)));
    }

    Ok(DbfField {
        name: name,
        data_type: data_type,
        offset: record_offset,
        len: len,
        decimal_count: decimal_count,
        indexed: index_flag == 1,
    })
}

/// Reads the header, including field definitions, from a .dbf file.
///
/// Assumes the cursor is at the start of the file.
///
/// Side-effect: advances the cursor to the first data record.
pub fn read_dbf_meta(c: &mut ByteCursor, encoding: EncodingRef) -> Result<DbfMeta, DbfError> {
    let version = c.read_u8()?;
    if version != DBF_VERSION_DBASE3 && version != DBF_VERSION_DBASE3_MEMO {
        return Err(DbfError::UnsupportedVersion { offset: 0, found: version });
    }

    c.skip(3)?; // last update, YYMMDD
    let n_records = c.read_u32(Endian::Little)? as usize;
    let header_len_offset = c.offset();
    let n_header_bytes = c.read_u16(Endian::Little)? as usize;
    let n_bytes_per_record = c.read_u16(Endian::Little)? as usize;
    c.skip(20)?; // reserved, transaction/encryption flags, language driver

    // Header, descriptors, terminator
    let descriptors_len = n_header_bytes.checked_sub(DBF_HEADER_LENGTH + 1);
    let n_fields = match descriptors_len {
        Some(n) if n % DBF_FIELD_DESCRIPTOR_LENGTH == 0 => n / DBF_FIELD_DESCRIPTOR_LENGTH,
        _ => {
            return Err(corrupt(header_len_offset, format!("header length {} does not fit a whole number of {}-byte field descriptors", n_header_bytes, DBF_FIELD_DESCRIPTOR_LENGTH)));
        }
    };

    let mut fields = Vec::<DbfField>::with_capacity(n_fields);
    let mut record_offset = 1; // deletion marker
    for _ in 0..n_fields {
        let field = read_field_descriptor(c, record_offset)?;
        record_offset += field.len as usize;
        fields.push(field);
    }

    let offset = c.offset();
    let terminator = c.read_u8()?;
    if terminator != DBF_HEADER_TERMINATOR {
        return Err(corrupt(offset, format!("expected field terminator 0x0d, found {:#04x}", terminator)));
    }

    if record_offset != n_bytes_per_record {
        return Err(corrupt(header_len_offset + 2, format!("header says records are {} bytes, but fields add up to {}", n_bytes_per_record, record_offset)));
    }

    for (i, field) in fields.iter().enumerate() {
        if fields[.. i].iter().any(|f| f.name == field.name) {
            warn!("The .dbf file has more than one field named '{}'", field.name);
        }
    }

    let meta = DbfMeta {
        version: version,
        n_records: n_records,
        n_header_bytes: n_header_bytes,
        n_bytes_per_record: n_bytes_per_record,
        fields: fields.into(),
        encoding: encoding,
    };
    debug!("read .dbf header: {:?}", meta);

    Ok(meta)
}

/// Reads a single record.
///
/// Assumes the cursor is at the start of the record (its deletion marker).
///
/// Side-effect: advances the cursor to the next record.
pub fn read_dbf_record(c: &mut ByteCursor, meta: &DbfMeta, record_number: usize) -> Result<DbfRecord, DbfError> {
    c.skip(1)?; // deletion marker: ' ' or '*'

    let mut values = Vec::<DbfValue>::with_capacity(meta.fields.len());
    for field in meta.fields.iter() {
        let offset = c.offset();
        let raw = c.read_fixed_string(field.len as usize)?;
        let value = field.parse(raw, meta.encoding).map_err(|reason| DbfError::FieldConversion {
            offset: offset,
            record_number: record_number,
            field: field.name.clone(),
            reason: reason,
        })?;
        values.push(value);
    }

    trace!("read .dbf record {}", record_number);

    Ok(DbfRecord {
        record_number: record_number,
        fields: meta.fields.clone(),
        values: values.into_boxed_slice(),
    })
}

/// Reads an xBase ".dbf" file held in memory, one record per `next()`.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gismesh::read::shapefile::dbf;
///
/// let dbf_reader = dbf::open_ascii(Path::new("parcels.dbf")).unwrap();
/// for record in dbf_reader {
///     println!("{}", record.unwrap());
/// }
/// ```
#[derive(Debug)]
pub struct DbfReader<B: AsRef<[u8]>> {
    data: B,
    pos: usize,
    n_records_already_iterated: usize,
    failed: bool,
    pub meta: DbfMeta,
}

impl<B: AsRef<[u8]>> DbfReader<B> {
    pub fn new(data: B, encoding: EncodingRef) -> Result<DbfReader<B>, DbfError> {
        let meta = read_dbf_meta(&mut ByteCursor::new(data.as_ref()), encoding)?;
        Ok(DbfReader {
            pos: meta.n_header_bytes,
            data: data,
            n_records_already_iterated: 0,
            failed: false,
            meta: meta,
        })
    }

    pub fn fields(&self) -> &[DbfField] {
        &self.meta.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&DbfField> {
        self.meta.fields.iter().find(|f| f.name == name)
    }

    /// Reads every remaining record, failing on the first bad one.
    pub fn read_all(self) -> Result<Box<[DbfRecord]>, DbfError> {
        let records = self.collect::<Result<Vec<DbfRecord>, DbfError>>()?;
        Ok(records.into_boxed_slice())
    }
}

impl<B: AsRef<[u8]>> Iterator for DbfReader<B> {
    type Item = Result<DbfRecord, DbfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.n_records_already_iterated == self.meta.n_records {
            return None;
        }

        let data = self.data.as_ref();
        let start = self.pos.min(data.len());
        let mut c = ByteCursor::with_base(&data[start ..], start);
        self.n_records_already_iterated += 1;

        match read_dbf_record(&mut c, &self.meta, self.n_records_already_iterated) {
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

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.meta.n_records - self.n_records_already_iterated;
        (if self.failed { 0 } else { n }, Some(n))
    }
}

/// Opens an xBase ".dbf" file from the filesystem.
///
/// The file is read into memory and closed before this returns.
pub fn open(path: &Path, encoding: EncodingRef) -> Result<DbfReader<Vec<u8>>, DbfError> {
    let mut buf = Vec::new();
    fs::File::open(path)?.read_to_end(&mut buf)?;
    DbfReader::new(buf, encoding)
}

pub fn open_ascii(path: &Path) -> Result<DbfReader<Vec<u8>>, DbfError> {
    open(path, encoding::all::ASCII)
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use crate::read::shapefile::fixtures::DbfBuilder;
    use super::*;

    fn read(bytes: &[u8]) -> Result<Box<[DbfRecord]>, DbfError> {
        DbfReader::new(bytes, encoding::all::ASCII)?.read_all()
    }

    fn one_field(type_code: char, len: u8, decimal_count: u8, value: &str) -> Result<DbfValue, DbfError> {
        let bytes = DbfBuilder::new().field("X", type_code, len, decimal_count).record(&[ value ]).build();
        read(&bytes).map(|records| records[0].values()[0].clone())
    }

    #[test]
    fn read_header() {
        let bytes = DbfBuilder::new()
            .field("name", 'C', 10, 0)
            .field("area", 'N', 12, 3)
            .record(&[ "a", "1.5" ])
            .record(&[ "b", "2.5" ])
            .build();
        let reader = DbfReader::new(&bytes[..], encoding::all::ASCII).unwrap();
        assert_eq!(2, reader.meta.n_records);
        assert_eq!(97, reader.meta.n_header_bytes);
        assert_eq!(23, reader.meta.n_bytes_per_record);
        assert_eq!(vec![ "name", "area" ], reader.meta.field_names());

        let area = reader.get_field("area").unwrap();
        assert_eq!(DbfType::Numeric, area.data_type);
        assert_eq!(11, area.offset);
        assert_eq!(12, area.len);
        assert_eq!(3, area.decimal_count);
        assert!(reader.get_field("nope").is_none());
    }

    #[test]
    fn integer_with_leading_zero() {
        assert_eq!(DbfValue::Integer(42), one_field('N', 5, 0, "042").unwrap());
    }

    #[test]
    fn negative_integer() {
        assert_eq!(DbfValue::Integer(-7), one_field('N', 5, 0, "-7").unwrap());
    }

    #[test]
    fn decimal_number() {
        assert_eq!(DbfValue::Float(3.14), one_field('N', 8, 2, "3.14").unwrap());
    }

    #[test]
    fn float_without_decimals_is_integer() {
        assert_eq!(DbfValue::Integer(12), one_field('F', 4, 0, "12").unwrap());
    }

    #[test]
    fn date() {
        assert_eq!(DbfValue::Date(NaiveDate::from_ymd_opt(2019, 4, 1).unwrap()), one_field('D', 8, 0, "20190401").unwrap());
    }

    #[test]
    fn blank_number_and_date_are_null() {
        assert_eq!(DbfValue::Null, one_field('N', 5, 0, "").unwrap());
        assert_eq!(DbfValue::Null, one_field('D', 8, 0, "").unwrap());
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(DbfValue::Text("hi there".to_string()), one_field('C', 12, 0, "hi there").unwrap());
        assert_eq!(DbfValue::Text("T".to_string()), one_field('L', 1, 0, "T").unwrap());
    }

    #[test]
    fn non_numeric_number_fails() {
        match one_field('N', 5, 0, "4x2") {
            Err(DbfError::FieldConversion { record_number: 1, ref field, .. }) if field == "X" => {}
            other => panic!("expected FieldConversion, got {:?}", other),
        }
    }

    #[test]
    fn decimal_in_integer_field_fails() {
        assert!(match one_field('N', 5, 0, "4.5") { Err(DbfError::FieldConversion { .. }) => true, _ => false });
    }

    #[test]
    fn malformed_date_fails() {
        assert!(match one_field('D', 8, 0, "20191301") { Err(DbfError::FieldConversion { .. }) => true, _ => false });
        assert!(match one_field('D', 8, 0, "2019-4-1") { Err(DbfError::FieldConversion { .. }) => true, _ => false });
    }

    #[test]
    fn conversion_error_reports_offset() {
        let bytes = DbfBuilder::new()
            .field("a", 'N', 3, 0)
            .field("b", 'N', 3, 0)
            .record(&[ "1", "2" ])
            .record(&[ "3", "zz" ])
            .build();
        // header 97 bytes, records 7 bytes each; field "b" of record 2 is at 97 + 7 + 4
        match read(&bytes) {
            Err(DbfError::FieldConversion { offset: 108, record_number: 2, .. }) => {}
            other => panic!("expected FieldConversion, got {:?}", other),
        }
    }

    #[test]
    fn records_are_positional() {
        let bytes = DbfBuilder::new()
            .field("id", 'N', 4, 0)
            .field("desc", 'C', 6, 0)
            .record(&[ "1", "one" ])
            .record(&[ "2", "two" ])
            .build();
        let records = read(&bytes).unwrap();
        assert_eq!(2, records.len());
        assert_eq!(2, records[1].len());
        assert_eq!(Some(("id", &DbfValue::Integer(2))), records[1].get(0));
        assert_eq!(Some(&DbfValue::Text("two".to_string())), records[1].value("desc"));
        assert_eq!(None, records[1].get(2));
        assert_eq!("id: 1; desc: one", records[0].to_string());
    }

    #[test]
    fn memo_flag_version_is_accepted() {
        let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).record(&[ "x" ]).build();
        bytes[0] = 0x83;
        assert_eq!(1, read(&bytes).unwrap().len());
    }

    #[test]
    fn wrong_version() {
        let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).build();
        bytes[0] = 0x04;
        match read(&bytes) {
            Err(DbfError::UnsupportedVersion { offset: 0, found: 0x04 }) => {}
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn dbase4_versions_are_rejected() {
        for &found in [ 0x8bu8, 0x43, 0x63, 0xcb, 0x0b ].iter() {
            let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).build();
            bytes[0] = found;
            match read(&bytes) {
                Err(DbfError::UnsupportedVersion { offset: 0, found: f }) if f == found => {}
                other => panic!("expected UnsupportedVersion for {:#04x}, got {:?}", found, other),
            }
        }
    }

    #[test]
    fn memo_is_text() {
        assert_eq!(DbfValue::Text("0000000012".to_string()), one_field('M', 10, 0, "0000000012").unwrap());
    }

    #[test]
    fn header_length_must_fit_descriptors() {
        let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).build();
        bytes[8] += 1;
        match read(&bytes) {
            Err(DbfError::CorruptHeader { offset: 8, .. }) => {}
            other => panic!("expected CorruptHeader, got {:?}", other),
        }
    }

    #[test]
    fn missing_terminator() {
        let builder = DbfBuilder::new().field("a", 'C', 2, 0);
        let mut bytes = builder.build();
        bytes[builder.header_len() - 1] = b' ';
        match read(&bytes) {
            Err(DbfError::CorruptHeader { offset: 64, .. }) => {}
            other => panic!("expected CorruptHeader, got {:?}", other),
        }
    }

    #[test]
    fn index_flag_must_be_0_or_1() {
        let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).build();
        bytes[63] = 1;
        assert!(DbfReader::new(&bytes[..], encoding::all::ASCII).unwrap().fields()[0].indexed);
        bytes[63] = 2;
        match read(&bytes) {
            Err(DbfError::CorruptHeader { offset: 63, .. }) => {}
            other => panic!("expected CorruptHeader, got {:?}", other),
        }
    }

    #[test]
    fn unknown_field_type() {
        let bytes = DbfBuilder::new().field("a", 'Q', 2, 0).build();
        assert!(match read(&bytes) { Err(DbfError::CorruptHeader { offset: 43, .. }) => true, _ => false });
    }

    #[test]
    fn record_length_must_match_fields() {
        let mut bytes = DbfBuilder::new().field("a", 'C', 2, 0).build();
        bytes[10] += 1;
        assert!(match read(&bytes) { Err(DbfError::CorruptHeader { .. }) => true, _ => false });
    }

    #[test]
    fn truncated_records() {
        let bytes = DbfBuilder::new().field("a", 'C', 4, 0).record(&[ "x" ]).record(&[ "y" ]).build();
        // drop the end marker and half the last record
        let mut reader = DbfReader::new(&bytes[.. bytes.len() - 3], encoding::all::ASCII).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(DbfError::TruncatedInput(_))) => {}
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn windows_1252_text() {
        let builder = DbfBuilder::new().field("name", 'C', 5, 0).record(&[ "caf" ]);
        let mut bytes = builder.build();
        bytes[builder.header_len() + 1 + 3] = 0xe9;
        let records = DbfReader::new(&bytes[..], encoding::all::WINDOWS_1252).unwrap().read_all().unwrap();
        assert_eq!(DbfValue::Text("café".to_string()), records[0].values()[0]);
    }

    #[test]
    fn date_displays_as_iso() {
        let value = DbfValue::Date(NaiveDate::from_ymd_opt(2019, 4, 1).unwrap());
        assert_eq!("2019-04-01", value.to_string());
    }
}
