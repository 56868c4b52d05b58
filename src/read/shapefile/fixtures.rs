//! Builds small ".shp" and ".dbf" files in memory, for tests.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

pub struct ShpBuilder {
    shape_type: u32,
    z_range: (f64, f64),
    records: Vec<Vec<u8>>,
}

fn write_bbox(buf: &mut Vec<u8>) {
    for _ in 0..4 {
        buf.write_f64::<LittleEndian>(0.).unwrap();
    }
}

fn write_z_and_measures(buf: &mut Vec<u8>, points: &[(f64, f64, f64)], measures: Option<&[f64]>) {
    let zmin = points.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
    let zmax = points.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
    buf.write_f64::<LittleEndian>(zmin).unwrap();
    buf.write_f64::<LittleEndian>(zmax).unwrap();
    for &(_, _, z) in points {
        buf.write_f64::<LittleEndian>(z).unwrap();
    }
    if let Some(ms) = measures {
        buf.write_f64::<LittleEndian>(0.).unwrap();
        buf.write_f64::<LittleEndian>(1.).unwrap();
        for &m in ms {
            buf.write_f64::<LittleEndian>(m).unwrap();
        }
    }
}

impl ShpBuilder {
    pub fn new(shape_type: u32) -> ShpBuilder {
        ShpBuilder {
            shape_type: shape_type,
            z_range: (0., 0.),
            records: vec![],
        }
    }

    pub fn z_range(mut self, zmin: f64, zmax: f64) -> ShpBuilder {
        self.z_range = (zmin, zmax);
        self
    }

    /// Adds a record with the given content (everything after the 8-byte
    /// record header).
    pub fn raw_record(mut self, content: Vec<u8>) -> ShpBuilder {
        self.records.push(content);
        self
    }

    pub fn null(self) -> ShpBuilder {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(0).unwrap();
        self.raw_record(buf)
    }

    pub fn point(self, x: f64, y: f64) -> ShpBuilder {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        buf.write_f64::<LittleEndian>(x).unwrap();
        buf.write_f64::<LittleEndian>(y).unwrap();
        self.raw_record(buf)
    }

    pub fn multi_point(self, points: &[(f64, f64)]) -> ShpBuilder {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        write_bbox(&mut buf);
        buf.write_u32::<LittleEndian>(points.len() as u32).unwrap();
        for &(x, y) in points {
            buf.write_f64::<LittleEndian>(x).unwrap();
            buf.write_f64::<LittleEndian>(y).unwrap();
        }
        self.raw_record(buf)
    }

    pub fn point_z(self, x: f64, y: f64, z: f64, m: Option<f64>) -> ShpBuilder {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        buf.write_f64::<LittleEndian>(x).unwrap();
        buf.write_f64::<LittleEndian>(y).unwrap();
        buf.write_f64::<LittleEndian>(z).unwrap();
        if let Some(m) = m {
            buf.write_f64::<LittleEndian>(m).unwrap();
        }
        self.raw_record(buf)
    }

    pub fn multi_point_z(self, points: &[(f64, f64, f64)], measures: Option<&[f64]>) -> ShpBuilder {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        write_bbox(&mut buf);
        buf.write_u32::<LittleEndian>(points.len() as u32).unwrap();
        for &(x, y, _) in points {
            buf.write_f64::<LittleEndian>(x).unwrap();
            buf.write_f64::<LittleEndian>(y).unwrap();
        }
        write_z_and_measures(&mut buf, points, measures);
        self.raw_record(buf)
    }

    fn poly_content(&self, parts: &[u32], points: &[(f64, f64, f64)]) -> Vec<u8> {
        let mut buf = vec![];
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        write_bbox(&mut buf);
        buf.write_u32::<LittleEndian>(parts.len() as u32).unwrap();
        buf.write_u32::<LittleEndian>(points.len() as u32).unwrap();
        for &part in parts {
            buf.write_u32::<LittleEndian>(part).unwrap();
        }
        for &(x, y, _) in points {
            buf.write_f64::<LittleEndian>(x).unwrap();
            buf.write_f64::<LittleEndian>(y).unwrap();
        }
        buf
    }

    pub fn poly(self, parts: &[u32], points: &[(f64, f64)]) -> ShpBuilder {
        let xyz: Vec<(f64, f64, f64)> = points.iter().map(|&(x, y)| (x, y, 0.)).collect();
        let buf = self.poly_content(parts, &xyz);
        self.raw_record(buf)
    }

    pub fn poly_z(self, parts: &[u32], points: &[(f64, f64, f64)], measures: Option<&[f64]>) -> ShpBuilder {
        let mut buf = self.poly_content(parts, points);
        write_z_and_measures(&mut buf, points, measures);
        self.raw_record(buf)
    }

    pub fn build(&self) -> Vec<u8> {
        let n_bytes = 100 + self.records.iter().map(|r| 8 + r.len()).sum::<usize>();

        let mut buf = Vec::with_capacity(n_bytes);
        buf.write_u32::<BigEndian>(9994).unwrap();
        buf.extend_from_slice(&[ 0u8; 20 ]);
        buf.write_u32::<BigEndian>((n_bytes / 2) as u32).unwrap();
        buf.write_u32::<LittleEndian>(1000).unwrap();
        buf.write_u32::<LittleEndian>(self.shape_type).unwrap();
        write_bbox(&mut buf);
        buf.write_f64::<LittleEndian>(self.z_range.0).unwrap();
        buf.write_f64::<LittleEndian>(self.z_range.1).unwrap();
        buf.write_f64::<LittleEndian>(0.).unwrap();
        buf.write_f64::<LittleEndian>(0.).unwrap();

        for (i, content) in self.records.iter().enumerate() {
            buf.write_u32::<BigEndian>(i as u32 + 1).unwrap();
            buf.write_u32::<BigEndian>((content.len() / 2) as u32).unwrap();
            buf.extend_from_slice(content);
        }

        buf
    }
}

pub struct DbfBuilder {
    fields: Vec<(&'static str, u8, u8, u8)>,
    records: Vec<Vec<String>>,
}

impl DbfBuilder {
    pub fn new() -> DbfBuilder {
        DbfBuilder { fields: vec![], records: vec![] }
    }

    pub fn field(mut self, name: &'static str, type_code: char, len: u8, decimal_count: u8) -> DbfBuilder {
        self.fields.push((name, type_code as u8, len, decimal_count));
        self
    }

    pub fn record(mut self, values: &[&str]) -> DbfBuilder {
        self.records.push(values.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn header_len(&self) -> usize {
        32 + 32 * self.fields.len() + 1
    }

    pub fn build(&self) -> Vec<u8> {
        let record_len = 1 + self.fields.iter().map(|f| f.2 as usize).sum::<usize>();

        let mut buf = vec![];
        buf.write_u8(0x03).unwrap();
        buf.extend_from_slice(&[ 119, 4, 1 ]);
        buf.write_u32::<LittleEndian>(self.records.len() as u32).unwrap();
        buf.write_u16::<LittleEndian>(self.header_len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(record_len as u16).unwrap();
        buf.extend_from_slice(&[ 0u8; 20 ]);

        for &(name, type_code, len, decimal_count) in self.fields.iter() {
            let mut name_bytes = [ 0u8; 11 ];
            name_bytes[.. name.len()].copy_from_slice(name.as_bytes());
            buf.extend_from_slice(&name_bytes);
            buf.write_u8(type_code).unwrap();
            buf.extend_from_slice(&[ 0u8; 4 ]);
            buf.write_u8(len).unwrap();
            buf.write_u8(decimal_count).unwrap();
            buf.extend_from_slice(&[ 0u8; 14 ]);
        }
        buf.write_u8(0x0d).unwrap();

        for record in self.records.iter() {
            buf.write_u8(b' ').unwrap();
            for (value, &(_, type_code, len, _)) in record.iter().zip(self.fields.iter()) {
                let width = len as usize;
                let text = match type_code {
                    b'N' | b'F' => format!("{:>width$}", value, width = width),
                    _ => format!("{:<width$}", value, width = width),
                };
                buf.extend_from_slice(&text.as_bytes()[.. width]);
            }
        }
        buf.write_u8(0x1a).unwrap();

        buf
    }
}
