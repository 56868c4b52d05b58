//! Hands mesh buffers to whatever writes the mesh file.

use std::collections::BTreeMap;
use std::io;
use log::debug;

use super::{CellArray, CellType, ExportError, ExportOptions, MeshBuffers, Points};

/// Named attribute arrays.
pub type DataArrays = BTreeMap<String, CellArray>;

/// A mesh-file writer. This crate only ever calls it; it never encodes mesh
/// files itself.
pub trait MeshSink {
    /// A point cloud: every point is its own cell, so `cell_data` has one
    /// element per point.
    fn write_points(&mut self, points: &Points, cell_data: &DataArrays, point_data: &DataArrays, comments: &[String]) -> io::Result<()>;

    /// Polylines: line `i` is the next `points_per_line[i]` points.
    fn write_poly_lines(&mut self, points: &Points, points_per_line: &[usize], cell_data: &DataArrays, point_data: &DataArrays) -> io::Result<()>;

    /// Arbitrary cells: cell `i` is `connectivity[offsets[i-1] .. offsets[i]]`.
    fn write_unstructured_grid(&mut self, points: &Points, connectivity: &[usize], offsets: &[usize], cell_types: &[CellType], cell_data: &DataArrays, point_data: &DataArrays, comments: &[String]) -> io::Result<()>;
}

/// Writes `buffers` through the sink entry point that suits its shape type.
///
/// Points and multipoints become a point cloud, polylines become polylines
/// and polygons become an unstructured grid. No point data is ever written.
pub fn export<S: MeshSink>(buffers: &MeshBuffers, sink: &mut S, options: &ExportOptions) -> Result<(), ExportError> {
    let point_data = DataArrays::new();
    let comments = buffers.comments(&options.comments);

    match CellType::for_shape_type(buffers.shape_type)? {
        CellType::Vertex | CellType::PolyVertex => {
            debug!("Exporting {} points", buffers.points.len());
            sink.write_points(&buffers.points, &buffers.per_point_cell_data(), &point_data, &comments)?;
        }
        CellType::PolyLine => {
            debug!("Exporting {} polylines", buffers.n_cells());
            sink.write_poly_lines(&buffers.points, &buffers.points_per_shape, &buffers.cell_data, &point_data)?;
        }
        CellType::Polygon => {
            debug!("Exporting {} polygons", buffers.n_cells());
            sink.write_unstructured_grid(
                &buffers.points,
                &buffers.connectivity,
                &buffers.cell_offsets,
                &buffers.cell_types,
                &buffers.cell_data,
                &point_data,
                &comments,
            )?;
        }
    }

    Ok(())
}
