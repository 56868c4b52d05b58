use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use gismesh::mesh::{self, CellType, ExportOptions, MeshBuffers, MeshSink, Points};
use gismesh::mesh::sink::DataArrays;
use gismesh::read::shapefile;

/// Prints what a mesh writer would be handed.
struct SummarySink;

fn print_arrays(kind: &str, arrays: &DataArrays) {
    for (name, array) in arrays.iter() {
        println!("  {} {}: {} values", kind, name, array.len());
    }
}

impl MeshSink for SummarySink {
    fn write_points(&mut self, points: &Points, cell_data: &DataArrays, point_data: &DataArrays, comments: &[String]) -> io::Result<()> {
        println!("Point cloud: {} points", points.len());
        print_arrays("cell", cell_data);
        print_arrays("point", point_data);
        for comment in comments {
            println!("  # {}", comment);
        }
        Ok(())
    }

    fn write_poly_lines(&mut self, points: &Points, points_per_line: &[usize], cell_data: &DataArrays, point_data: &DataArrays) -> io::Result<()> {
        println!("Polylines: {} points in {} lines", points.len(), points_per_line.len());
        print_arrays("cell", cell_data);
        print_arrays("point", point_data);
        Ok(())
    }

    fn write_unstructured_grid(&mut self, points: &Points, connectivity: &[usize], offsets: &[usize], cell_types: &[CellType], cell_data: &DataArrays, point_data: &DataArrays, comments: &[String]) -> io::Result<()> {
        println!("Unstructured grid: {} points, {} connections, {} cells", points.len(), connectivity.len(), offsets.len());
        if let Some(cell_type) = cell_types.first() {
            println!("  cell type {:?} ({})", cell_type, cell_type.id());
        }
        print_arrays("cell", cell_data);
        print_arrays("point", point_data);
        for comment in comments {
            println!("  # {}", comment);
        }
        Ok(())
    }
}

/// First line of the ".prj" beside `shp_path`, if there is one.
fn read_projection(shp_path: &Path) -> Option<String> {
    let mut prj_path = PathBuf::from(shp_path);
    prj_path.set_extension("prj");
    fs::read_to_string(prj_path).ok()
        .and_then(|s| s.lines().next().map(|l| l.to_string()))
}

fn main() {
    env_logger::init();

    let mut args = env::args();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <SHP_PATH> [DEFAULT_Z]", args.next().unwrap_or_else(|| "shp-to-mesh".to_string()));
        process::exit(1);
    }

    args.next();
    let path = PathBuf::from(args.next().unwrap());

    let default_z = match args.next().map(|s| s.parse::<f64>()) {
        None => None,
        Some(Ok(z)) => Some(z),
        Some(Err(err)) => {
            eprintln!("Invalid DEFAULT_Z: {}", err);
            process::exit(1);
        }
    };

    let options = ExportOptions {
        default_z: default_z,
        comments: read_projection(&path).into_iter().collect(),
    };

    let shapefile = match shapefile::open_windows1252(&path) {
        Ok(shapefile) => shapefile,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let result = MeshBuffers::from_shapefile(&shapefile, &options)
        .and_then(|buffers| mesh::export(&buffers, &mut SummarySink, &options));

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}
