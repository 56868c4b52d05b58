use std::env;
use std::path::PathBuf;
use std::process;
use gismesh::read::shapefile;

fn main() {
    env_logger::init();

    let mut args = env::args();

    if args.len() != 2 {
        eprintln!("Usage: {} <SHP_PATH>", args.next().unwrap_or_else(|| "cat-shp".to_string()));
        process::exit(1);
    }

    args.next();
    let path = PathBuf::from(args.next().unwrap());

    match shapefile::open_windows1252(&path) {
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
        Ok(shapefile) => {
            println!("{} ({:?})", shapefile.shape_type(), shapefile.header().bounding_box);
            println!("Fields: {}", shapefile.dbf_meta().field_names().join(", "));

            for feature in shapefile.features() {
                println!("{}", feature);
            }

            println!("Read {} records", shapefile.len());
        }
    }
}
