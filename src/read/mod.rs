pub mod cursor;
pub mod shapefile;
