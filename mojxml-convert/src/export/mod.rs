//! Modules d'export

pub mod geojson;

pub use geojson::{GeoJsonSink, Layout};
