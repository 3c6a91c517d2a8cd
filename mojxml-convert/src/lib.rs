//! # mojxml-convert
//!
//! Conversion des fichiers 地図XML du 法務省 en GeoJSON.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Un fichier, un zip de diffusion
//! mojxml-convert parcelles.geojson 15222-1107-1553.xml 12103-0400.zip
//!
//! # Un dossier complet en GeoJSON ligne à ligne, avec les 任意座標系
//! mojxml-convert --arbitrary --worker thread parcelles.ndjson ./data/
//! ```

pub mod config;
pub mod convert;
pub mod export;
pub mod report;

pub use config::Config;
pub use convert::{convert, ConvertSettings};
pub use report::{ConversionReport, ConversionStatus};
