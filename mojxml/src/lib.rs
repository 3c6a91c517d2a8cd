//! # mojxml
//!
//! Parser pour le format 地図XML du 法務省 (données du 登記所備付地図).
//!
//! ## Features
//!
//! - Résolution du graphe géométrique (points, courbes, surfaces) en arènes
//! - Reprojection des 19 zones du système plan rectangulaire vers EPSG:4326,
//!   en Rust pur ou via PROJ (feature `proj`)
//! - Lecture transparente des fichiers `.xml` et des archives zip imbriquées
//! - Exécuteurs bornés : processus (binaire `mojxml-worker`), threads rayon
//!   ou séquentiel
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mojxml::executor::{executor_for, WorkerKind};
//! use mojxml::{iter_content_xmls, ParseOptions};
//!
//! let executor = executor_for(WorkerKind::Thread, ParseOptions::default(), None)?;
//! let source = Box::new(iter_content_xmls(["15222-1107-1553.xml"]));
//!
//! for features in executor.iter_process(source) {
//!     for feature in features? {
//!         println!("{:?}", feature.text("地番"));
//!     }
//! }
//! ```

pub mod error;
pub mod executor;
pub mod geometry;
pub mod parser;
pub mod reader;
pub mod reproject;
pub mod types;
pub mod xml;

pub use error::{MojxmlError, ParseError};
pub use parser::parse_raw;
pub use reader::{collect_sources, iter_content_xmls};
pub use types::{Feature, FieldType, ParseOptions, Value, OUTPUT_SCHEMA};
