//! Export vers GeoJSON avec geozero (streaming)
//!
//! Deux dispositions : une `FeatureCollection` unique (`.geojson`, `.json`)
//! ou une feature par ligne (`.geojsonl`, `.ndjson`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{Geometry, InteriorPoint};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use mojxml::reproject::truncate9;
use mojxml::types::{KEY_FUDE_ID, KEY_REP_LAT, KEY_REP_LON};
use mojxml::{Feature, Value, OUTPUT_SCHEMA};

/// CRS déclaré dans l'en-tête de la collection
pub const CRS_NAME: &str = "urn:ogc:def:crs:EPSG::4326";

static NULL: Value = Value::Null;

/// Disposition du fichier de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Une `FeatureCollection`
    Collection,
    /// Une feature par ligne
    Lines,
}

impl Layout {
    /// Déduit la disposition de l'extension du fichier
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("geojson" | "json") => Ok(Self::Collection),
            Some("geojsonl" | "ndjson") => Ok(Self::Lines),
            _ => bail!(
                "Unsupported output format: {} (use .geojson, .json, .geojsonl or .ndjson)",
                path.display()
            ),
        }
    }
}

/// Écrit les features au fil de l'eau
pub struct GeoJsonSink<W: Write> {
    writer: W,
    layout: Layout,
    written: usize,
    representative_point: bool,
}

impl GeoJsonSink<BufWriter<File>> {
    /// Crée le fichier de sortie ; la disposition dépend de l'extension
    pub fn create(path: &Path, representative_point: bool) -> Result<Self> {
        let layout = Layout::from_path(path)?;
        let file = File::create(path)
            .context(format!("Failed to create file: {}", path.display()))?;
        Self::new(BufWriter::new(file), layout, representative_point)
    }
}

impl<W: Write> GeoJsonSink<W> {
    pub fn new(mut writer: W, layout: Layout, representative_point: bool) -> Result<Self> {
        if layout == Layout::Collection {
            write!(
                writer,
                r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"{}"}}}},"features":["#,
                CRS_NAME
            )?;
        }
        Ok(Self {
            writer,
            layout,
            written: 0,
            representative_point,
        })
    }

    /// Écrit les features d'un document
    pub fn write_features(&mut self, features: &[Feature]) -> Result<()> {
        for feature in features {
            if self.layout == Layout::Collection && self.written > 0 {
                self.writer.write_all(b",")?;
            }
            write_feature(&mut self.writer, feature, self.representative_point)?;
            if self.layout == Layout::Lines {
                self.writer.write_all(b"\n")?;
            }
            self.written += 1;
        }
        Ok(())
    }

    /// Nombre de features écrites
    pub fn written(&self) -> usize {
        self.written
    }

    /// Termine le fichier et retourne le writer
    pub fn finish(mut self) -> Result<W> {
        if self.layout == Layout::Collection {
            write!(self.writer, "]}}")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(
    writer: &mut W,
    feature: &Feature,
    representative_point: bool,
) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","#)?;
    if let Some(id) = feature.text(KEY_FUDE_ID) {
        writer.write_all(br#""id":"#)?;
        write_string(writer, id)?;
        writer.write_all(b",")?;
    }

    // Geometry via geozero
    write!(writer, r#""geometry":"#)?;
    match &feature.geometry {
        Some(geometry) => {
            let mut geom_buf = Vec::new();
            let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
            Geometry::MultiPolygon(geometry.clone()).process_geom(&mut geom_writer)?;
            writer.write_all(&geom_buf)?;
        }
        None => writer.write_all(b"null")?,
    }

    let filled = if representative_point {
        representative_values(feature)
    } else {
        None
    };

    write!(writer, r#","properties":{{"#)?;
    for (i, (key, value)) in ordered_properties(feature).into_iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        let value = match (&filled, key) {
            (Some([lon, _]), KEY_REP_LON) if value.is_null() => lon,
            (Some([_, lat]), KEY_REP_LAT) if value.is_null() => lat,
            _ => value,
        };
        write_string(writer, key)?;
        writer.write_all(b":")?;
        write_value(writer, value)?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

/// Colonnes du schéma dans l'ordre (absentes = null), puis clés
/// supplémentaires triées
fn ordered_properties(feature: &Feature) -> Vec<(&str, &Value)> {
    let mut ordered: Vec<(&str, &Value)> = OUTPUT_SCHEMA
        .iter()
        .map(|(key, _)| (*key, feature.properties.get(*key).unwrap_or(&NULL)))
        .collect();

    let mut extra: Vec<(&str, &Value)> = feature
        .properties
        .iter()
        .filter(|(key, _)| !OUTPUT_SCHEMA.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    extra.sort_by_key(|(key, _)| *key);

    ordered.extend(extra);
    ordered
}

/// Point intérieur de la géométrie, tronqué comme les sommets
fn representative_values(feature: &Feature) -> Option<[Value; 2]> {
    let point = feature.geometry.as_ref()?.interior_point()?;
    Some([
        Value::Float(truncate9(point.x())),
        Value::Float(truncate9(point.y())),
    ])
}

fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Text(text) => write_string(writer, text)?,
        Value::Float(number) if number.is_finite() => write!(writer, "{}", number)?,
        Value::Float(_) | Value::Null => writer.write_all(b"null")?,
    }
    Ok(())
}

/// Chaîne JSON entre guillemets, échappée par serde_json
fn write_string<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    serde_json::to_writer(&mut *writer, text)?;
    Ok(())
}
