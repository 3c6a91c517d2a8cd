//! Résolution du graphe géométrique : points → courbes → surfaces
//!
//! Chaque document est résolu dans des arènes indexées par l'identifiant
//! source. Les courbes référencent les points par identifiant et les
//! surfaces référencent les courbes par identifiant : aucune liaison
//! directe entre objets, donc aucun cycle de possession.

pub mod curve;
pub mod surface;

use std::collections::HashMap;

use fast_float::parse;
use geo::Coord;
use roxmltree::Node;
use tracing::warn;

use crate::error::ParseError;
use crate::xml::{self, NS_ZMN};

pub use curve::{resolve_curves, Curves};
pub use surface::{resolve_surfaces, Surfaces};

/// Points du document, en unités planes source (X, Y tels que lus)
pub type Points = HashMap<String, Coord>;

/// Résout les `zmn:GM_Point` de la section 空間属性
pub fn resolve_points(spatial: Node) -> Result<Points, ParseError> {
    let mut points = Points::new();

    for point in xml::children(spatial, NS_ZMN, "GM_Point") {
        let point_id = xml::required_attr(point, "id")?;
        let pos = xml::descendant(point, NS_ZMN, "DirectPosition").ok_or_else(|| {
            ParseError::malformed_geometry(point_id, "missing DirectPosition")
        })?;

        let coord = read_xy(pos, point_id)?;
        if points.insert(point_id.to_string(), coord).is_some() {
            warn!(point_id, "Point identifier reused, keeping last definition");
        }
    }

    Ok(points)
}

/// Lit une paire `zmn:X` / `zmn:Y`.
///
/// Retourne `Coord { x: X, y: Y }` dans l'ordre du fichier (X = Nord).
pub(crate) fn read_xy(pos: Node, owner_id: &str) -> Result<Coord, ParseError> {
    let mut x = None;
    let mut y = None;

    for xy in xml::elements(pos) {
        let value = || parse_number(xy, owner_id);
        match (xy.tag_name().namespace(), xy.tag_name().name()) {
            (Some(NS_ZMN), "X") => x = Some(value()?),
            (Some(NS_ZMN), "Y") => y = Some(value()?),
            (_, other) => {
                return Err(ParseError::malformed_geometry(
                    owner_id,
                    format!("unknown coordinate tag: {}", other),
                ))
            }
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        (None, _) => Err(ParseError::malformed_geometry(owner_id, "missing X")),
        (_, None) => Err(ParseError::malformed_geometry(owner_id, "missing Y")),
    }
}

fn parse_number(node: Node, owner_id: &str) -> Result<f64, ParseError> {
    let text = node.text().unwrap_or("").trim();
    parse::<f64, _>(text).map_err(|_| {
        ParseError::malformed_geometry(owner_id, format!("invalid coordinate value: {:?}", text))
    })
}
