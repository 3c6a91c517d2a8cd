//! Résolution des courbes (`zmn:GM_Curve`)
//!
//! Une courbe porte deux colonnes (les deux extrémités du segment) ; seule la
//! position de la première est exploitée. Elle est soit directe (X/Y), soit
//! indirecte (référence vers un `GM_Point`).

use std::collections::HashMap;

use geo::Coord;
use roxmltree::Node;

use super::{read_xy, Points};
use crate::error::ParseError;
use crate::xml::{self, NS_ZMN};

/// Arène des courbes : coordonnées contiguës, indexées par identifiant.
///
/// Les coordonnées sont stockées en (Est, Nord), soit (Y, X) du fichier,
/// pour être directement reprojetées en (longitude, latitude).
#[derive(Debug, Default, Clone)]
pub struct Curves {
    ids: Vec<String>,
    coords: Vec<Coord>,
    index: HashMap<String, usize>,
}

impl Curves {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Coord> {
        self.index.get(id).map(|&i| self.coords[i])
    }

    /// Coordonnées dans l'ordre du document, pour une transformation batch
    pub fn coords_mut(&mut self) -> &mut [Coord] {
        &mut self.coords
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coord)> {
        self.ids.iter().map(String::as_str).zip(self.coords.iter().copied())
    }

    fn insert(&mut self, id: &str, coord: Coord) -> Result<(), ParseError> {
        if self.index.contains_key(id) {
            return Err(ParseError::duplicate("curve", id));
        }
        self.index.insert(id.to_string(), self.coords.len());
        self.ids.push(id.to_string());
        self.coords.push(coord);
        Ok(())
    }
}

/// Résout les `zmn:GM_Curve` de la section 空間属性
pub fn resolve_curves(spatial: Node, points: &Points) -> Result<Curves, ParseError> {
    let mut curves = Curves::default();

    for curve in xml::children(spatial, NS_ZMN, "GM_Curve") {
        let curve_id = xml::required_attr(curve, "id")?;
        let position = first_column_position(curve, curve_id)?;

        let xy = match position.tag_name().name() {
            "GM_Position.indirect" => {
                let reference = xml::elements(position).next().ok_or_else(|| {
                    ParseError::malformed_geometry(curve_id, "empty indirect position")
                })?;
                let idref = xml::required_attr(reference, "idref")?;
                *points
                    .get(idref)
                    .ok_or_else(|| ParseError::dangling("point", idref))?
            }
            "GM_Position.direct" => read_xy(position, curve_id)?,
            other => {
                return Err(ParseError::malformed_geometry(
                    curve_id,
                    format!("unknown position tag: {}", other),
                ))
            }
        };

        // X est le Nord, Y l'Est
        curves.insert(curve_id, Coord { x: xy.y, y: xy.x })?;
    }

    Ok(curves)
}

/// Position de la première colonne de l'unique segment de la courbe
fn first_column_position<'a, 'input>(
    curve: Node<'a, 'input>,
    curve_id: &str,
) -> Result<Node<'a, 'input>, ParseError> {
    let mut segments = xml::children(curve, NS_ZMN, "GM_Curve.segment");
    let segment = match (segments.next(), segments.next()) {
        (Some(segment), None) => segment,
        _ => {
            return Err(ParseError::malformed_geometry(
                curve_id,
                "expected exactly one GM_Curve.segment",
            ))
        }
    };

    let columns: Vec<Node> = segment
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name((NS_ZMN, "GM_PointArray.column")))
        .collect();
    if columns.len() != 2 {
        return Err(ParseError::malformed_geometry(
            curve_id,
            format!("expected 2 GM_PointArray.column, found {}", columns.len()),
        ));
    }

    let mut positions = xml::elements(columns[0]);
    match (positions.next(), positions.next()) {
        (Some(position), None) => Ok(position),
        _ => Err(ParseError::malformed_geometry(
            curve_id,
            "expected exactly one position in column",
        )),
    }
}
