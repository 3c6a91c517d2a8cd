//! Résolution des surfaces (`zmn:GM_Surface`) en polygones fermés

use std::collections::HashMap;

use geo::{Coord, LineString, Polygon};
use roxmltree::Node;

use super::Curves;
use crate::error::ParseError;
use crate::xml::{self, NS_ZMN};

/// Surfaces du document : un polygone (extérieur + trous) par identifiant
pub type Surfaces = HashMap<String, Polygon<f64>>;

/// Résout les `zmn:GM_Surface` à partir des courbes déjà reprojetées
pub fn resolve_surfaces(spatial: Node, curves: &Curves) -> Result<Surfaces, ParseError> {
    let mut surfaces = Surfaces::new();

    for surface in xml::children(spatial, NS_ZMN, "GM_Surface") {
        let surface_id = xml::required_attr(surface, "id")?;
        let polygon = single_polygon(surface, surface_id)?;

        let exterior = xml::descendant(polygon, NS_ZMN, "GM_SurfaceBoundary.exterior")
            .ok_or_else(|| ParseError::malformed_geometry(surface_id, "missing exterior"))?;
        let exterior = build_ring(exterior, curves, surface_id)?;

        let interiors = polygon
            .descendants()
            .filter(|n| {
                n.is_element() && n.has_tag_name((NS_ZMN, "GM_SurfaceBoundary.interior"))
            })
            .map(|interior| build_ring(interior, curves, surface_id))
            .collect::<Result<Vec<_>, _>>()?;

        if surfaces.contains_key(surface_id) {
            return Err(ParseError::duplicate("surface", surface_id));
        }
        surfaces.insert(surface_id.to_string(), Polygon::new(exterior, interiors));
    }

    Ok(surfaces)
}

/// L'unique `GM_Polygon` de `GM_Surface.patch`
fn single_polygon<'a, 'input>(
    surface: Node<'a, 'input>,
    surface_id: &str,
) -> Result<Node<'a, 'input>, ParseError> {
    let mut polygons = xml::children(surface, NS_ZMN, "GM_Surface.patch")
        .flat_map(|patch| xml::children(patch, NS_ZMN, "GM_Polygon"));

    match (polygons.next(), polygons.next()) {
        (Some(polygon), None) => Ok(polygon),
        _ => Err(ParseError::malformed_geometry(
            surface_id,
            "expected exactly one GM_Polygon",
        )),
    }
}

/// Construit un anneau fermé depuis les références de courbes d'un contour
fn build_ring(boundary: Node, curves: &Curves, surface_id: &str) -> Result<LineString, ParseError> {
    let ring = xml::descendant(boundary, NS_ZMN, "GM_Ring")
        .ok_or_else(|| ParseError::malformed_geometry(surface_id, "boundary without GM_Ring"))?;

    let mut coords = xml::elements(ring)
        .map(|member| {
            let curve_id = xml::required_attr(member, "idref")?;
            curves
                .get(curve_id)
                .ok_or_else(|| ParseError::dangling("curve", curve_id))
        })
        .collect::<Result<Vec<Coord>, _>>()?;

    close_ring(&mut coords).ok_or_else(|| ParseError::EmptyRing {
        surface_id: surface_id.to_string(),
    })?;

    Ok(LineString::new(coords))
}

/// Répète le premier sommet en fin d'anneau ; `None` si l'anneau est vide
pub fn close_ring(coords: &mut Vec<Coord>) -> Option<()> {
    let first = *coords.first()?;
    coords.push(first);
    Some(())
}
