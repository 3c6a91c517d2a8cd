//! Reprojection avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `proj`.

use geo::Coord;
use proj::Proj;

use super::TARGET_EPSG;
use crate::error::ParseError;

/// Transformation PROJ d'une zone du système plan vers EPSG:4326
pub struct ProjReprojector {
    proj: Proj,
}

impl ProjReprojector {
    pub fn new(source_epsg: u32) -> Result<Self, ParseError> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", TARGET_EPSG);

        // new_known_crs normalise l'ordre des axes (Est, Nord) -> (lon, lat)
        let proj = Proj::new_known_crs(&source, &target, None).map_err(|e| {
            ParseError::UnknownReferenceSystem(format!("{}: {}", source, e))
        })?;

        Ok(Self { proj })
    }

    /// Transformation batch de toutes les coordonnées
    pub fn transform_in_place(&self, coords: &mut [Coord]) -> Result<(), ParseError> {
        let mut points: Vec<(f64, f64)> = coords.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut points)
            .map_err(|e| ParseError::malformed_geometry("<batch>", e.to_string()))?;

        for (c, (x, y)) in coords.iter_mut().zip(points) {
            *c = Coord { x, y };
        }
        Ok(())
    }
}
