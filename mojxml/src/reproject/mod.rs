//! Reprojection des courbes vers la longitude/latitude (EPSG:4326)
//!
//! Le système source est déclaré par le libellé 座標系 du document :
//! - `任意座標系` : système arbitraire, non géoréférencé (aucune reprojection)
//! - `公共座標N系` : zone N du système plan rectangulaire JGD2000 (EPSG:2443 à 2461)
//!
//! Le backend par défaut est une Mercator transverse inverse en Rust pur
//! ([`plane`]). Avec la feature `proj`, la transformation passe par PROJ.

mod ellipsoid;
mod plane;
#[cfg(feature = "proj")]
mod with_proj;

pub use plane::PlaneRectangular;

use geo::Coord;

use crate::error::ParseError;

/// Libellé du système arbitraire
pub const ARBITRARY_LABEL: &str = "任意座標系";

/// Mapping des libellés 座標系 vers EPSG (`None` pour le système arbitraire)
const REFERENCE_SYSTEMS: &[(&str, Option<u32>)] = &[
    (ARBITRARY_LABEL, None),
    ("公共座標1系", Some(2443)),
    ("公共座標2系", Some(2444)),
    ("公共座標3系", Some(2445)),
    ("公共座標4系", Some(2446)),
    ("公共座標5系", Some(2447)),
    ("公共座標6系", Some(2448)),
    ("公共座標7系", Some(2449)),
    ("公共座標8系", Some(2450)),
    ("公共座標9系", Some(2451)),
    ("公共座標10系", Some(2452)),
    ("公共座標11系", Some(2453)),
    ("公共座標12系", Some(2454)),
    ("公共座標13系", Some(2455)),
    ("公共座標14系", Some(2456)),
    ("公共座標15系", Some(2457)),
    ("公共座標16系", Some(2458)),
    ("公共座標17系", Some(2459)),
    ("公共座標18系", Some(2460)),
    ("公共座標19系", Some(2461)),
];

/// Premier code EPSG de la série (zone 1)
const FIRST_ZONE_EPSG: u32 = 2443;

/// EPSG de sortie
pub const TARGET_EPSG: u32 = 4326;

/// Système de référence source d'un document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSystem {
    /// 任意座標系 : coordonnées locales, conservées telles quelles
    Arbitrary,
    /// Zone du système plan rectangulaire
    Projected { epsg: u32, zone: u8 },
}

impl ReferenceSystem {
    /// Recherche un libellé 座標系 dans la table
    pub fn from_label(label: &str) -> Result<Self, ParseError> {
        let label = label.trim();
        REFERENCE_SYSTEMS
            .iter()
            .find(|(name, _)| *name == label)
            .map(|&(_, epsg)| match epsg {
                None => Self::Arbitrary,
                Some(epsg) => Self::Projected {
                    epsg,
                    zone: (epsg - FIRST_ZONE_EPSG + 1) as u8,
                },
            })
            .ok_or_else(|| ParseError::UnknownReferenceSystem(label.to_string()))
    }

    pub fn is_arbitrary(&self) -> bool {
        matches!(self, Self::Arbitrary)
    }
}

/// Reprojection d'un lot de coordonnées vers EPSG:4326
pub enum Reprojector {
    /// Système arbitraire : pas de reprojection
    Identity,
    /// Mercator transverse inverse (Rust pur)
    Lite(PlaneRectangular),
    /// Reprojection via PROJ
    #[cfg(feature = "proj")]
    Proj(with_proj::ProjReprojector),
}

impl Reprojector {
    /// Crée le reprojector adapté au système source
    pub fn new(system: ReferenceSystem) -> Result<Self, ParseError> {
        match system {
            ReferenceSystem::Arbitrary => Ok(Self::Identity),
            #[cfg(feature = "proj")]
            ReferenceSystem::Projected { epsg, .. } => {
                Ok(Self::Proj(with_proj::ProjReprojector::new(epsg)?))
            }
            #[cfg(not(feature = "proj"))]
            ReferenceSystem::Projected { epsg, zone } => PlaneRectangular::new(zone)
                .map(Self::Lite)
                .ok_or_else(|| ParseError::UnknownReferenceSystem(format!("EPSG:{}", epsg))),
        }
    }

    /// Transforme toutes les coordonnées en place, en un seul appel.
    ///
    /// L'ordre des sorties correspond à celui des entrées.
    pub fn transform_in_place(&self, coords: &mut [Coord]) -> Result<(), ParseError> {
        match self {
            Self::Identity => Ok(()),
            Self::Lite(plane) => {
                for c in coords.iter_mut() {
                    let (lon, lat) = plane.to_geographic(c.x, c.y);
                    *c = Coord { x: lon, y: lat };
                }
                Ok(())
            }
            #[cfg(feature = "proj")]
            Self::Proj(p) => p.transform_in_place(coords),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (任意座標系)",
            Self::Lite(_) => "plane rectangular (pure Rust)",
            #[cfg(feature = "proj")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

const SCALE: f64 = 1e9;

/// Tronque (vers zéro) à 9 décimales.
///
/// Le produit `value * 1e9` peut tomber juste sous l'entier attendu ; on
/// corrige d'une unité pour que le résultat soit le plus grand multiple de
/// 1e-9 (en valeur absolue) ne dépassant pas `|value|`, ce qui rend
/// l'opération idempotente.
#[inline]
pub fn truncate9(value: f64) -> f64 {
    let magnitude = value.abs();
    let mut k = (magnitude * SCALE).trunc();
    if (k + 1.0) / SCALE <= magnitude {
        k += 1.0;
    } else if k > 0.0 && k / SCALE > magnitude {
        k -= 1.0;
    }
    (k / SCALE).copysign(value)
}

/// Tronque toutes les composantes à 9 décimales, reprojection ou non
pub fn truncate_in_place(coords: &mut [Coord]) {
    for c in coords.iter_mut() {
        c.x = truncate9(c.x);
        c.y = truncate9(c.y);
    }
}
