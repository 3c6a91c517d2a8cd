//! Assemblage des features à partir des 筆 de la section 主題属性

use std::collections::HashMap;

use geo::MultiPolygon;
use roxmltree::Node;

use crate::error::ParseError;
use crate::geometry::Surfaces;
use crate::types::{Feature, Value, FUDE_PROPERTIES, KEY_CHIBAN, KEY_FUDE_ID};
use crate::xml::{self, NS_TIZU};

/// Marqueurs de 地番 pour les parcelles hors district ou sur plan séparé
pub const CHIKUGAI_MARKERS: &[&str] = &["地区外", "別図"];

/// Nature d'un enfant de 筆, déterminée une seule fois par champ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FudeField<'a> {
    /// `形状` : référence vers une surface
    Shape { idref: &'a str },
    /// Tout autre élément : attribut texte (clé inconnue conservée)
    Attribute { key: &'a str, value: Option<&'a str> },
}

impl<'a> FudeField<'a> {
    fn classify(node: Node<'a, '_>) -> Result<Self, ParseError> {
        let key = node.tag_name().name();
        if key == "形状" {
            let idref = node.attribute("idref").ok_or_else(|| {
                ParseError::malformed_document("形状 element without idref")
            })?;
            Ok(Self::Shape { idref })
        } else {
            Ok(Self::Attribute {
                key,
                value: node.text(),
            })
        }
    }
}

/// Indique si le 地番 désigne une parcelle 地区外 ou 別図
pub fn is_chikugai(chiban: &str) -> bool {
    CHIKUGAI_MARKERS.iter().any(|marker| chiban.contains(marker))
}

/// Construit les features dans l'ordre du document.
///
/// Les parcelles 地区外 / 別図 sont écartées sauf si `include_chikugai`.
pub fn assemble_features(
    subject: Node,
    surfaces: &Surfaces,
    include_chikugai: bool,
) -> Result<Vec<Feature>, ParseError> {
    let mut features = Vec::new();

    for fude in xml::children(subject, NS_TIZU, "筆") {
        let fude_id = fude
            .attribute("id")
            .ok_or_else(|| ParseError::malformed_document("筆 element without id"))?;

        let mut properties: HashMap<String, Value> = FUDE_PROPERTIES
            .iter()
            .map(|key| (key.to_string(), Value::Null))
            .collect();
        properties.insert(KEY_FUDE_ID.to_string(), Value::Text(fude_id.to_string()));

        let mut geometry = None;
        for entry in xml::elements(fude) {
            match FudeField::classify(entry)? {
                FudeField::Shape { idref } => {
                    let polygon = surfaces
                        .get(idref)
                        .ok_or_else(|| ParseError::dangling("surface", idref))?;
                    geometry = Some(MultiPolygon::new(vec![polygon.clone()]));
                }
                FudeField::Attribute { key, value } => {
                    properties.insert(key.to_string(), value.into());
                }
            }
        }

        if !include_chikugai {
            let chiban = properties.get(KEY_CHIBAN).and_then(Value::as_str).unwrap_or("");
            if is_chikugai(chiban) {
                continue;
            }
        }

        features.push(Feature {
            geometry,
            properties,
        });
    }

    Ok(features)
}
