//! Parsing d'un document 地図XML : résolution, reprojection, assemblage

pub mod subject;

use std::collections::HashMap;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::ParseError;
use crate::geometry::{resolve_curves, resolve_points, resolve_surfaces};
use crate::reproject::{truncate_in_place, ReferenceSystem, Reprojector};
use crate::types::{Feature, ParseOptions, Value};
use crate::xml::{self, NS_TIZU};

/// Propriétés de la racine recopiées sur chaque feature
const BASE_PROPERTIES: &[(&str, bool)] = &[
    // (clé, obligatoire)
    ("地図名", true),
    ("市区町村コード", true),
    ("市区町村名", true),
    ("座標系", true),
    ("測地系判別", false),
];

/// Parse le contenu brut d'un document XML et retourne ses features.
///
/// Fonction pure : aucune I/O, aucun état partagé. Elle peut être appelée
/// en parallèle depuis autant de threads ou processus que nécessaire.
///
/// Un document en 任意座標系 retourne une liste vide si
/// `options.include_arbitrary_crs` est faux.
pub fn parse_raw(content: &[u8], options: &ParseOptions) -> Result<Vec<Feature>, ParseError> {
    let text = xml::decode(content)?;
    let doc = Document::parse_with_options(
        &text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )
    .map_err(|e| ParseError::malformed_document(e.to_string()))?;
    let root = doc.root_element();

    // Système de coordonnées du fichier
    let label = required_text(root, "座標系")?;
    let system = ReferenceSystem::from_label(label)?;
    if system.is_arbitrary() && !options.include_arbitrary_crs {
        debug!(label, "Skipping document in arbitrary reference system");
        return Ok(Vec::new());
    }

    let spatial = required_child(root, "空間属性")?;
    let points = resolve_points(spatial)?;
    let mut curves = resolve_curves(spatial, &points)?;

    // Plan rectangulaire -> longitude/latitude, puis troncature à 9 décimales
    let reprojector = Reprojector::new(system)?;
    reprojector.transform_in_place(curves.coords_mut())?;
    truncate_in_place(curves.coords_mut());

    let surfaces = resolve_surfaces(spatial, &curves)?;

    // Note: les 図郭 ne sont pas exploités ; un 筆 peut être rattaché à
    // plusieurs feuilles et ce rattachement n'est pas reporté sur les features.
    let subject = required_child(root, "主題属性")?;
    let mut features = subject::assemble_features(subject, &surfaces, options.include_chikugai)?;

    let base = base_properties(root)?;
    for feature in &mut features {
        feature
            .properties
            .extend(base.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    debug!(
        points = points.len(),
        curves = curves.len(),
        surfaces = surfaces.len(),
        features = features.len(),
        reprojector = reprojector.description(),
        "Parsed document"
    );

    Ok(features)
}

/// Propriétés de la racine du document (地図名, 市区町村コード...)
fn base_properties(root: Node) -> Result<HashMap<String, Value>, ParseError> {
    let mut properties = HashMap::with_capacity(BASE_PROPERTIES.len());
    for &(key, required) in BASE_PROPERTIES {
        let value = match xml::child(root, NS_TIZU, key) {
            Some(node) => node.text().into(),
            None if required => {
                return Err(ParseError::malformed_document(format!("missing {}", key)))
            }
            None => Value::Null,
        };
        properties.insert(key.to_string(), value);
    }
    Ok(properties)
}

fn required_child<'a, 'input>(
    root: Node<'a, 'input>,
    name: &str,
) -> Result<Node<'a, 'input>, ParseError> {
    xml::child(root, NS_TIZU, name)
        .ok_or_else(|| ParseError::malformed_document(format!("missing {}", name)))
}

fn required_text<'a>(root: Node<'a, '_>, name: &str) -> Result<&'a str, ParseError> {
    required_child(root, name)?
        .text()
        .ok_or_else(|| ParseError::malformed_document(format!("empty {}", name)))
}
