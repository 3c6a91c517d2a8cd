//! Types de données pour le crate mojxml

use std::collections::HashMap;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Clé de l'identifiant de parcelle (筆ID)
pub const KEY_FUDE_ID: &str = "筆ID";
/// Clé du numéro de parcelle (地番)
pub const KEY_CHIBAN: &str = "地番";
/// Clé de la longitude du point représentatif
pub const KEY_REP_LON: &str = "代表点経度";
/// Clé de la latitude du point représentatif
pub const KEY_REP_LAT: &str = "代表点緯度";

/// Attributs connus d'un 筆, initialisés à `Null` avant lecture de l'élément
pub const FUDE_PROPERTIES: &[&str] = &[
    KEY_FUDE_ID,
    "精度区分",
    "大字コード",
    "丁目コード",
    "小字コード",
    "予備コード",
    "大字名",
    "丁目名",
    "小字名",
    "予備名",
    KEY_CHIBAN,
    "座標値種別",
    "筆界未定構成筆",
    "地図名",
    "市区町村コード",
    "市区町村名",
    "座標系",
    "測地系判別",
];

/// Type d'une colonne du schéma de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Float,
}

/// Schéma de sortie (ordre des colonnes pour le writer), géométrie MultiPolygon
pub const OUTPUT_SCHEMA: &[(&str, FieldType)] = &[
    (KEY_FUDE_ID, FieldType::Text),
    ("地図名", FieldType::Text),
    ("市区町村コード", FieldType::Text),
    ("市区町村名", FieldType::Text),
    ("座標系", FieldType::Text),
    ("測地系判別", FieldType::Text),
    ("大字コード", FieldType::Text),
    ("丁目コード", FieldType::Text),
    ("小字コード", FieldType::Text),
    ("予備コード", FieldType::Text),
    ("大字名", FieldType::Text),
    ("丁目名", FieldType::Text),
    ("小字名", FieldType::Text),
    (KEY_CHIBAN, FieldType::Text),
    ("筆界未定構成筆", FieldType::Text),
    (KEY_REP_LON, FieldType::Float),
    (KEY_REP_LAT, FieldType::Float),
    ("精度区分", FieldType::Text),
    ("座標値種別", FieldType::Text),
];

/// Valeur d'attribut d'une feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Float(f64),
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Value::Null, |s| Value::Text(s.to_string()))
    }
}

/// Une parcelle (筆) avec sa géométrie et ses attributs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Géométrie en longitude/latitude (absente si le 筆 n'a pas de 形状)
    pub geometry: Option<MultiPolygon<f64>>,

    /// Attributs de la feature (clé -> valeur)
    pub properties: HashMap<String, Value>,
}

impl Feature {
    /// Raccourci vers un attribut texte
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// Options de parsing, passées explicitement à chaque appel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Conserver les documents en 任意座標系 (non géoréférencés)
    pub include_arbitrary_crs: bool,

    /// Conserver les 筆 dont le 地番 contient 地区外 ou 別図
    pub include_chikugai: bool,
}
