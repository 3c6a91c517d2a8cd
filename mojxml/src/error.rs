//! Types d'erreurs pour le crate mojxml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erreurs fatales pour un document XML.
///
/// Elles interrompent le parsing du document concerné (aucune feature partielle)
/// sans affecter les autres documents du lot. Sérialisables pour traverser la
/// frontière d'un processus worker.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ParseError {
    /// Le contenu n'est pas un document XML exploitable
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Élément géométrique mal formé (coordonnée absente, balise inconnue...)
    #[error("Malformed geometry for {id}: {reason}")]
    MalformedGeometry { id: String, reason: String },

    /// Système de coordonnées absent de la table de correspondance
    #[error("Unknown reference system: {0}")]
    UnknownReferenceSystem(String),

    /// Référence vers un point, une courbe ou une surface inexistante
    #[error("Dangling {kind} reference: {id}")]
    DanglingReference { kind: String, id: String },

    /// Identifiant de courbe ou de surface réutilisé dans un même document
    #[error("Duplicate {kind} identifier: {id}")]
    DuplicateIdentifier { kind: String, id: String },

    /// Contour de polygone sans aucune courbe
    #[error("Empty ring in surface {surface_id}")]
    EmptyRing { surface_id: String },
}

impl ParseError {
    /// Crée une erreur de document mal formé
    pub fn malformed_document(reason: impl Into<String>) -> Self {
        Self::MalformedDocument(reason.into())
    }

    /// Crée une erreur de géométrie mal formée
    pub fn malformed_geometry(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn dangling(kind: &str, id: impl Into<String>) -> Self {
        Self::DanglingReference {
            kind: kind.to_string(),
            id: id.into(),
        }
    }

    pub fn duplicate(kind: &str, id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// Erreurs pouvant survenir lors de la lecture ou du traitement d'un lot
#[derive(Debug, Error)]
pub enum MojxmlError {
    /// Erreur d'I/O lors de la lecture d'un fichier source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive zip corrompue
    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Extension de fichier source non reconnue
    #[error("Unsupported input type: {}", .0.display())]
    UnsupportedInputType(PathBuf),

    /// Erreur fatale de parsing d'un document
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Échec d'un worker (processus enfant planté, réponse illisible...)
    #[error("Worker failure: {0}")]
    Worker(String),
}

/// Alias de résultat pour les opérations de lot
pub type Result<T, E = MojxmlError> = std::result::Result<T, E>;
