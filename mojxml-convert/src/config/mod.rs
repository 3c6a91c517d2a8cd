//! Configuration de la conversion
//!
//! Fichier JSON optionnel (`--config`) ; les options de la ligne de commande
//! s'y ajoutent ou le remplacent.

use std::path::Path;

use anyhow::{Context, Result};
use mojxml::executor::WorkerKind;
use mojxml::ParseOptions;
use serde::{Deserialize, Serialize};

/// Configuration principale
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Options de parsing (任意座標系, 地区外 / 別図)
    pub options: ParseOptions,

    /// Type d'exécuteur
    pub worker: Option<WorkerKind>,

    /// Taille du pool
    pub jobs: Option<usize>,

    /// Continuer malgré les documents en erreur
    pub keep_going: bool,

    /// Remplir 代表点経度 / 代表点緯度
    pub representative_point: bool,
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Type d'exécuteur effectif : ligne de commande, puis fichier, puis défaut
    pub fn worker_or(&self, cli: Option<WorkerKind>) -> WorkerKind {
        cli.or(self.worker).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"options": {"include_arbitrary_crs": true}, "worker": "thread", "jobs": 3}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.options.include_arbitrary_crs);
        assert!(!config.options.include_chikugai);
        assert_eq!(config.worker, Some(WorkerKind::Thread));
        assert_eq!(config.jobs, Some(3));
        assert!(!config.keep_going);
    }

    #[test]
    fn test_worker_precedence() {
        let config = Config {
            worker: Some(WorkerKind::Thread),
            ..Config::default()
        };
        assert_eq!(config.worker_or(None), WorkerKind::Thread);
        assert_eq!(config.worker_or(Some(WorkerKind::Single)), WorkerKind::Single);
        assert_eq!(Config::default().worker_or(None), WorkerKind::Multiprocess);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"workers": "thread"}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
