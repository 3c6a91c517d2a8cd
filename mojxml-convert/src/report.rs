//! Rapport de conversion
//!
//! Compteurs de fichiers et de features, liste des documents en erreur
//! (avec `--keep-going`), affichés en fin de traitement et sauvegardables
//! en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Tous les documents ont été convertis
    Success,
    /// Des documents ont été ignorés
    PartialSuccess,
    /// Aucun document converti
    Failed,
}

/// Document en erreur
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    /// Rang du résultat (ordre de complétion)
    pub position: usize,
    /// Message d'erreur
    pub message: String,
}

/// Rapport complet de conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Fichier de sortie
    pub output: String,
    /// Exécuteur utilisé
    pub worker: String,
    /// Durée de la conversion
    pub duration_secs: f64,
    /// Statut global
    pub status: ConversionStatus,
    /// Documents XML convertis
    pub files: usize,
    /// Features écrites
    pub features: usize,
    /// Documents en erreur
    pub failed: usize,
    /// Détail des erreurs
    pub failures: Vec<Failure>,
}

impl ConversionReport {
    pub fn new(output: &Path, worker: &str) -> Self {
        Self {
            output: output.display().to_string(),
            worker: worker.to_string(),
            duration_secs: 0.0,
            status: ConversionStatus::Success,
            files: 0,
            features: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    /// Enregistre un document converti
    pub fn record_file(&mut self, features: usize) {
        self.files += 1;
        self.features += features;
    }

    /// Enregistre un document en erreur
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(Failure {
            position: self.files + self.failed,
            message: message.into(),
        });
        self.failed += 1;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = match (self.files, self.failed) {
            (_, 0) => ConversionStatus::Success,
            (0, _) => ConversionStatus::Failed,
            _ => ConversionStatus::PartialSuccess,
        };
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} XML files processed, {} features written",
            self.files, self.features
        )
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("{}", self.summary());
        if self.failed == 0 {
            return;
        }

        println!("\n--- FAILURES ({}) ---", self.failed);
        for failure in self.failures.iter().take(20) {
            println!("  #{} {}", failure.position, failure.message);
        }
        if self.failures.len() > 20 {
            println!("  ... and {} more", self.failures.len() - 20);
        }
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
