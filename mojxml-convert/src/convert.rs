//! Conversion d'un lot de sources vers un fichier GeoJSON

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use mojxml::executor::Executor;
use mojxml::{collect_sources, iter_content_xmls};
use tracing::{debug, info, warn};

use crate::export::GeoJsonSink;
use crate::report::ConversionReport;

/// Fréquence du log de progression, en documents
const PROGRESS_EVERY: usize = 10;

/// Réglages de la conversion hors parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertSettings {
    /// Ignorer les documents en erreur au lieu d'interrompre
    pub keep_going: bool,
    /// Remplir 代表点経度 / 代表点緯度
    pub representative_point: bool,
}

/// Développe les dossiers en leurs fichiers `.xml` / `.zip`
pub fn expand_sources(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();
    for source in sources {
        let found = collect_sources(source)
            .with_context(|| format!("Cannot list {}", source.display()))?;
        if source.is_dir() {
            debug!(dir = %source.display(), files = found.len(), "Expanded directory");
        }
        expanded.extend(found);
    }
    Ok(expanded)
}

/// Convertit les sources et écrit les features dans `output`.
///
/// Sans `keep_going`, le premier document en erreur interrompt la
/// conversion ; le fichier de sortie est alors incomplet.
pub fn convert(
    sources: &[PathBuf],
    output: &Path,
    executor: &dyn Executor,
    worker: &str,
    settings: ConvertSettings,
) -> Result<ConversionReport> {
    let start = Instant::now();
    let sources = expand_sources(sources)?;
    if sources.is_empty() {
        anyhow::bail!("No .xml or .zip source found");
    }
    info!(
        sources = sources.len(),
        worker,
        pool_size = executor.pool_size(),
        "Starting conversion"
    );

    let mut sink = GeoJsonSink::create(output, settings.representative_point)?;
    let mut report = ConversionReport::new(output, worker);

    for result in executor.iter_process(Box::new(iter_content_xmls(&sources))) {
        match result {
            Ok(features) => {
                sink.write_features(&features)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                report.record_file(features.len());
                if report.files % PROGRESS_EVERY == 0 {
                    info!("{}", report.summary());
                }
            }
            Err(e) if settings.keep_going => {
                warn!(error = %e, "Skipping document");
                report.record_failure(e.to_string());
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Conversion aborted after {} files",
                    report.files
                ))
            }
        }
    }

    sink.finish()?;
    report.set_duration(start.elapsed());
    report.finalize();
    info!("{}", report.summary());

    Ok(report)
}
