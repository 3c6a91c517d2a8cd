//! Définition et implémentation des commandes CLI

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use mojxml::executor::{executor_with_worker, process, WorkerCommand, WorkerKind};
use mojxml::ParseOptions;
use tracing::info;

use mojxml_convert::{convert, Config, ConvertSettings};

/// Sous-commande cachée exécutée par les processus enfants
pub const WORKER_SUBCOMMAND: &str = "worker";

#[derive(Subcommand)]
pub enum Commands {
    /// Process-pool child: reads one XML document on stdin, writes JSON on stdout
    #[command(name = WORKER_SUBCOMMAND, hide = true)]
    Worker {
        /// Include documents in 任意座標系
        #[arg(long)]
        arbitrary: bool,

        /// Include 地区外 / 別図 parcels
        #[arg(long)]
        chikugai: bool,
    },
}

/// Arguments de la conversion (commande par défaut)
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Output file (.geojson, .json, .geojsonl or .ndjson)
    #[arg(value_name = "DST_FILE")]
    pub dst_file: PathBuf,

    /// Source .xml / .zip files or directories
    #[arg(value_name = "SRC_FILES", required = true)]
    pub src_files: Vec<PathBuf>,

    /// Worker type: multiprocess, thread or single
    #[arg(long, value_name = "WORKER")]
    pub worker: Option<WorkerKind>,

    /// Include documents in 任意座標系 (arbitrary, non-georeferenced coordinates)
    #[arg(short, long)]
    pub arbitrary: bool,

    /// Include 地区外 / 別図 parcels
    #[arg(short, long)]
    pub chikugai: bool,

    /// Maximum number of documents processed concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip documents that fail to parse instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Write the conversion report as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Fill 代表点経度 / 代表点緯度 with an interior point of the parcel
    #[arg(long)]
    pub representative_point: bool,

    /// JSON config file (command-line flags take precedence)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Exécute la conversion
pub fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let options = ParseOptions {
        include_arbitrary_crs: args.arbitrary || config.options.include_arbitrary_crs,
        include_chikugai: args.chikugai || config.options.include_chikugai,
    };
    let worker = config.worker_or(args.worker);
    let settings = ConvertSettings {
        keep_going: args.keep_going || config.keep_going,
        representative_point: args.representative_point || config.representative_point,
    };

    // Les enfants relancent ce binaire, pas un mojxml-worker installé à part
    let exe = std::env::current_exe().context("Cannot locate current executable")?;
    let executor = executor_with_worker(
        worker,
        options,
        args.jobs.or(config.jobs),
        WorkerCommand::new(exe, [WORKER_SUBCOMMAND]),
    )
    .context("Cannot start executor")?;
    info!(
        arbitrary = options.include_arbitrary_crs,
        chikugai = options.include_chikugai,
        "Parse options"
    );

    let report = convert(
        &args.src_files,
        &args.dst_file,
        executor.as_ref(),
        &worker.to_string(),
        settings,
    )?;

    report.display();
    if let Some(path) = &args.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    Ok(())
}

/// Exécute un worker : un document sur stdin, la réponse sur stdout
pub fn cmd_worker(arbitrary: bool, chikugai: bool) -> Result<()> {
    let options = ParseOptions {
        include_arbitrary_crs: arbitrary,
        include_chikugai: chikugai,
    };
    process::serve(io::stdin().lock(), io::stdout().lock(), &options)
        .context("Worker failed")?;
    Ok(())
}
