//! Point d'entrée CLI pour mojxml-convert

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, ConvertArgs};

/// Convertir les fichiers 地図XML du 法務省 en GeoJSON
#[derive(Parser)]
#[command(name = "mojxml-convert")]
#[command(author, version)]
#[command(about = "Convert MOJ map XML (.xml / .zip) to GeoJSON parcels")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments de conversion (commande par défaut)
    #[command(flatten)]
    convert: Option<ConvertArgs>,
}

fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Worker {
            arbitrary,
            chikugai,
        }) => {
            // stdout est réservé à la réponse JSON
            init_logging(0, true);
            cli::cmd_worker(arbitrary, chikugai)
        }
        None => {
            init_logging(cli.verbose, cli.quiet);
            let args = cli
                .convert
                .context("Missing arguments: DST_FILE SRC_FILES...")?;
            cli::cmd_convert(args)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
