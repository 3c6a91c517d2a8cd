//! Worker du pool de processus
//!
//! Lit un document 地図XML sur l'entrée standard et écrit la réponse JSON
//! sur la sortie standard. Lancé par `ProcessPoolExecutor`.

use std::io;

use clap::Parser;
use mojxml::executor::process::serve;
use mojxml::{MojxmlError, ParseOptions};

#[derive(Parser)]
#[command(name = "mojxml-worker")]
#[command(author, version)]
#[command(about = "Parse one 地図XML document from stdin, reply as JSON on stdout")]
struct Args {
    /// Include documents in 任意座標系
    #[arg(long)]
    arbitrary: bool,

    /// Include 地区外 / 別図 parcels
    #[arg(long)]
    chikugai: bool,
}

fn main() -> Result<(), MojxmlError> {
    let args = Args::parse();
    let options = ParseOptions {
        include_arbitrary_crs: args.arbitrary,
        include_chikugai: args.chikugai,
    };
    serve(io::stdin().lock(), io::stdout().lock(), &options)
}
