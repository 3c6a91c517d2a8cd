//! Exécuteur multi-processus
//!
//! Chaque document est confié à un processus enfant : le contenu XML est
//! écrit sur son entrée standard, la réponse JSON
//! (`Result<Vec<Feature>, ParseError>`) est lue sur sa sortie standard.
//! L'enfant exécute [`serve`] : le binaire `mojxml-worker` de ce crate, ou
//! tout programme qui l'embarque (voir [`WorkerCommand`]).

use std::env;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;

use tracing::debug;

use super::pool::{Backend, BoundedPool, TaskResult};
use super::{Completed, Executor, Source};
use crate::error::{MojxmlError, ParseError, Result};
use crate::parser::parse_raw;
use crate::types::{Feature, ParseOptions};

/// Nom du binaire worker fourni par ce crate
pub const WORKER_BINARY: &str = "mojxml-worker";

/// Variable d'environnement désignant explicitement le binaire worker
pub const WORKER_ENV: &str = "MOJXML_WORKER";

/// Drapeaux transmettant les options de parsing à l'enfant
pub fn worker_flags(options: &ParseOptions) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if options.include_arbitrary_crs {
        flags.push("--arbitrary");
    }
    if options.include_chikugai {
        flags.push("--chikugai");
    }
    flags
}

/// Côté enfant : lit un document sur `input`, écrit la réponse sur `output`.
///
/// Une erreur de parsing n'est pas une erreur du worker : elle voyage dans
/// la réponse.
pub fn serve<R: Read, W: Write>(mut input: R, mut output: W, options: &ParseOptions) -> Result<()> {
    let mut content = Vec::new();
    input.read_to_end(&mut content)?;

    let reply = parse_raw(&content, options);
    serde_json::to_writer(&mut output, &reply)
        .map_err(|e| MojxmlError::Worker(format!("cannot encode reply: {}", e)))?;
    output.flush()?;
    Ok(())
}

/// Commande lancée pour chaque document.
///
/// Les drapeaux d'options ([`worker_flags`]) sont ajoutés après `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Cherche le binaire `mojxml-worker`, dans l'ordre :
    ///
    /// 1. le chemin donné par `MOJXML_WORKER`
    /// 2. à côté de l'exécutable courant, ou dans son répertoire parent
    ///    (binaires de test cargo sous `target/<profil>/deps/`)
    /// 3. dans le `PATH`
    pub fn locate() -> Self {
        if let Some(path) = env::var_os(WORKER_ENV).filter(|p| !p.is_empty()) {
            return Self::new(path, Vec::<OsString>::new());
        }

        let file_name = format!("{}{}", WORKER_BINARY, env::consts::EXE_SUFFIX);
        if let Ok(exe) = env::current_exe() {
            let found = exe
                .ancestors()
                .skip(1)
                .take(2)
                .map(|dir| dir.join(&file_name))
                .find(|candidate| candidate.is_file());
            if let Some(path) = found {
                return Self::new(path, Vec::<OsString>::new());
            }
        }

        debug!(worker = WORKER_BINARY, "Worker binary not found next to executable, using PATH");
        Self::new(WORKER_BINARY, Vec::<OsString>::new())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// Pool de processus enfants
pub struct ProcessPoolExecutor {
    options: ParseOptions,
    size: usize,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessPoolExecutor {
    /// Utilise le binaire `mojxml-worker` trouvé par [`WorkerCommand::locate`]
    pub fn new(options: ParseOptions, size: usize) -> Self {
        Self::with_worker(options, size, WorkerCommand::locate())
    }

    pub fn with_worker(options: ParseOptions, size: usize, worker: WorkerCommand) -> Self {
        let WorkerCommand { program, mut args } = worker;
        args.extend(worker_flags(&options).into_iter().map(OsString::from));
        Self {
            options,
            size: size.max(1),
            program,
            args,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl Backend for ProcessPoolExecutor {
    fn spawn(&self, content: Vec<u8>, done: Sender<TaskResult>) {
        let program = self.program.clone();
        let args = self.args.clone();
        std::thread::spawn(move || {
            let _ = done.send(run_child(&program, &args, &content));
        });
    }
}

impl Executor for ProcessPoolExecutor {
    fn iter_process<'a>(&'a self, source: Source<'a>) -> Completed<'a> {
        Box::new(BoundedPool::new(self, source, self.size))
    }

    fn pool_size(&self) -> usize {
        self.size
    }
}

fn run_child(program: &Path, args: &[OsString], content: &[u8]) -> Result<Vec<Feature>> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            MojxmlError::Worker(format!("cannot start {}: {}", program.display(), e))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // Un enfant mort prématurément est signalé par son code de sortie
        if let Err(e) = stdin.write_all(content) {
            debug!(error = %e, "Worker closed its input early");
        }
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(MojxmlError::Worker(format!(
            "worker exited with {}",
            output.status
        )));
    }

    let reply: std::result::Result<Vec<Feature>, ParseError> =
        serde_json::from_slice(&output.stdout)
            .map_err(|e| MojxmlError::Worker(format!("unreadable worker reply: {}", e)))?;
    Ok(reply?)
}
