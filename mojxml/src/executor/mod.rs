//! Exécution parallèle du parsing sur un flux de documents
//!
//! Trois implémentations partagent le même contrat : au plus `pool_size`
//! documents en cours, résultats produits dans l'ordre de complétion, une
//! erreur de document produite à sa position sans annuler les autres.

mod pool;
pub mod process;
mod single;
mod thread;

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Feature, ParseOptions};

pub use process::{ProcessPoolExecutor, WorkerCommand};
pub use single::SingleThreadExecutor;
pub use thread::ThreadPoolExecutor;

/// Flux de contenus XML bruts à traiter
pub type Source<'a> = Box<dyn Iterator<Item = Result<Vec<u8>>> + 'a>;

/// Flux de résultats, un élément par document
pub type Completed<'a> = Box<dyn Iterator<Item = Result<Vec<Feature>>> + 'a>;

/// Convertit un flux de documents en flux de listes de features
pub trait Executor {
    /// Traite paresseusement les documents de `source`.
    ///
    /// Un élément par document, dans l'ordre de complétion.
    fn iter_process<'a>(&'a self, source: Source<'a>) -> Completed<'a>;

    /// Nombre maximal de documents traités simultanément
    fn pool_size(&self) -> usize;
}

/// Type d'exécuteur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// Un processus enfant par document
    #[default]
    Multiprocess,
    /// Pool de threads rayon
    Thread,
    /// Séquentiel, sur le thread appelant
    Single,
}

impl FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "multiprocess" => Ok(Self::Multiprocess),
            "thread" => Ok(Self::Thread),
            "single" => Ok(Self::Single),
            other => Err(format!(
                "unknown worker '{}' (expected multiprocess, thread or single)",
                other
            )),
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Multiprocess => "multiprocess",
            Self::Thread => "thread",
            Self::Single => "single",
        })
    }
}

/// Nombre de CPU disponibles (1 si inconnu)
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Construit l'exécuteur demandé.
///
/// `pool_size` remplace la taille par défaut (CPU pour les processus,
/// 2 × CPU pour les threads) ; il est ignoré pour `single`. Le pool de
/// processus lance le binaire `mojxml-worker` ([`WorkerCommand::locate`]).
pub fn executor_for(
    kind: WorkerKind,
    options: ParseOptions,
    pool_size: Option<usize>,
) -> Result<Box<dyn Executor>> {
    build(kind, options, pool_size, None)
}

/// Comme [`executor_for`], avec une commande worker explicite pour le pool
/// de processus (par exemple un binaire qui embarque [`process::serve`]).
pub fn executor_with_worker(
    kind: WorkerKind,
    options: ParseOptions,
    pool_size: Option<usize>,
    worker: WorkerCommand,
) -> Result<Box<dyn Executor>> {
    build(kind, options, pool_size, Some(worker))
}

fn build(
    kind: WorkerKind,
    options: ParseOptions,
    pool_size: Option<usize>,
    worker: Option<WorkerCommand>,
) -> Result<Box<dyn Executor>> {
    Ok(match kind {
        WorkerKind::Multiprocess => {
            let size = pool_size.unwrap_or_else(cpu_count);
            let worker = worker.unwrap_or_else(WorkerCommand::locate);
            Box::new(ProcessPoolExecutor::with_worker(options, size, worker))
        }
        WorkerKind::Thread => {
            let size = pool_size.unwrap_or_else(|| cpu_count() * 2);
            Box::new(ThreadPoolExecutor::new(options, size)?)
        }
        WorkerKind::Single => Box::new(SingleThreadExecutor::new(options)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_kind_parse() {
        assert_eq!("thread".parse::<WorkerKind>(), Ok(WorkerKind::Thread));
        assert_eq!(
            "multiprocess".parse::<WorkerKind>(),
            Ok(WorkerKind::Multiprocess)
        );
        assert!("fork".parse::<WorkerKind>().is_err());
        assert_eq!(WorkerKind::Single.to_string(), "single");
        assert_eq!(WorkerKind::default(), WorkerKind::Multiprocess);
    }

    #[test]
    fn test_worker_kind_serde() {
        let kind: WorkerKind = serde_json::from_str("\"thread\"").unwrap();
        assert_eq!(kind, WorkerKind::Thread);
    }

    #[test]
    fn test_executor_for_pool_sizes() {
        let options = ParseOptions::default();
        let thread = executor_for(WorkerKind::Thread, options, Some(3)).unwrap();
        assert_eq!(thread.pool_size(), 3);

        let single = executor_for(WorkerKind::Single, options, Some(8)).unwrap();
        assert_eq!(single.pool_size(), 1);

        let default_thread = executor_for(WorkerKind::Thread, options, None).unwrap();
        assert_eq!(default_thread.pool_size(), cpu_count() * 2);

        let worker = WorkerCommand::new("mojxml-worker", Vec::<String>::new());
        let process =
            executor_with_worker(WorkerKind::Multiprocess, options, Some(5), worker).unwrap();
        assert_eq!(process.pool_size(), 5);
    }
}
